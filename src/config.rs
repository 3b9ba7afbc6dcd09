use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::budget::ZeroSpendPolicy;

/// Environment variable that overrides `mail.password`.
pub(crate) const SMTP_PASSWORD_ENV: &str = "SPENDTRACK_SMTP_PASSWORD";

/// Where SpendTrack keeps its files.
#[derive(Debug, Clone)]
pub(crate) struct AppPaths {
    pub(crate) data_dir: PathBuf,
    pub(crate) config_dir: PathBuf,
}

impl AppPaths {
    pub(crate) fn resolve() -> Result<Self> {
        let proj_dirs = directories::ProjectDirs::from("com", "spendtrack", "SpendTrack")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let paths = Self {
            data_dir: proj_dirs.data_dir().to_path_buf(),
            config_dir: proj_dirs.config_dir().to_path_buf(),
        };
        for dir in [&paths.data_dir, &paths.config_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(paths)
    }

    pub(crate) fn db_path(&self) -> PathBuf {
        self.data_dir.join("spendtrack.db")
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.data_dir.join("spendtrack.log")
    }

    pub(crate) fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }
}

/// Outgoing mail server used for report delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct MailSettings {
    #[serde(default)]
    pub(crate) smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub(crate) smtp_port: u16,
    #[serde(default)]
    pub(crate) username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub(crate) password: String,
    /// Sender address, e.g. "Me <me@example.com>"
    #[serde(default)]
    pub(crate) from: String,
}

fn default_smtp_port() -> u16 {
    587
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from: String::new(),
        }
    }
}

impl MailSettings {
    pub(crate) fn is_configured(&self) -> bool {
        !self.smtp_host.trim().is_empty() && !self.from.trim().is_empty()
    }

    /// Password from the environment if set, else from the config file.
    pub(crate) fn resolved_password(&self) -> String {
        std::env::var(SMTP_PASSWORD_ENV).unwrap_or_else(|_| self.password.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Settings {
    /// Whether goals with nothing spent are listed or left out.
    #[serde(default)]
    pub(crate) zero_spend_goals: ZeroSpendPolicy,

    /// Categories offered for entry and goal setting.
    #[serde(default = "default_categories")]
    pub(crate) categories: Vec<String>,

    #[serde(default = "default_currency")]
    pub(crate) currency_symbol: String,

    #[serde(default)]
    pub(crate) mail: MailSettings,
}

fn default_categories() -> Vec<String> {
    ["Food", "Transport", "Leisure", "Health", "Education", "Housing"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_currency() -> String {
    "$".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zero_spend_goals: ZeroSpendPolicy::default(),
            categories: default_categories(),
            currency_symbol: default_currency(),
            mail: MailSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings; a missing file yields the defaults.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(settings)
    }

    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.zero_spend_goals, ZeroSpendPolicy::Report);
        assert_eq!(s.categories.len(), 6);
        assert_eq!(s.currency_symbol, "$");
        assert_eq!(s.mail.smtp_port, 587);
        assert!(!s.mail.is_configured());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(s.categories, Settings::default().categories);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"zero_spend_goals": "omit", "mail": {"smtp_host": "smtp.example.com", "from": "me@example.com"}}"#,
        )
        .unwrap();
        let s = Settings::load(&path).unwrap();
        assert_eq!(s.zero_spend_goals, ZeroSpendPolicy::Omit);
        assert_eq!(s.currency_symbol, "$");
        assert_eq!(s.mail.smtp_port, 587);
        assert!(s.mail.is_configured());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut s = Settings::default();
        s.currency_symbol = "R$".into();
        s.categories.push("Pets".into());
        s.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.currency_symbol, "R$");
        assert!(loaded.categories.contains(&"Pets".to_string()));
    }
}
