mod cli;
mod tui;

pub(crate) use cli::as_cli;
pub(crate) use tui::as_tui;

use anyhow::{bail, Result};
use log::info;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::db::Database;
use crate::import::{detect_columns, CsvImporter, ImportBatch};
use crate::models::DateRange;

/// Outcome of importing one CSV file into the ledger.
pub(crate) struct ImportOutcome {
    pub(crate) batch: ImportBatch,
    pub(crate) profile_name: String,
    pub(crate) inserted: usize,
}

impl ImportOutcome {
    pub(crate) fn summary(&self) -> String {
        let dupes = self.batch.transactions.len() - self.inserted;
        format!(
            "{} ({}): imported {} new, {dupes} duplicates skipped",
            self.batch.summary(),
            self.profile_name,
            self.inserted
        )
    }
}

/// Read a CSV file, detect its columns and store the rows.
pub(crate) fn import_file(
    db: &mut Database,
    path: &Path,
    date_format: Option<&str>,
    known: &[String],
) -> Result<ImportOutcome> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }
    let (headers, rows) = CsvImporter::preview(path)?;
    let mut profile = detect_columns(&headers).unwrap_or_default();
    if let Some(fmt) = date_format {
        profile.date_format = fmt.to_string();
    }
    let batch = CsvImporter::parse(&rows, &profile, known);
    let inserted = db.insert_transactions_batch(&batch.transactions)?;
    info!("Imported {inserted} rows from {}", path.display());
    Ok(ImportOutcome {
        batch,
        profile_name: profile.name,
        inserted,
    })
}

/// Category names offered to the user: configured ones first, then any
/// other name already used by a transaction or goal.
pub(crate) fn known_categories(settings: &Settings, db: &Database) -> Result<Vec<String>> {
    let mut names = settings.categories.clone();
    for used in db.get_used_categories()? {
        if !names.iter().any(|n| n.eq_ignore_ascii_case(&used)) {
            names.push(used);
        }
    }
    Ok(names)
}

/// `~/spendtrack-<range>.csv`, or `~/spendtrack-all.csv` for the whole ledger.
pub(crate) fn default_export_path(range: Option<&DateRange>) -> PathBuf {
    let label = match range {
        None => "all".to_string(),
        Some(range) => range_label(range),
    };
    let home = directories::UserDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(format!("spendtrack-{label}.csv"))
}

fn range_label(range: &DateRange) -> String {
    if range.is_single_month() {
        range.start.format("%Y-%m").to_string()
    } else {
        format!(
            "{}_{}",
            range.start.format("%Y-%m-%d"),
            range.end.format("%Y-%m-%d")
        )
    }
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
