use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::models::{canonical_category, Transaction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CsvProfile {
    pub(crate) name: String,
    pub(crate) date_column: usize,
    pub(crate) category_column: Option<usize>,
    pub(crate) description_column: Option<usize>,
    pub(crate) amount_column: usize,
    /// Tried first; common formats are tried after it.
    pub(crate) date_format: String,
    pub(crate) skip_rows: usize,
}

impl Default for CsvProfile {
    fn default() -> Self {
        Self {
            name: "Default".into(),
            date_column: 0,
            category_column: Some(1),
            description_column: Some(2),
            amount_column: 3,
            date_format: "%Y-%m-%d".into(),
            skip_rows: 0,
        }
    }
}

/// Result of parsing imported rows. Rows with bad values are kept with the
/// value missing, so they show up in listings but not in totals.
#[derive(Debug, Default)]
pub(crate) struct ImportBatch {
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) bad_dates: usize,
    pub(crate) bad_amounts: usize,
    pub(crate) skipped_blank: usize,
}

impl ImportBatch {
    pub(crate) fn summary(&self) -> String {
        let mut msg = format!("Parsed {} rows", self.transactions.len());
        if self.bad_dates > 0 {
            msg.push_str(&format!(", {} with unreadable dates", self.bad_dates));
        }
        if self.bad_amounts > 0 {
            msg.push_str(&format!(", {} with unreadable amounts", self.bad_amounts));
        }
        if self.skipped_blank > 0 {
            msg.push_str(&format!(", {} blank skipped", self.skipped_blank));
        }
        msg
    }
}

pub(crate) struct CsvImporter;

impl CsvImporter {
    /// Read the CSV and return headers + all rows as strings.
    pub(crate) fn preview(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        let mut all_rows: Vec<Vec<String>> = Vec::new();
        for result in rdr.records() {
            let record = result.context("Failed to read CSV record")?;
            all_rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        if all_rows.is_empty() {
            anyhow::bail!("CSV file is empty");
        }

        // Headers don't parse as dates or numbers
        let first_row = &all_rows[0];
        let looks_like_header = first_row.iter().all(|field| {
            let trimmed = field.trim();
            parse_decimal(trimmed).is_err() && parse_date(trimmed, "%Y-%m-%d").is_err()
        });

        if looks_like_header {
            let headers = all_rows.remove(0);
            debug!("CSV header row: {headers:?}");
            Ok((headers, all_rows))
        } else {
            let headers: Vec<String> = (0..first_row.len())
                .map(|i| format!("Column {}", i + 1))
                .collect();
            Ok((headers, all_rows))
        }
    }

    /// Parse rows into transactions. Never fails: unreadable dates and
    /// amounts become missing values and the row is kept.
    pub(crate) fn parse(rows: &[Vec<String>], profile: &CsvProfile, known: &[String]) -> ImportBatch {
        let mut batch = ImportBatch::default();
        let mut seen: HashMap<String, usize> = HashMap::new();
        let now = chrono::Utc::now().to_rfc3339();

        for (i, row) in rows.iter().enumerate().skip(profile.skip_rows) {
            if row.iter().all(|f| f.trim().is_empty()) {
                batch.skipped_blank += 1;
                continue;
            }

            let field = |col: Option<usize>| {
                col.and_then(|c| row.get(c))
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default()
            };

            let date_str = field(Some(profile.date_column));
            let amount_str = field(Some(profile.amount_column));
            let category = canonical_category(&field(profile.category_column), known);
            let description = field(profile.description_column);

            let date = match parse_date(&date_str, &profile.date_format) {
                Ok(d) => Some(d),
                Err(e) => {
                    warn!("Row {}: {e}; keeping row without a date", i + 1);
                    batch.bad_dates += 1;
                    None
                }
            };

            let amount = match parse_decimal(&amount_str) {
                Ok(a) if a >= Decimal::ZERO => Some(a),
                Ok(a) => {
                    warn!("Row {}: negative amount {a}; keeping row without an amount", i + 1);
                    batch.bad_amounts += 1;
                    None
                }
                Err(e) => {
                    warn!("Row {}: {e}; keeping row without an amount", i + 1);
                    batch.bad_amounts += 1;
                    None
                }
            };

            // Identical rows inside one file stay distinct, re-importing the
            // same file yields the same hashes.
            let key = format!("{date_str}|{category}|{description}|{amount_str}");
            let occurrence = seen.entry(key.clone()).or_insert(0);
            *occurrence += 1;
            let hash = compute_hash(&format!("{key}|{occurrence}"));

            batch.transactions.push(Transaction {
                id: None,
                date,
                category,
                description,
                amount,
                import_hash: hash,
                created_at: now.clone(),
            });
        }

        debug!("{} using profile '{}'", batch.summary(), profile.name);
        batch
    }
}

pub(crate) fn parse_date(s: &str, fmt: &str) -> Result<NaiveDate> {
    // Drop a trailing time component ("2024-01-15 00:00:00", "2024-01-15T10:00")
    let s = s.trim();
    let day_part = s.split(['T', ' ']).next().unwrap_or(s);
    for candidate in [s, day_part] {
        if let Ok(d) = NaiveDate::parse_from_str(candidate, fmt) {
            return Ok(d);
        }
        // Day-first before month-first: "05/03/2024" is 5 March
        for fallback in &[
            "%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%y", "%m/%d/%y",
        ] {
            if let Ok(d) = NaiveDate::parse_from_str(candidate, fallback) {
                return Ok(d);
            }
        }
    }
    anyhow::bail!("Could not parse date: '{s}'")
}

/// Parse a money value. Accepts currency symbols, thousands separators,
/// decimal comma ("1.234,56") and accounting negatives ("(12.00)").
pub(crate) fn parse_decimal(s: &str) -> Result<Decimal> {
    let mut cleaned: String = s
        .trim()
        .trim_matches('"')
        .replace("R$", "")
        .replace(['$', '€', '£', ' ', '\u{a0}'], "")
        .replace('(', "-")
        .replace(')', "");

    if cleaned.is_empty() {
        anyhow::bail!("Missing amount");
    }

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');
    cleaned = match (last_comma, last_dot) {
        // Whichever separator comes last is the decimal point
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(c), None) => {
            let decimals = cleaned.len() - c - 1;
            if cleaned.matches(',').count() == 1 && (1..=2).contains(&decimals) {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        _ => cleaned,
    };

    Decimal::from_str(&cleaned).with_context(|| format!("Failed to parse '{s}' as an amount"))
}

/// Compute a stable, deterministic hash for deduplication.
/// FNV-1a is stable across Rust versions, unlike DefaultHasher.
fn compute_hash(input: &str) -> String {
    let hash = fnv1a(input.as_bytes());
    format!("{hash:016x}")
}

fn fnv1a(data: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
