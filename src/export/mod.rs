use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use std::path::Path;

use crate::models::Transaction;

const HEADER: [&str; 4] = ["date", "category", "description", "amount"];

/// Write transactions as CSV. Missing dates and amounts become empty cells.
pub(crate) fn write_csv<W: Write>(writer: W, txns: &[Transaction]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for txn in txns {
        let date = txn
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let amount = txn.amount.map(|a| a.to_string()).unwrap_or_default();
        wtr.write_record([
            date.as_str(),
            txn.category.as_str(),
            txn.description.as_str(),
            amount.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(txns.len())
}

pub(crate) fn export_to_path(path: &Path, txns: &[Transaction]) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    let count = write_csv(file, txns)?;
    info!("Exported {count} transactions to {}", path.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample() -> Vec<Transaction> {
        let mut missing = Transaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            "Transport".into(),
            "Taxi, late".into(),
            dec!(1),
        );
        missing.date = None;
        missing.amount = None;
        vec![
            Transaction::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                "Food".into(),
                "Lunch".into(),
                dec!(12.50),
            ),
            missing,
        ]
    }

    #[test]
    fn test_write_csv_layout() {
        let mut buf = Vec::new();
        let count = write_csv(&mut buf, &sample()).unwrap();
        assert_eq!(count, 2);
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "date,category,description,amount\n2024-01-01,Food,Lunch,12.50\n,Transport,\"Taxi, late\",\n"
        );
    }

    #[test]
    fn test_write_csv_empty_has_header_only() {
        let mut buf = Vec::new();
        assert_eq!(write_csv(&mut buf, &[]).unwrap(), 0);
        assert_eq!(String::from_utf8(buf).unwrap(), "date,category,description,amount\n");
    }

    #[test]
    fn test_export_reimports_through_csv_importer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        export_to_path(&path, &sample()).unwrap();

        let (headers, rows) = crate::import::CsvImporter::preview(&path).unwrap();
        let profile = crate::import::detect_columns(&headers).unwrap();
        let batch = crate::import::CsvImporter::parse(&rows, &profile, &[]);
        assert_eq!(batch.transactions.len(), 2);
        assert_eq!(batch.transactions[0].amount, Some(dec!(12.50)));
        assert_eq!(batch.transactions[1].description, "Taxi, late");
        assert!(batch.transactions[1].amount.is_none());
    }

    #[test]
    fn test_export_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.csv");
        assert!(export_to_path(&path, &sample()).is_err());
    }
}
