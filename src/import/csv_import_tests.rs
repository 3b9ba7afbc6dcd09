#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;
use std::io::Write;

fn make_csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn row(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|s| s.to_string()).collect()
}

fn known() -> Vec<String> {
    vec!["Food".into(), "Transport".into()]
}

// ── parse_decimal ─────────────────────────────────────────────

#[test]
fn test_parse_decimal_basic() {
    assert_eq!(parse_decimal("100.50").unwrap(), dec!(100.50));
    assert_eq!(parse_decimal("-42.99").unwrap(), dec!(-42.99));
    assert_eq!(parse_decimal("42").unwrap(), dec!(42));
}

#[test]
fn test_parse_decimal_with_currency() {
    assert_eq!(parse_decimal("$1,234.56").unwrap(), dec!(1234.56));
    assert_eq!(parse_decimal("R$ 35,90").unwrap(), dec!(35.90));
}

#[test]
fn test_parse_decimal_decimal_comma_with_thousands() {
    assert_eq!(parse_decimal("1.234,56").unwrap(), dec!(1234.56));
    assert_eq!(parse_decimal("R$ 1.234.567,89").unwrap(), dec!(1234567.89));
}

#[test]
fn test_parse_decimal_comma_thousands_only() {
    assert_eq!(parse_decimal("1,234").unwrap(), dec!(1234));
    assert_eq!(parse_decimal("12,5").unwrap(), dec!(12.5));
}

#[test]
fn test_parse_decimal_parentheses_negative() {
    assert_eq!(parse_decimal("(500.00)").unwrap(), dec!(-500.00));
}

#[test]
fn test_parse_decimal_quoted() {
    assert_eq!(parse_decimal("\"100.00\"").unwrap(), dec!(100.00));
}

#[test]
fn test_parse_decimal_empty_is_error() {
    assert!(parse_decimal("").is_err());
    assert!(parse_decimal("  ").is_err());
}

#[test]
fn test_parse_decimal_invalid() {
    assert!(parse_decimal("not_a_number").is_err());
    assert!(parse_decimal("12abc").is_err());
}

// ── parse_date ────────────────────────────────────────────────

#[test]
fn test_parse_date_iso() {
    let d = parse_date("2024-01-15", "%Y-%m-%d").unwrap();
    assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
}

#[test]
fn test_parse_date_profile_format_wins() {
    let d = parse_date("02/01/2024", "%d/%m/%Y").unwrap();
    assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
}

#[test]
fn test_parse_date_ambiguous_is_day_first() {
    let d = parse_date("05/03/2024", "%Y-%m-%d").unwrap();
    assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
}

#[test]
fn test_parse_date_month_first_when_unambiguous() {
    let d = parse_date("01/15/2024", "%Y-%m-%d").unwrap();
    assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
}

#[test]
fn test_parse_date_fallback_day_first_when_unambiguous() {
    let d = parse_date("25/12/2023", "%Y-%m-%d").unwrap();
    assert_eq!(d, NaiveDate::from_ymd_opt(2023, 12, 25).unwrap());
}

#[test]
fn test_parse_date_with_time() {
    let d = parse_date("2024-01-15 00:00:00", "%Y-%m-%d").unwrap();
    assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    let d = parse_date("2024-01-15T08:30:00", "%Y-%m-%d").unwrap();
    assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
}

#[test]
fn test_parse_date_invalid() {
    assert!(parse_date("not-a-date", "%Y-%m-%d").is_err());
    assert!(parse_date("", "%Y-%m-%d").is_err());
    assert!(parse_date("2024-02-30", "%Y-%m-%d").is_err());
}

// ── CsvImporter::preview ──────────────────────────────────────

#[test]
fn test_preview_with_headers() {
    let csv = "Date,Category,Description,Amount\n2024-01-15,Food,Lunch,12.00\n2024-01-16,Transport,Bus,4.50\n";
    let file = make_csv_file(csv);
    let (headers, rows) = CsvImporter::preview(file.path()).unwrap();
    assert_eq!(headers, vec!["Date", "Category", "Description", "Amount"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][2], "Lunch");
}

#[test]
fn test_preview_without_headers() {
    let csv = "2024-01-15,Food,Lunch,12.00\n";
    let file = make_csv_file(csv);
    let (headers, rows) = CsvImporter::preview(file.path()).unwrap();
    assert_eq!(headers[0], "Column 1");
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_preview_empty_file() {
    let file = make_csv_file("");
    assert!(CsvImporter::preview(file.path()).is_err());
}

#[test]
fn test_preview_quoted_fields() {
    let csv = "Data,Categoria,Descrição,Valor\n2024-01-15,Food,\"Coffee, milk\",\"3,50\"\n";
    let file = make_csv_file(csv);
    let (_, rows) = CsvImporter::preview(file.path()).unwrap();
    assert_eq!(rows[0][2], "Coffee, milk");
    assert_eq!(rows[0][3], "3,50");
}

// ── CsvImporter::parse ────────────────────────────────────────

#[test]
fn test_parse_basic_rows() {
    let rows = vec![
        row(&["2024-01-15", "food", "Lunch", "12.00"]),
        row(&["2024-01-16", "Transport", "Bus", "4.50"]),
    ];
    let batch = CsvImporter::parse(&rows, &CsvProfile::default(), &known());
    assert_eq!(batch.transactions.len(), 2);
    let first = &batch.transactions[0];
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 15));
    assert_eq!(first.category, "Food");
    assert_eq!(first.description, "Lunch");
    assert_eq!(first.amount, Some(dec!(12.00)));
    assert!(!first.import_hash.is_empty());
}

#[test]
fn test_parse_bad_amount_keeps_going() {
    let rows = vec![
        row(&["2024-01-15", "Food", "Lunch", "abc"]),
        row(&["2024-01-16", "Food", "Dinner", "20"]),
        row(&["2024-01-17", "Food", "Snack", ""]),
        row(&["2024-01-18", "Food", "Refund", "-5"]),
    ];
    let batch = CsvImporter::parse(&rows, &CsvProfile::default(), &known());
    assert_eq!(batch.transactions.len(), 4);
    assert_eq!(batch.bad_amounts, 3);
    assert!(batch.transactions[0].amount.is_none());
    assert_eq!(batch.transactions[1].amount, Some(dec!(20)));
    assert!(batch.transactions[2].amount.is_none());
    assert!(batch.transactions[3].amount.is_none());

    let totals = crate::analytics::category_totals(&batch.transactions);
    assert_eq!(totals["Food"], dec!(20));
}

#[test]
fn test_parse_bad_date_is_missing() {
    let rows = vec![row(&["someday", "Food", "Lunch", "10"])];
    let batch = CsvImporter::parse(&rows, &CsvProfile::default(), &known());
    assert_eq!(batch.bad_dates, 1);
    assert!(batch.transactions[0].date.is_none());
    assert_eq!(batch.transactions[0].amount, Some(dec!(10)));
}

#[test]
fn test_parse_skips_blank_rows() {
    let rows = vec![
        row(&["2024-01-15", "Food", "Lunch", "12"]),
        row(&["", " ", "", ""]),
        row(&["2024-01-16", "Food", "Lunch", "12"]),
    ];
    let batch = CsvImporter::parse(&rows, &CsvProfile::default(), &known());
    assert_eq!(batch.transactions.len(), 2);
    assert_eq!(batch.skipped_blank, 1);
}

#[test]
fn test_parse_short_row_and_missing_category() {
    let rows = vec![row(&["2024-01-15", "", "Lunch", "7"]), row(&["2024-01-15"])];
    let batch = CsvImporter::parse(&rows, &CsvProfile::default(), &known());
    assert_eq!(batch.transactions[0].category, "Uncategorized");
    assert!(batch.transactions[1].amount.is_none());
}

#[test]
fn test_parse_skip_rows() {
    let profile = CsvProfile {
        skip_rows: 1,
        ..CsvProfile::default()
    };
    let rows = vec![
        row(&["Exported by bank", "", "", ""]),
        row(&["2024-01-15", "Food", "Lunch", "12"]),
    ];
    let batch = CsvImporter::parse(&rows, &profile, &known());
    assert_eq!(batch.transactions.len(), 1);
    assert_eq!(batch.bad_dates, 0);
}

#[test]
fn test_parse_with_detected_profile() {
    let headers = row(&["Valor", "Data", "Categoria"]);
    let profile = crate::import::detect_columns(&headers).unwrap();
    let rows = vec![row(&["R$ 1.050,00", "2024-03-01", "Moradia"])];
    let batch = CsvImporter::parse(&rows, &profile, &known());
    let t = &batch.transactions[0];
    assert_eq!(t.amount, Some(dec!(1050)));
    assert_eq!(t.category, "Moradia");
    assert!(t.description.is_empty());
}

#[test]
fn test_identical_rows_get_distinct_stable_hashes() {
    let rows = vec![
        row(&["2024-01-15", "Food", "Coffee", "3"]),
        row(&["2024-01-15", "Food", "Coffee", "3"]),
    ];
    let a = CsvImporter::parse(&rows, &CsvProfile::default(), &known());
    let b = CsvImporter::parse(&rows, &CsvProfile::default(), &known());
    assert_ne!(a.transactions[0].import_hash, a.transactions[1].import_hash);
    assert_eq!(a.transactions[0].import_hash, b.transactions[0].import_hash);
    assert_eq!(a.transactions[1].import_hash, b.transactions[1].import_hash);
}

#[test]
fn test_batch_summary() {
    let batch = ImportBatch {
        transactions: Vec::new(),
        bad_dates: 1,
        bad_amounts: 2,
        skipped_blank: 0,
    };
    assert_eq!(
        batch.summary(),
        "Parsed 0 rows, 1 with unreadable dates, 2 with unreadable amounts"
    );
    assert_eq!(ImportBatch::default().summary(), "Parsed 0 rows");
}

// ── compute_hash ──────────────────────────────────────────────

#[test]
fn test_hash_is_deterministic() {
    assert_eq!(compute_hash("a|b"), compute_hash("a|b"));
    assert_ne!(compute_hash("a|b"), compute_hash("a|c"));
    assert_eq!(compute_hash("").len(), 16);
}
