use anyhow::{bail, Result};
use chrono::Local;
use rust_decimal::Decimal;

use super::csv_import::{parse_date, parse_decimal};
use crate::models::{canonical_category, Transaction};

/// Build a transaction from values typed by the user. Unlike file import,
/// bad values are rejected instead of stored as missing.
pub(crate) fn manual_entry(
    date: &str,
    category: &str,
    amount: &str,
    description: &str,
    known: &[String],
) -> Result<Transaction> {
    let date = if date.trim().eq_ignore_ascii_case("today") {
        Local::now().date_naive()
    } else {
        parse_date(date, "%Y-%m-%d")?
    };
    let amount = parse_amount(amount)?;
    Ok(Transaction::new(
        date,
        canonical_category(category, known),
        description.trim().to_string(),
        amount,
    ))
}

/// A non-negative money value, e.g. a goal limit or an expense.
pub(crate) fn parse_amount(s: &str) -> Result<Decimal> {
    let amount = parse_decimal(s)?;
    if amount < Decimal::ZERO {
        bail!("Amount must not be negative: {s}");
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn known() -> Vec<String> {
        vec!["Food".into(), "Transport".into()]
    }

    #[test]
    fn test_manual_entry_resolves_category() {
        let txn = manual_entry("2024-02-10", "food", "R$ 12,50", " lunch ", &known()).unwrap();
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 2, 10));
        assert_eq!(txn.category, "Food");
        assert_eq!(txn.description, "lunch");
        assert_eq!(txn.amount, Some(dec!(12.50)));
        assert!(txn.import_hash.is_empty());
    }

    #[test]
    fn test_manual_entry_day_first_date() {
        let txn = manual_entry("25/12/2024", "Gifts", "40", "", &known()).unwrap();
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 12, 25));
        assert_eq!(txn.category, "Gifts");

        let txn = manual_entry("05/03/2024", "Food", "1", "", &known()).unwrap();
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn test_manual_entry_today() {
        let txn = manual_entry("today", "Food", "1", "", &known()).unwrap();
        assert_eq!(txn.date, Some(Local::now().date_naive()));
    }

    #[test]
    fn test_manual_entry_rejects_bad_values() {
        assert!(manual_entry("someday", "Food", "10", "", &known()).is_err());
        assert!(manual_entry("2024-01-01", "Food", "ten", "", &known()).is_err());
        assert!(manual_entry("2024-01-01", "Food", "-5", "", &known()).is_err());
    }

    #[test]
    fn test_blank_category_becomes_uncategorized() {
        let txn = manual_entry("2024-01-01", "  ", "3", "", &known()).unwrap();
        assert_eq!(txn.category, crate::models::UNCATEGORIZED);
    }

    #[test]
    fn test_parse_amount_allows_zero() {
        assert_eq!(parse_amount("0").unwrap(), Decimal::ZERO);
        assert_eq!(parse_amount("$1,200").unwrap(), dec!(1200));
    }
}
