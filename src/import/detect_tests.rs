#![allow(clippy::unwrap_used)]

use super::*;

fn h(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_detect_english_headers() {
    let profile = detect_columns(&h(&["Date", "Category", "Description", "Amount"])).unwrap();
    assert_eq!(profile.date_column, 0);
    assert_eq!(profile.category_column, Some(1));
    assert_eq!(profile.description_column, Some(2));
    assert_eq!(profile.amount_column, 3);
    assert_eq!(profile.name, "Detected (Date, Category, Description, Amount)");
}

#[test]
fn test_detect_portuguese_headers_with_accents() {
    let profile = detect_columns(&h(&["Data", "Categoria", "Descrição", "Valor"])).unwrap();
    assert_eq!(profile.date_column, 0);
    assert_eq!(profile.category_column, Some(1));
    assert_eq!(profile.description_column, Some(2));
    assert_eq!(profile.amount_column, 3);
}

#[test]
fn test_detect_reordered_columns() {
    let profile = detect_columns(&h(&["Amount", "Memo", "DATE", "Category"])).unwrap();
    assert_eq!(profile.amount_column, 0);
    assert_eq!(profile.description_column, Some(1));
    assert_eq!(profile.date_column, 2);
    assert_eq!(profile.category_column, Some(3));
}

#[test]
fn test_detect_without_optional_columns() {
    let profile = detect_columns(&h(&["date", "amount"])).unwrap();
    assert!(profile.category_column.is_none());
    assert!(profile.description_column.is_none());
}

#[test]
fn test_detect_requires_date_and_amount() {
    assert!(detect_columns(&h(&["Category", "Amount"])).is_none());
    assert!(detect_columns(&h(&["Date", "Category"])).is_none());
    assert!(detect_columns(&h(&["Column 1", "Column 2"])).is_none());
}

#[test]
fn test_detect_ignores_surrounding_whitespace() {
    let profile = detect_columns(&h(&["  Date ", " Valor  "])).unwrap();
    assert_eq!(profile.date_column, 0);
    assert_eq!(profile.amount_column, 1);
}
