use log::debug;

use super::CsvProfile;

const DATE_HEADERS: &[&str] = &["date", "data", "transaction date", "posted date", "dia"];
const CATEGORY_HEADERS: &[&str] = &["category", "categoria", "type", "tipo"];
const DESCRIPTION_HEADERS: &[&str] = &[
    "description",
    "descricao",
    "memo",
    "details",
    "payee",
    "historico",
];
const AMOUNT_HEADERS: &[&str] = &["amount", "valor", "value", "price", "preco", "total"];

/// Map header names to columns. Matching is case-insensitive and ignores
/// Portuguese accents, so both "Date,Category,Amount" and
/// "Data,Categoria,Descrição,Valor" are recognised.
///
/// Returns `None` unless at least a date and an amount column are found.
pub(crate) fn detect_columns(headers: &[String]) -> Option<CsvProfile> {
    let h: Vec<String> = headers.iter().map(|s| normalize_header(s)).collect();

    let date_column = col_index(&h, DATE_HEADERS)?;
    let amount_column = col_index(&h, AMOUNT_HEADERS)?;
    let category_column = col_index(&h, CATEGORY_HEADERS);
    let description_column = col_index(&h, DESCRIPTION_HEADERS);

    let named: Vec<&str> = [
        Some(date_column),
        category_column,
        description_column,
        Some(amount_column),
    ]
    .iter()
    .flatten()
    .filter_map(|&i| headers.get(i).map(|s| s.trim()))
    .collect();

    let profile = CsvProfile {
        name: format!("Detected ({})", named.join(", ")),
        date_column,
        category_column,
        description_column,
        amount_column,
        ..CsvProfile::default()
    };
    debug!("Detected CSV columns: {profile:?}");
    Some(profile)
}

fn normalize_header(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

fn col_index(headers: &[String], names: &[&str]) -> Option<usize> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name))
}

#[cfg(test)]
#[path = "detect_tests.rs"]
mod tests;
