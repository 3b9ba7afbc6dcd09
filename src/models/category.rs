/// Category assigned to rows that arrive without one.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Resolve user input against known category names (case-insensitive),
/// keeping the known spelling. Unknown names are kept as typed, trimmed.
pub fn canonical_category(input: &str, known: &[String]) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return UNCATEGORIZED.to_string();
    }
    let lower = trimmed.to_lowercase();
    known
        .iter()
        .find(|k| k.to_lowercase() == lower)
        .cloned()
        .unwrap_or_else(|| trimmed.to_string())
}
