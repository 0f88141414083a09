//! Product identifier (EAN/GTIN) normalization.
//!
//! Spreadsheet cells arrive as free text or as coerced numbers, so the raw
//! value may carry whitespace, separators or a trailing `.0`.

/// Normalize a raw identifier cell into an ASCII-digit string.
///
/// Strips surrounding whitespace, drops one trailing literal `.0` (a float
/// coercion artifact) and removes every remaining non-digit. Leading zeros are
/// preserved. Returns an empty string when nothing usable remains; callers
/// treat that as "could not normalize" rather than dropping the row.
#[must_use]
pub fn normalize_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    trimmed.chars().filter(char::is_ascii_digit).collect()
}

/// [`normalize_identifier`] for cells that may be missing entirely.
#[must_use]
pub fn normalize_optional(raw: Option<&str>) -> String {
    raw.map(normalize_identifier).unwrap_or_default()
}
