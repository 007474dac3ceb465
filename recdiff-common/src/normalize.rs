//! Field value normalization
//!
//! Applied by the field extractor to every value before it lands in a
//! [`FieldSet`](crate::FieldSet), identically for both instances:
//! - all fields: strip byte-order marks and zero-width spaces, trim
//! - script fields: pretty-print first, falling back to the raw text when the
//!   formatter rejects it

use tracing::warn;

use crate::script_format::{format_script, FormatError};

const BYTE_ORDER_MARK: char = '\u{feff}';
const ZERO_WIDTH_SPACE: char = '\u{200b}';

/// True when the field name signals source-code content
pub fn is_script_field(name: &str) -> bool {
    name.to_lowercase().contains("script")
}

/// Remove invisible marker characters and surrounding whitespace
pub fn clean_text(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|&c| c != BYTE_ORDER_MARK && c != ZERO_WIDTH_SPACE)
        .collect();
    stripped.trim().to_string()
}

/// Normalize a field value, reporting formatter failures
///
/// Non-script fields never fail.
pub fn try_normalize_field(name: &str, raw: &str) -> Result<String, FormatError> {
    let cleaned = clean_text(raw);
    if !is_script_field(name) || cleaned.is_empty() {
        return Ok(cleaned);
    }
    let formatted = format_script(&cleaned)?;
    Ok(clean_text(&formatted))
}

/// Normalize a field value
///
/// A script the formatter rejects keeps its raw (cleaned) text and a warning
/// is logged; the failure never propagates.
pub fn normalize_field(name: &str, raw: &str) -> String {
    match try_normalize_field(name, raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(field = %name, error = %e, "Script formatting failed, comparing raw text");
            clean_text(raw)
        }
    }
}
