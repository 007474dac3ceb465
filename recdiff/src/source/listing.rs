//! Table API listing responses
//!
//! The table API answers `{"result": [ {...}, ... ]}`. Field values are plain
//! strings, or `{"value": ..., "display_value": ...}` objects when display
//! values are requested.

use recdiff_common::normalize::clean_text;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::{RecordRef, SourceError};

/// Fields tried in order for a record's display name
const DISPLAY_NAME_FIELDS: [&str; 3] = ["name", "short_description", "sys_id"];

#[derive(Debug, Deserialize)]
struct ListResponse {
    result: Vec<Map<String, Value>>,
}

/// Parse a listing response body into record references
///
/// Entries without a `sys_id` are skipped with a warning.
pub fn parse_listing(body: &str) -> Result<Vec<RecordRef>, SourceError> {
    let response: ListResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::Parse(format!("listing response: {}", e)))?;

    let mut records = Vec::with_capacity(response.result.len());
    for (index, entry) in response.result.iter().enumerate() {
        let sys_id = match field_text(entry, "sys_id", false) {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => {
                warn!(index, "Listing entry without sys_id skipped");
                continue;
            }
        };
        let display_name = display_name(entry).unwrap_or_else(|| sys_id.clone());
        records.push(RecordRef { sys_id, display_name });
    }
    Ok(records)
}

/// First non-empty of name, short_description, sys_id, cleaned
fn display_name(entry: &Map<String, Value>) -> Option<String> {
    DISPLAY_NAME_FIELDS
        .iter()
        .filter_map(|field| field_text(entry, field, true))
        .map(|text| clean_text(&text))
        .find(|text| !text.is_empty())
}

/// Text of one field
///
/// For `{value, display_value}` objects `prefer_display` selects which half
/// is tried first.
fn field_text(entry: &Map<String, Value>, field: &str, prefer_display: bool) -> Option<String> {
    match entry.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(obj) => {
            let order = if prefer_display {
                ["display_value", "value"]
            } else {
                ["value", "display_value"]
            };
            order
                .iter()
                .filter_map(|key| obj.get(*key).and_then(Value::as_str))
                .find(|s| !s.is_empty())
                .map(str::to_string)
        }
        Value::Null | Value::Array(_) => None,
    }
}
