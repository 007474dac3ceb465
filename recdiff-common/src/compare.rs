//! Record comparison and change classification
//!
//! Merges the field sets of one record from two instances, classifies every
//! field and counts the differences. Pure and total: every pair of field sets
//! produces a comparison, including two empty ones.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::fields::FieldSet;
use crate::normalize::is_script_field;

/// Classification of one field's comparison result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ChangeStatus {
    /// Same value on both instances (including both empty)
    Unchanged,
    /// Different non-empty values
    Changed,
    /// Value only on instance B
    Added,
    /// Value only on instance A
    Removed,
}

impl ChangeStatus {
    /// Classify a pair of values
    ///
    /// Equality is checked before emptiness, so two empty values are
    /// `Unchanged`, never `Added` or `Removed`.
    pub fn classify(a: &str, b: &str) -> Self {
        if a == b {
            ChangeStatus::Unchanged
        } else if a.is_empty() {
            ChangeStatus::Added
        } else if b.is_empty() {
            ChangeStatus::Removed
        } else {
            ChangeStatus::Changed
        }
    }

    pub fn is_difference(self) -> bool {
        self != ChangeStatus::Unchanged
    }

    /// Lowercase name used for report attributes
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeStatus::Unchanged => "unchanged",
            ChangeStatus::Changed => "changed",
            ChangeStatus::Added => "added",
            ChangeStatus::Removed => "removed",
        }
    }
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ChangeStatus::Unchanged => "Unchanged",
            ChangeStatus::Changed => "Changed",
            ChangeStatus::Added => "Added",
            ChangeStatus::Removed => "Removed",
        };
        f.write_str(label)
    }
}

/// One field's values on both instances and its classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiff {
    pub name: String,
    pub value_a: String,
    pub value_b: String,
    pub status: ChangeStatus,
}

impl FieldDiff {
    /// True when the report should show a line diff instead of raw values
    ///
    /// Only script fields whose values both exist and differ qualify.
    pub fn needs_text_diff(&self) -> bool {
        self.status == ChangeStatus::Changed && is_script_field(&self.name)
    }
}

/// Full per-record comparison result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordComparison {
    pub record_name: String,
    /// Sorted by field name
    pub fields: Vec<FieldDiff>,
    /// Number of fields whose status is not `Unchanged`
    pub changed_count: usize,
}

impl RecordComparison {
    pub fn has_differences(&self) -> bool {
        self.changed_count > 0
    }

    /// Fields whose status is not `Unchanged`
    pub fn differences(&self) -> impl Iterator<Item = &FieldDiff> {
        self.fields.iter().filter(|f| f.status.is_difference())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDiff> {
        self.fields
            .binary_search_by(|f| f.name.as_str().cmp(name))
            .ok()
            .map(|idx| &self.fields[idx])
    }
}

/// Summary line for one record: `(table, record, changed_count)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub table_name: String,
    pub record_name: String,
    pub changed_count: usize,
}

/// Compare the field sets of one record on instance A and instance B
///
/// The compared names are the union of both key sets in lexicographic order.
/// A field present on one side only is reported with `""` on the other.
pub fn compare(fields_a: &FieldSet, fields_b: &FieldSet, record_name: &str) -> RecordComparison {
    let names: BTreeSet<&str> = fields_a.names().chain(fields_b.names()).collect();

    let fields: Vec<FieldDiff> = names
        .into_iter()
        .map(|name| {
            let value_a = fields_a.get(name);
            let value_b = fields_b.get(name);
            FieldDiff {
                name: name.to_string(),
                value_a: value_a.to_string(),
                value_b: value_b.to_string(),
                status: ChangeStatus::classify(value_a, value_b),
            }
        })
        .collect();

    let changed_count = fields.iter().filter(|f| f.status.is_difference()).count();

    RecordComparison {
        record_name: record_name.to_string(),
        fields,
        changed_count,
    }
}
