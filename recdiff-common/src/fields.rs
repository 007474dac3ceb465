//! Field sets: one record's field values on one instance

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from field name to field value for one record on one instance
///
/// Field names are unique. A missing field reads as the empty string, so
/// "absent" and "present but empty" are never distinguished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSet {
    fields: BTreeMap<String, String>,
}

impl FieldSet {
    /// Create an empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field value
    ///
    /// Returns the previous value when the name was already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(name.into(), value.into())
    }

    /// Value of a field, or `""` when the field is absent
    pub fn get(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    /// True if the field name is present (even with an empty value)
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in lexicographic order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// `(name, value)` pairs in lexicographic name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

impl<K, V> Extend<(K, V)> for FieldSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_reads_empty() {
        let set: FieldSet = [("name", "Widget")].into_iter().collect();
        assert_eq!(set.get("name"), "Widget");
        assert_eq!(set.get("active"), "");
        assert!(!set.contains("active"));
    }

    #[test]
    fn test_names_are_sorted_regardless_of_insertion_order() {
        let mut set = FieldSet::new();
        set.insert("zeta", "1");
        set.insert("alpha", "2");
        set.insert("mid", "3");

        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_insert_replaces_existing_value() {
        let mut set = FieldSet::new();
        assert_eq!(set.insert("x", "1"), None);
        assert_eq!(set.insert("x", "2"), Some("1".to_string()));
        assert_eq!(set.get("x"), "2");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let set: FieldSet = [("b", "2"), ("a", "1")].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"a":"1","b":"2"}"#);
    }
}
