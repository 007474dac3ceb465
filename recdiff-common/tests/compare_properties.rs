//! Property tests for the record comparator

use proptest::prelude::*;
use recdiff_common::normalize::normalize_field;
use recdiff_common::{compare, ChangeStatus, FieldSet};
use std::collections::BTreeMap;

fn field_set() -> impl Strategy<Value = FieldSet> {
    // Small alphabets so that keys and values collide often
    prop::collection::btree_map("[a-e]{1,2}", prop_oneof![Just(String::new()), "[xyz]{0,3}"], 0..8)
        .prop_map(|map: BTreeMap<String, String>| map.into_iter().collect())
}

fn swapped(status: ChangeStatus) -> ChangeStatus {
    match status {
        ChangeStatus::Added => ChangeStatus::Removed,
        ChangeStatus::Removed => ChangeStatus::Added,
        other => other,
    }
}

proptest! {
    #[test]
    fn prop_compare_is_symmetric(a in field_set(), b in field_set()) {
        let ab = compare(&a, &b, "r");
        let ba = compare(&b, &a, "r");

        prop_assert_eq!(ab.changed_count, ba.changed_count);
        prop_assert_eq!(ab.fields.len(), ba.fields.len());
        for (x, y) in ab.fields.iter().zip(ba.fields.iter()) {
            prop_assert_eq!(&x.name, &y.name);
            prop_assert_eq!(swapped(x.status), y.status);
        }
    }

    #[test]
    fn prop_compare_with_self_is_unchanged(a in field_set()) {
        let result = compare(&a, &a, "r");
        prop_assert_eq!(result.changed_count, 0);
        prop_assert!(result.fields.iter().all(|f| f.status == ChangeStatus::Unchanged));
    }

    #[test]
    fn prop_fields_cover_union_in_order(a in field_set(), b in field_set()) {
        let result = compare(&a, &b, "r");

        let names: Vec<&str> = result.fields.iter().map(|f| f.name.as_str()).collect();
        let mut expected: Vec<&str> = a.names().chain(b.names()).collect();
        expected.sort();
        expected.dedup();
        prop_assert_eq!(names, expected);

        let differing = result.fields.iter().filter(|f| f.status != ChangeStatus::Unchanged).count();
        prop_assert_eq!(result.changed_count, differing);
    }

    #[test]
    fn prop_insertion_order_is_irrelevant(pairs in prop::collection::vec(("[a-e]", "[xy]{0,2}"), 0..6)) {
        let forward: FieldSet = pairs.iter().cloned().collect();
        let backward: FieldSet = pairs.iter().rev().cloned().collect();
        let empty = FieldSet::new();

        let names_fwd: Vec<String> = compare(&forward, &empty, "r").fields.into_iter().map(|f| f.name).collect();
        let names_bwd: Vec<String> = compare(&backward, &empty, "r").fields.into_iter().map(|f| f.name).collect();
        prop_assert_eq!(names_fwd, names_bwd);
    }
}

#[test]
fn test_empty_sets_compare_empty() {
    let result = compare(&FieldSet::new(), &FieldSet::new(), "empty");
    assert!(result.fields.is_empty());
    assert_eq!(result.changed_count, 0);
    assert_eq!(result.record_name, "empty");
}

#[test]
fn test_normalized_scripts_compare_unchanged() {
    let a: FieldSet = [("script", normalize_field("script", "function f(){return 1}"))]
        .into_iter()
        .collect();
    let b: FieldSet = [("script", normalize_field("script", "function f() { return 1; }"))]
        .into_iter()
        .collect();

    let result = compare(&a, &b, "Formatting only");
    assert_eq!(result.changed_count, 0);
    assert_eq!(result.fields[0].status, ChangeStatus::Unchanged);
}

#[test]
fn test_changed_script_needs_text_diff() {
    let a: FieldSet = [("script", normalize_field("script", "function f(){return 1}"))]
        .into_iter()
        .collect();
    let b: FieldSet = [("script", normalize_field("script", "function f(){return 2}"))]
        .into_iter()
        .collect();

    let result = compare(&a, &b, "Real change");
    assert_eq!(result.fields[0].status, ChangeStatus::Changed);
    assert!(result.fields[0].needs_text_diff());
}
