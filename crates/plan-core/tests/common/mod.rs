//! Shared fixtures for the policy contract tests
//!
//! Mirrors the record shapes a planner produces: plain records, records
//! carrying a set identifier, and both with or without an owner label.

#![allow(dead_code)]

use plan_core::{Changes, Endpoint, Targets};

/// A plain record with a single target
pub fn plain(name: &str, target: &str) -> Endpoint {
    Endpoint::new(name, "A", Targets::new([target]))
}

/// A record that is one member of an identified set
pub fn identified(name: &str, set_identifier: &str, target: &str) -> Endpoint {
    plain(name, target).with_set_identifier(set_identifier)
}

/// `foo` before an update
pub fn foo_v1() -> Vec<Endpoint> {
    vec![plain("foo", "v1")]
}

/// `foo` after an update
pub fn foo_v2() -> Vec<Endpoint> {
    vec![plain("foo", "v2")]
}

pub fn bar() -> Vec<Endpoint> {
    vec![plain("bar", "v1")]
}

pub fn baz() -> Vec<Endpoint> {
    vec![plain("baz", "v1")]
}

/// The identified `multi-cluster` record
pub fn multi_identified() -> Vec<Endpoint> {
    vec![identified("multi-cluster", "id1", "identified")]
}

/// The plain `multi-cluster` record
pub fn multi_plain() -> Vec<Endpoint> {
    vec![plain("multi-cluster", "non-identified")]
}

/// A change set touching `foo`, `bar` and `baz` with no identifier conflicts
pub fn conflict_free() -> Changes {
    Changes::new()
        .with_create(baz())
        .with_updates(foo_v1(), foo_v2())
        .with_delete(bar())
}

/// Assert that two endpoint lists hold the same records in the same order
pub fn assert_entries(actual: &[Endpoint], expected: &[Endpoint], what: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{}: expected {} entries, got {}: {:?}",
        what,
        expected.len(),
        actual.len(),
        actual.iter().map(ToString::to_string).collect::<Vec<_>>()
    );
    for (a, e) in actual.iter().zip(expected) {
        assert_eq!(a, e, "{}: entry mismatch", what);
    }
}

/// Assert that every mutation field matches the expectation
pub fn assert_changes(actual: &Changes, expected: &Changes) {
    assert_entries(&actual.create, &expected.create, "create");
    assert_entries(&actual.update_old, &expected.update_old, "update_old");
    assert_entries(&actual.update_new, &expected.update_new, "update_new");
    assert_entries(&actual.delete, &expected.delete, "delete");
}
