//! Planned change sets
//!
//! A [`Changes`] value is produced once per reconciliation cycle by the
//! planner, passed through the policy chain and handed to the provider.
//!
//! `update_old` and `update_new` are parallel sequences describing
//! before/after pairs. Nothing here re-validates that pairing.

use crate::endpoint::{Endpoint, null_as_default};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// A proposed mutation plus the currently observed records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changes {
    /// Records to create
    #[serde(default, deserialize_with = "null_as_default")]
    pub create: Vec<Endpoint>,

    /// Records to update, state before the update
    #[serde(default, deserialize_with = "null_as_default")]
    pub update_old: Vec<Endpoint>,

    /// Records to update, desired state after the update
    #[serde(default, deserialize_with = "null_as_default")]
    pub update_new: Vec<Endpoint>,

    /// Records to delete
    #[serde(default, deserialize_with = "null_as_default")]
    pub delete: Vec<Endpoint>,

    /// Full observed record set, read-only context for policies.
    /// Never serialized: the provider does not receive it.
    #[serde(default, skip_serializing, deserialize_with = "null_as_default")]
    pub current: Vec<Endpoint>,
}

impl Changes {
    /// Create an empty change set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_create(mut self, endpoints: Vec<Endpoint>) -> Self {
        self.create = endpoints;
        self
    }

    /// Set the update pair sequences
    pub fn with_updates(mut self, old: Vec<Endpoint>, new: Vec<Endpoint>) -> Self {
        self.update_old = old;
        self.update_new = new;
        self
    }

    pub fn with_delete(mut self, endpoints: Vec<Endpoint>) -> Self {
        self.delete = endpoints;
        self
    }

    pub fn with_current(mut self, endpoints: Vec<Endpoint>) -> Self {
        self.current = endpoints;
        self
    }

    /// Whether any mutation is left for the provider to apply
    pub fn has_changes(&self) -> bool {
        !(self.create.is_empty()
            && self.update_old.is_empty()
            && self.update_new.is_empty()
            && self.delete.is_empty())
    }

    /// Parse a change set from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a change set from a JSON reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Render the change set as pretty-printed JSON, without `current`
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Targets;

    fn ep(name: &str) -> Endpoint {
        Endpoint::new(name, "A", Targets::new(["v1"]))
    }

    #[test]
    fn test_has_changes() {
        assert!(!Changes::new().has_changes());
        assert!(!Changes::new().with_current(vec![ep("foo")]).has_changes());
        assert!(Changes::new().with_delete(vec![ep("foo")]).has_changes());
        assert!(
            Changes::new()
                .with_updates(vec![ep("foo")], vec![ep("foo")])
                .has_changes()
        );
    }

    #[test]
    fn test_missing_and_null_sequences_are_empty() {
        let changes = Changes::from_json_str(r#"{"create":null,"delete":[{"dnsName":"bar"}]}"#).unwrap();
        assert!(changes.create.is_empty());
        assert!(changes.update_old.is_empty());
        assert!(changes.update_new.is_empty());
        assert!(changes.current.is_empty());
        assert_eq!(changes.delete.len(), 1);
        assert_eq!(changes.delete[0].dns_name, "bar");
    }

    #[test]
    fn test_current_is_not_serialized() {
        let changes = Changes::new()
            .with_create(vec![ep("foo")])
            .with_current(vec![ep("bar")]);
        let json = changes.to_json_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("current").is_none());
        assert_eq!(value["create"][0]["dnsName"], "foo");
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Changes::from_json_str("{not json").is_err());
    }
}
