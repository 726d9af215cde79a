//! Change-set policies
//!
//! A [`Policy`] inspects a planned [`Changes`] value and returns the part of
//! it that is safe to apply. Policies compose by sequential application
//! through a [`PolicyChain`]; order matters when two policies overlap.
//!
//! - [`SyncPolicy`]: apply everything
//! - [`UpsertOnlyPolicy`]: never delete
//! - [`CreateOnlyPolicy`]: only create
//! - [`OwnedRecordsPolicy`]: only touch records owned by this controller
//! - [`NoMixedIdentifierPolicy`]: never mix identified and plain records
//!
//! Every policy passes `current` through untouched.

pub mod no_mixed;
pub mod owned;

pub use no_mixed::NoMixedIdentifierPolicy;
pub use owned::OwnedRecordsPolicy;

use crate::error::Error;
use crate::plan::Changes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A filtering stage applied to a change set before it reaches the provider
///
/// # Contract
///
/// - The output contains the same or a subset of the input's
///   create/update/delete entries, in their original relative order.
/// - `current` is returned unchanged.
/// - The only permitted side effects are counters and log lines.
pub trait Policy: Send + Sync {
    /// Filter a change set
    fn apply(&self, changes: Changes) -> Changes;

    /// Short name for logging
    fn name(&self) -> &'static str;
}

/// Policy that allows full synchronisation
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncPolicy;

impl Policy for SyncPolicy {
    fn apply(&self, changes: Changes) -> Changes {
        changes
    }

    fn name(&self) -> &'static str {
        "sync"
    }
}

/// Policy that allows creates and updates but drops every delete
#[derive(Debug, Clone, Copy, Default)]
pub struct UpsertOnlyPolicy;

impl Policy for UpsertOnlyPolicy {
    fn apply(&self, changes: Changes) -> Changes {
        Changes {
            delete: Vec::new(),
            ..changes
        }
    }

    fn name(&self) -> &'static str {
        "upsert-only"
    }
}

/// Policy that only allows creating records
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOnlyPolicy;

impl Policy for CreateOnlyPolicy {
    fn apply(&self, changes: Changes) -> Changes {
        Changes {
            create: changes.create,
            current: changes.current,
            ..Changes::default()
        }
    }

    fn name(&self) -> &'static str {
        "create-only"
    }
}

/// Ordered list of policies applied one after another
#[derive(Default)]
pub struct PolicyChain {
    policies: Vec<Box<dyn Policy>>,
}

impl PolicyChain {
    /// Create an empty chain (the identity transformation)
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a policy to the end of the chain
    pub fn with_policy(mut self, policy: impl Policy + 'static) -> Self {
        self.policies.push(Box::new(policy));
        self
    }

    /// Append a boxed policy to the end of the chain
    pub fn push(&mut self, policy: Box<dyn Policy>) {
        self.policies.push(policy);
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Names of the policies, in application order
    pub fn names(&self) -> Vec<&'static str> {
        self.policies.iter().map(|p| p.name()).collect()
    }

    /// Run the change set through every policy in order
    pub fn apply(&self, changes: Changes) -> Changes {
        self.policies.iter().fold(changes, |changes, policy| {
            let filtered = policy.apply(changes);
            debug!(
                policy = policy.name(),
                create = filtered.create.len(),
                update = filtered.update_new.len(),
                delete = filtered.delete.len(),
                "Applied policy"
            );
            filtered
        })
    }
}

impl fmt::Debug for PolicyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyChain")
            .field("policies", &self.names())
            .finish()
    }
}

/// Policy variants that can be selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// [`SyncPolicy`]
    Sync,
    /// [`UpsertOnlyPolicy`]
    UpsertOnly,
    /// [`CreateOnlyPolicy`]
    CreateOnly,
    /// [`OwnedRecordsPolicy`]
    OwnedRecords,
    /// [`NoMixedIdentifierPolicy`]
    NoMixedIdentifier,
}

impl PolicyKind {
    /// Configuration name of the variant
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Sync => "sync",
            PolicyKind::UpsertOnly => "upsert-only",
            PolicyKind::CreateOnly => "create-only",
            PolicyKind::OwnedRecords => "owned-records",
            PolicyKind::NoMixedIdentifier => "no-mixed-identifier",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sync" => Ok(PolicyKind::Sync),
            "upsert-only" => Ok(PolicyKind::UpsertOnly),
            "create-only" => Ok(PolicyKind::CreateOnly),
            "owned-records" => Ok(PolicyKind::OwnedRecords),
            "no-mixed-identifier" => Ok(PolicyKind::NoMixedIdentifier),
            other => Err(Error::invalid_input(format!(
                "unknown policy '{}'. Valid policies: sync, upsert-only, create-only, \
                owned-records, no-mixed-identifier",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Endpoint, Targets};

    fn ep(name: &str) -> Endpoint {
        Endpoint::new(name, "A", Targets::new(["v1"]))
    }

    fn sample() -> Changes {
        Changes::new()
            .with_create(vec![ep("new")])
            .with_updates(vec![ep("upd")], vec![ep("upd")])
            .with_delete(vec![ep("gone")])
            .with_current(vec![ep("upd"), ep("gone")])
    }

    #[test]
    fn test_sync_policy_passes_everything() {
        assert_eq!(SyncPolicy.apply(sample()), sample());
    }

    #[test]
    fn test_upsert_only_drops_deletes() {
        let changes = UpsertOnlyPolicy.apply(sample());
        assert_eq!(changes.create, sample().create);
        assert_eq!(changes.update_old, sample().update_old);
        assert_eq!(changes.update_new, sample().update_new);
        assert!(changes.delete.is_empty());
        assert_eq!(changes.current, sample().current);
    }

    #[test]
    fn test_create_only_keeps_creates() {
        let changes = CreateOnlyPolicy.apply(sample());
        assert_eq!(changes.create, sample().create);
        assert!(changes.update_old.is_empty());
        assert!(changes.update_new.is_empty());
        assert!(changes.delete.is_empty());
        assert_eq!(changes.current, sample().current);
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chain = PolicyChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.apply(sample()), sample());
    }

    #[test]
    fn test_chain_applies_in_order() {
        let chain = PolicyChain::new()
            .with_policy(UpsertOnlyPolicy)
            .with_policy(CreateOnlyPolicy);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.names(), vec!["upsert-only", "create-only"]);

        let changes = chain.apply(sample());
        assert_eq!(changes.create.len(), 1);
        assert!(changes.update_new.is_empty());
        assert!(changes.delete.is_empty());
    }

    #[test]
    fn test_policy_kind_parse() {
        assert_eq!("sync".parse::<PolicyKind>().unwrap(), PolicyKind::Sync);
        assert_eq!(" Owned-Records ".parse::<PolicyKind>().unwrap(), PolicyKind::OwnedRecords);
        assert_eq!(
            "no-mixed-identifier".parse::<PolicyKind>().unwrap(),
            PolicyKind::NoMixedIdentifier
        );
        assert!("delete-everything".parse::<PolicyKind>().is_err());
    }

    #[test]
    fn test_policy_kind_config_names() {
        for kind in [
            PolicyKind::Sync,
            PolicyKind::UpsertOnly,
            PolicyKind::CreateOnly,
            PolicyKind::OwnedRecords,
            PolicyKind::NoMixedIdentifier,
        ] {
            assert_eq!(kind.as_str().parse::<PolicyKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
