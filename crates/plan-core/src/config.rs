//! Configuration types for the plan filtering system
//!
//! This module turns a declarative list of policies into a [`PolicyChain`].

use crate::error::{Error, Result};
use crate::metrics::Counter;
use crate::policy::{
    CreateOnlyPolicy, NoMixedIdentifierPolicy, OwnedRecordsPolicy, PolicyChain, PolicyKind,
    SyncPolicy, UpsertOnlyPolicy,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Policy chain configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Policies to apply, in order
    #[serde(default = "default_policies")]
    pub policies: Vec<PolicyKind>,

    /// Id of this controller instance, required by `owned-records`
    #[serde(default)]
    pub owner_id: Option<String>,
}

impl PolicyConfig {
    /// Create a configuration with the default chain
    pub fn new() -> Self {
        Self {
            policies: default_policies(),
            owner_id: None,
        }
    }

    /// Replace the configured policies
    pub fn with_policies(mut self, policies: Vec<PolicyKind>) -> Self {
        self.policies = policies;
        self
    }

    /// Set the owner id
    pub fn with_owner_id(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// Parse a comma-separated policy list such as `"owned-records,no-mixed-identifier"`
    pub fn parse_policies(list: &str) -> Result<Vec<PolicyKind>> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<PolicyKind>())
            .collect()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.policies.is_empty() {
            return Err(Error::config("No policies configured"));
        }

        if self.policies.contains(&PolicyKind::OwnedRecords)
            && self.owner_id.as_deref().is_none_or(str::is_empty)
        {
            return Err(Error::config(
                "Policy 'owned-records' requires a non-empty owner id",
            ));
        }

        Ok(())
    }

    /// Build the configured chain
    ///
    /// Every `no-mixed-identifier` entry reports to the same `conflict_counter`.
    pub fn build_chain(&self, conflict_counter: Arc<dyn Counter>) -> Result<PolicyChain> {
        self.validate()?;

        let mut chain = PolicyChain::new();
        for kind in &self.policies {
            match kind {
                PolicyKind::Sync => chain.push(Box::new(SyncPolicy)),
                PolicyKind::UpsertOnly => chain.push(Box::new(UpsertOnlyPolicy)),
                PolicyKind::CreateOnly => chain.push(Box::new(CreateOnlyPolicy)),
                PolicyKind::OwnedRecords => {
                    let owner_id = self.owner_id.clone().unwrap_or_default();
                    chain.push(Box::new(OwnedRecordsPolicy::new(owner_id)));
                }
                PolicyKind::NoMixedIdentifier => chain.push(Box::new(
                    NoMixedIdentifierPolicy::new(Arc::clone(&conflict_counter)),
                )),
            }
        }

        Ok(chain)
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_policies() -> Vec<PolicyKind> {
    vec![PolicyKind::Sync]
}
