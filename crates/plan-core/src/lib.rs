// # plan-core
//
// Policy-filtering stage of a DNS record reconciliation pipeline.
//
// ## Architecture Overview
//
// A planner upstream diffs desired against observed records and proposes a
// change set. Before a provider applies it, a chain of policies trims the
// change set to the mutations that are safe:
//
// - **Endpoint**: a DNS record with set identifier and ownership labels
// - **Changes**: records to create, update and delete plus the current state
// - **Policy**: one filtering stage, `Changes -> Changes`
// - **PolicyChain**: policies applied in order
// - **Counter**: injectable sink for skipped-record counts
//
// ## Design Principles
//
// 1. **Pure**: no I/O and no state kept between invocations
// 2. **Total**: filtering never fails; rejections are counted and logged
// 3. **Read-only context**: `current` is only consulted, never emitted

pub mod config;
pub mod endpoint;
pub mod error;
pub mod metrics;
pub mod plan;
pub mod policy;

// Re-export core types for convenience
pub use config::PolicyConfig;
pub use endpoint::{Endpoint, Labels, OWNER_LABEL_KEY, Targets};
pub use error::{Error, Result};
pub use metrics::{AtomicCounter, Counter, NoopCounter, PolicyMetrics};
pub use plan::Changes;
pub use policy::{
    CreateOnlyPolicy, NoMixedIdentifierPolicy, OwnedRecordsPolicy, Policy, PolicyChain,
    PolicyKind, SyncPolicy, UpsertOnlyPolicy,
};
