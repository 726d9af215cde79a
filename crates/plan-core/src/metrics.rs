// # Metrics
//
// Counters incremented by policies when they drop part of a change set.
//
// Policies receive a [`Counter`] at construction instead of touching a
// global, so several independent policy instances (and tests) can each
// observe their own counts. [`PolicyMetrics`] owns a Prometheus registry for
// the process that wants to export them.

use crate::error::Result;
use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};
use std::sync::atomic::{AtomicU64, Ordering};

/// Namespace prefix for exported metrics
const METRICS_NAMESPACE: &str = "planfilter";

/// Subsystem for policy metrics
const POLICY_SUBSYSTEM: &str = "policy";

/// Monotonic counter sink
///
/// Increments are fire-and-forget: they must not block and cannot fail.
pub trait Counter: Send + Sync {
    /// Add one to the counter
    fn increment(&self);
}

/// Counter that discards every increment
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCounter;

impl Counter for NoopCounter {
    fn increment(&self) {}
}

/// In-process counter backed by an atomic
#[derive(Debug, Default)]
pub struct AtomicCounter {
    value: AtomicU64,
}

impl AtomicCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Counter for AtomicCounter {
    fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }
}

impl Counter for IntCounter {
    fn increment(&self) {
        self.inc();
    }
}

/// Prometheus registry holding the policy counters
#[derive(Clone)]
pub struct PolicyMetrics {
    registry: Registry,
    conflict_skip_total: IntCounter,
}

impl PolicyMetrics {
    /// Create a registry and register the policy counters in it
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let conflict_skip_total = IntCounter::with_opts(
            Opts::new("conflict_skip_total", "Number of skipped records.")
                .namespace(METRICS_NAMESPACE)
                .subsystem(POLICY_SUBSYSTEM),
        )?;
        registry.register(Box::new(conflict_skip_total.clone()))?;

        Ok(Self {
            registry,
            conflict_skip_total,
        })
    }

    /// Counter of record creations skipped because of identifier conflicts
    pub fn conflict_skip_total(&self) -> IntCounter {
        self.conflict_skip_total.clone()
    }

    /// The underlying registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode all registered metrics in the Prometheus text format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| crate::Error::Other(e.to_string()))
    }
}
