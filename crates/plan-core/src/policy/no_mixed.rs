// # No Mixed Identifier Policy
//
// A DNS name must not end up holding both identified (weighted, geo, ...)
// and plain records at the same time.
//
// Moving a name from plain to identified records, or back, has to delete the
// old-shape record before creating the new ones. When the planner proposes
// both in the same cycle the provider may apply them in any order, so this
// policy drops every create that would collide with an existing record of
// the other shape, unless a matching delete of that record is part of the
// same change set.
//
// ## Algorithm
//
// 1. Index `current` by name, separately for plain and identified records.
//    Duplicates within one shape overwrite each other; only presence matters.
// 2. Remove from the index every record that a same-owner delete takes away.
// 3. Keep a create only if the index of the other shape has no entry for
//    its name.
//
// Only `create` is filtered; everything else passes through.

use crate::endpoint::Endpoint;
use crate::metrics::{Counter, NoopCounter};
use crate::plan::Changes;
use crate::policy::Policy;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Policy that avoids creating mixed record shapes (with/without identifier)
#[derive(Clone)]
pub struct NoMixedIdentifierPolicy {
    /// Incremented once per skipped create
    conflict_skip_total: Arc<dyn Counter>,
}

impl NoMixedIdentifierPolicy {
    /// Create the policy reporting skipped creates to `counter`
    pub fn new(counter: Arc<dyn Counter>) -> Self {
        Self {
            conflict_skip_total: counter,
        }
    }
}

impl Default for NoMixedIdentifierPolicy {
    fn default() -> Self {
        Self::new(Arc::new(NoopCounter))
    }
}

impl fmt::Debug for NoMixedIdentifierPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoMixedIdentifierPolicy").finish_non_exhaustive()
    }
}

/// Current records indexed by name, one map per record shape
#[derive(Default)]
struct KnownRecords<'a> {
    plain: HashMap<&'a str, &'a Endpoint>,
    identified: HashMap<&'a str, &'a Endpoint>,
}

impl<'a> KnownRecords<'a> {
    fn index(current: &'a [Endpoint]) -> Self {
        let mut known = Self::default();
        for ep in current {
            known.same_shape_mut(ep).insert(ep.dns_name.as_str(), ep);
        }
        known
    }

    fn same_shape_mut(&mut self, ep: &Endpoint) -> &mut HashMap<&'a str, &'a Endpoint> {
        if ep.is_identified() {
            &mut self.identified
        } else {
            &mut self.plain
        }
    }

    /// Drop the indexed record a delete candidate takes away, if the owners agree
    fn forget(&mut self, candidate: &Endpoint) {
        let shape = self.same_shape_mut(candidate);
        if shape
            .get(candidate.dns_name.as_str())
            .is_some_and(|known| same_owner(candidate, known))
        {
            shape.remove(candidate.dns_name.as_str());
        }
    }

    /// The known record of the other shape sharing the candidate's name
    fn conflict_for(&self, candidate: &Endpoint) -> Option<&'a Endpoint> {
        let other_shape = if candidate.is_identified() {
            &self.plain
        } else {
            &self.identified
        };
        other_shape.get(candidate.dns_name.as_str()).copied()
    }
}

/// Owner comparison used when matching deletes against current records.
///
/// The candidate is authoritative: without an owner label it matches any
/// record, with one it only matches a record carrying the same label value.
fn same_owner(candidate: &Endpoint, known: &Endpoint) -> bool {
    match candidate.owner() {
        Some(owner) => known.owner() == Some(owner),
        None => true,
    }
}

impl Policy for NoMixedIdentifierPolicy {
    fn apply(&self, changes: Changes) -> Changes {
        let Changes {
            create,
            update_old,
            update_new,
            delete,
            current,
        } = changes;

        let create: Vec<Endpoint> = {
            let mut known = KnownRecords::index(&current);
            for candidate in &delete {
                known.forget(candidate);
            }

            create
                .into_iter()
                .filter(|ep| match known.conflict_for(ep) {
                    None => true,
                    Some(conflicting) => {
                        self.conflict_skip_total.increment();
                        if ep.is_identified() {
                            info!(
                                "Skipping endpoint creation {} with identifier because there exists a conflicting record without identifier: {}",
                                ep, conflicting
                            );
                        } else {
                            info!(
                                "Skipping endpoint creation {} without identifier because there exists a conflicting record with identifier: {}",
                                ep, conflicting
                            );
                        }
                        false
                    }
                })
                .collect()
        };

        Changes {
            create,
            update_old,
            update_new,
            delete,
            current,
        }
    }

    fn name(&self) -> &'static str {
        "no-mixed-identifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Targets;
    use crate::metrics::AtomicCounter;

    fn plain(name: &str) -> Endpoint {
        Endpoint::new(name, "A", Targets::new(["plain"]))
    }

    fn identified(name: &str, id: &str) -> Endpoint {
        Endpoint::new(name, "A", Targets::new(["identified"])).with_set_identifier(id)
    }

    #[test]
    fn test_same_owner_is_candidate_authoritative() {
        let unowned = plain("foo");
        let abc = plain("foo").with_owner("abc");
        let xyz = plain("foo").with_owner("xyz");

        assert!(same_owner(&unowned, &abc));
        assert!(same_owner(&unowned, &unowned));
        assert!(same_owner(&abc, &abc));
        assert!(!same_owner(&abc, &xyz));
        assert!(!same_owner(&abc, &unowned));
    }

    #[test]
    fn test_index_keeps_last_duplicate() {
        let current = vec![
            identified("foo", "a").with_owner("first"),
            identified("foo", "b").with_owner("second"),
            plain("bar"),
        ];
        let known = KnownRecords::index(&current);
        assert_eq!(known.identified.len(), 1);
        assert_eq!(known.identified["foo"].owner(), Some("second"));
        assert_eq!(known.plain.len(), 1);
    }

    #[test]
    fn test_forget_only_touches_same_shape() {
        let current = vec![plain("foo"), identified("bar", "id")];
        let mut known = KnownRecords::index(&current);

        // identified delete for a name only known as plain
        known.forget(&identified("foo", "id"));
        assert!(known.plain.contains_key("foo"));

        known.forget(&plain("foo"));
        assert!(!known.plain.contains_key("foo"));
        assert!(known.identified.contains_key("bar"));
    }

    #[test]
    fn test_counter_counts_each_skip() {
        let counter = Arc::new(AtomicCounter::new());
        let policy = NoMixedIdentifierPolicy::new(counter.clone());

        let changes = Changes::new()
            .with_create(vec![identified("foo", "a"), identified("foo", "b"), plain("bar")])
            .with_current(vec![plain("foo"), identified("bar", "x")]);

        let filtered = policy.apply(changes);
        assert!(filtered.create.is_empty());
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn test_same_shape_create_is_not_a_conflict() {
        let counter = Arc::new(AtomicCounter::new());
        let policy = NoMixedIdentifierPolicy::new(counter.clone());

        let changes = Changes::new()
            .with_create(vec![identified("foo", "b")])
            .with_current(vec![identified("foo", "a")]);

        let filtered = policy.apply(changes);
        assert_eq!(filtered.create.len(), 1);
        assert_eq!(counter.get(), 0);
    }
}
