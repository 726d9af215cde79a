// # Owned Records Policy
//
// Restricts updates and deletes to records owned by this controller.
//
// Creates pass through: a controller may always create records it does not
// own yet. An update or delete survives only if its owner label is present
// and equal to the configured owner id; a record without the label is
// treated as "not mine".

use crate::endpoint::Endpoint;
use crate::plan::Changes;
use crate::policy::Policy;
use tracing::debug;

/// Policy that only lets this controller mutate the records it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedRecordsPolicy {
    /// Id of the controller instance applying the policy
    pub owner_id: String,
}

impl OwnedRecordsPolicy {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
        }
    }

    fn filter_owned(&self, endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        endpoints
            .into_iter()
            .filter(|ep| match ep.owner() {
                Some(owner) if owner == self.owner_id => true,
                found => {
                    debug!(
                        "Skipping endpoint {} because owner id does not match, found: {}, required: \"{}\"",
                        ep,
                        describe_owner(found),
                        self.owner_id
                    );
                    false
                }
            })
            .collect()
    }
}

/// Owner label as shown in traces: quoted value, or `<absent>`
fn describe_owner(owner: Option<&str>) -> String {
    match owner {
        Some(owner) => format!("\"{}\"", owner),
        None => "<absent>".to_string(),
    }
}

impl Policy for OwnedRecordsPolicy {
    fn apply(&self, changes: Changes) -> Changes {
        Changes {
            create: changes.create,
            update_old: self.filter_owned(changes.update_old),
            update_new: self.filter_owned(changes.update_new),
            delete: self.filter_owned(changes.delete),
            current: changes.current,
        }
    }

    fn name(&self) -> &'static str {
        "owned-records"
    }
}
