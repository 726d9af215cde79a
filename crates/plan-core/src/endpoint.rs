// # Endpoint
//
// A single DNS record as seen by the planner: a name, an optional set
// identifier, its targets and the labels carrying ownership metadata.
//
// ## Identity
//
// `dns_name` alone is not unique. Records sharing a name are told apart by
// `set_identifier`, which is empty for a plain record and non-empty for one
// member of a weighted/geo record set.
//
// ## Ownership
//
// The controller that manages a record tags it with the `owner` label.
// A missing label and an empty label are different states: the first means
// "nobody claimed this record", the second is a claim by an empty owner id.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Label key holding the id of the controller that owns a record
pub const OWNER_LABEL_KEY: &str = "owner";

/// Label map attached to an endpoint
pub type Labels = BTreeMap<String, String>;

/// Ordered list of record targets (addresses, hostnames, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Targets(pub Vec<String>);

impl Targets {
    /// Build targets from anything that yields strings
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(targets.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl fmt::Display for Targets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(";"))
    }
}

/// A DNS record with identity and ownership metadata
///
/// Policies never modify endpoints; they only decide whether an endpoint
/// stays in a change set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Record name, e.g. "www.example.com"
    #[serde(default, deserialize_with = "null_as_default")]
    pub dns_name: String,

    /// Record targets, opaque to every policy
    #[serde(default, deserialize_with = "null_as_default")]
    pub targets: Targets,

    /// Record type ("A", "CNAME", ...), may be empty
    #[serde(default, deserialize_with = "null_as_default")]
    pub record_type: String,

    /// Set identifier; empty for a plain (unweighted) record
    #[serde(default, deserialize_with = "null_as_default")]
    pub set_identifier: String,

    /// Time-to-live in seconds, 0 when unset
    #[serde(default, rename = "recordTTL", deserialize_with = "null_as_default")]
    pub record_ttl: u64,

    /// Metadata labels, including the owner label
    #[serde(default, deserialize_with = "labels_with_null_values")]
    pub labels: Labels,
}

impl Endpoint {
    /// Create an endpoint without identifier or labels
    pub fn new(
        dns_name: impl Into<String>,
        record_type: impl Into<String>,
        targets: Targets,
    ) -> Self {
        Self {
            dns_name: dns_name.into(),
            targets,
            record_type: record_type.into(),
            ..Self::default()
        }
    }

    /// Set the set identifier
    pub fn with_set_identifier(mut self, set_identifier: impl Into<String>) -> Self {
        self.set_identifier = set_identifier.into();
        self
    }

    /// Set the time-to-live
    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.record_ttl = ttl;
        self
    }

    /// Add or replace a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Tag the endpoint with an owner id
    pub fn with_owner(self, owner_id: impl Into<String>) -> Self {
        self.with_label(OWNER_LABEL_KEY, owner_id)
    }

    /// The owner label value, `None` if the label is absent
    pub fn owner(&self) -> Option<&str> {
        self.labels.get(OWNER_LABEL_KEY).map(String::as_str)
    }

    /// Whether this endpoint is one member of an identified record set
    pub fn is_identified(&self) -> bool {
        !self.set_identifier.is_empty()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} IN {} {} {}",
            self.dns_name, self.record_ttl, self.record_type, self.set_identifier, self.targets
        )
    }
}

/// Deserialize `null` as the type's default value
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize labels, reading a `null` map as empty and `null` values as ""
fn labels_with_null_values<'de, D>(deserializer: D) -> Result<Labels, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<String>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}
