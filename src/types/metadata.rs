//! Node and edge metadata: an ordered string-keyed map of loosely typed values.
//!
//! Keys used by the appenders are defined here so that producers and consumers agree on
//! spelling.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Node with a workload found in the cluster but with no running pods.
pub const IS_DEAD: &str = "isDead";

/// Service node defined by a mesh service entry (externally defined).
pub const IS_SERVICE_ENTRY: &str = "isServiceEntry";

/// Service node representing an egress cluster.
pub const IS_EGRESS_CLUSTER: &str = "isEgressCluster";

/// Node whose backing workload(s) run without a mesh sidecar.
pub const HAS_MISSING_SC: &str = "hasMissingSC";

/// Edge byte rate, scaled and rounded.
pub const THROUGHPUT: &str = "throughput";

/// Edge response time quantile in milliseconds.
pub const RESPONSE_TIME: &str = "responseTime";

/// Edge percentage of requests sent with mutual TLS.
pub const IS_MTLS: &str = "isMTLS";

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
  Bool(bool),
  Number(f64),
  Text(String),
}

impl MetadataValue {
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      MetadataValue::Number(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      MetadataValue::Bool(b) => Some(*b),
      _ => None,
    }
  }
}

impl From<bool> for MetadataValue {
  fn from(b: bool) -> Self {
    MetadataValue::Bool(b)
  }
}

impl From<f64> for MetadataValue {
  fn from(n: f64) -> Self {
    MetadataValue::Number(n)
  }
}

impl From<&str> for MetadataValue {
  fn from(s: &str) -> Self {
    MetadataValue::Text(s.to_string())
  }
}

impl From<String> for MetadataValue {
  fn from(s: String) -> Self {
    MetadataValue::Text(s)
  }
}

/// Ordered metadata map; ordering keeps serialized output stable.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Returns the numeric value under `key`, if present and numeric.
pub fn number(metadata: &Metadata, key: &str) -> Option<f64> {
  metadata.get(key).and_then(MetadataValue::as_f64)
}

/// A flag is set when its key is present, unless it is explicitly `false`.
pub fn is_flagged(metadata: &Metadata, key: &str) -> bool {
  metadata
    .get(key)
    .is_some_and(|v| v.as_bool() != Some(false))
}
