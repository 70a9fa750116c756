//! Labeled telemetry samples and the source/destination identity they carry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::NodeIdentity;
use super::graph_type::UNKNOWN;

pub const SOURCE_CLUSTER: &str = "source_cluster";
pub const SOURCE_WORKLOAD_NAMESPACE: &str = "source_workload_namespace";
pub const SOURCE_WORKLOAD: &str = "source_workload";
pub const SOURCE_CANONICAL_SERVICE: &str = "source_canonical_service";
pub const SOURCE_CANONICAL_REVISION: &str = "source_canonical_revision";
pub const DESTINATION_CLUSTER: &str = "destination_cluster";
pub const DESTINATION_SERVICE_NAMESPACE: &str = "destination_service_namespace";
pub const DESTINATION_SERVICE: &str = "destination_service";
pub const DESTINATION_SERVICE_NAME: &str = "destination_service_name";
pub const DESTINATION_WORKLOAD_NAMESPACE: &str = "destination_workload_namespace";
pub const DESTINATION_WORKLOAD: &str = "destination_workload";
pub const DESTINATION_CANONICAL_SERVICE: &str = "destination_canonical_service";
pub const DESTINATION_CANONICAL_REVISION: &str = "destination_canonical_revision";
pub const CONNECTION_SECURITY_POLICY: &str = "connection_security_policy";

/// Labels every edge-level query groups by.
pub const EDGE_GROUP_BY: &[&str] = &[
  SOURCE_CLUSTER,
  SOURCE_WORKLOAD_NAMESPACE,
  SOURCE_WORKLOAD,
  SOURCE_CANONICAL_SERVICE,
  SOURCE_CANONICAL_REVISION,
  DESTINATION_CLUSTER,
  DESTINATION_SERVICE_NAMESPACE,
  DESTINATION_SERVICE,
  DESTINATION_SERVICE_NAME,
  DESTINATION_WORKLOAD_NAMESPACE,
  DESTINATION_WORKLOAD,
  DESTINATION_CANONICAL_SERVICE,
  DESTINATION_CANONICAL_REVISION,
];

/// One sample of a telemetry vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
  pub labels: BTreeMap<String, String>,
  pub value: f64,
}

impl TelemetrySample {
  pub fn new<K, V>(labels: impl IntoIterator<Item = (K, V)>, value: f64) -> Self
  where
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      labels: labels
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect(),
      value,
    }
  }

  pub fn label(&self, name: &str) -> Option<&str> {
    self.labels.get(name).map(String::as_str)
  }
}

/// Source and destination identity of a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficLabels {
  pub source: NodeIdentity,
  pub destination: NodeIdentity,
}

impl TrafficLabels {
  /// Extracts both endpoints from a sample. Returns the first missing label name if the sample
  /// does not carry the full identity tuple. Cluster labels are optional and default to
  /// `unknown`.
  pub fn from_sample(sample: &TelemetrySample) -> Result<Self, &'static str> {
    let required = |name: &'static str| sample.label(name).map(str::to_string).ok_or(name);
    let cluster = |name: &'static str| sample.label(name).unwrap_or(UNKNOWN).to_string();

    let source_namespace = required(SOURCE_WORKLOAD_NAMESPACE)?;
    let source = NodeIdentity {
      cluster: cluster(SOURCE_CLUSTER),
      service_namespace: source_namespace.clone(),
      service: String::new(),
      workload_namespace: source_namespace,
      workload: required(SOURCE_WORKLOAD)?,
      app: required(SOURCE_CANONICAL_SERVICE)?,
      version: required(SOURCE_CANONICAL_REVISION)?,
    };
    let destination = NodeIdentity {
      cluster: cluster(DESTINATION_CLUSTER),
      service_namespace: required(DESTINATION_SERVICE_NAMESPACE)?,
      service: required(DESTINATION_SERVICE_NAME)?,
      workload_namespace: required(DESTINATION_WORKLOAD_NAMESPACE)?,
      workload: required(DESTINATION_WORKLOAD)?,
      app: required(DESTINATION_CANONICAL_SERVICE)?,
      version: required(DESTINATION_CANONICAL_REVISION)?,
    };
    Ok(Self {
      source,
      destination,
    })
  }
}
