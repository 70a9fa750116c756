//! Shared fixtures for appender tests.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::config::GraphConfig;
use crate::context::{GlobalInfo, NamespaceInfo};
use crate::snapshot::{RecordedTelemetry, StaticWorkloadLookup};
use crate::types::telemetry_sample::*;
use crate::types::{GraphType, Node, NodeIdentity, TelemetrySample};

pub(crate) const NS: &str = "bookinfo";
pub(crate) const CLUSTER: &str = "east";

/// A destination-reported sample from workload `source` in `source_ns` to workload `dest`
/// behind service `dest_service` in `dest_ns`.
pub(crate) fn cross_sample(
  source_ns: &str,
  source: &str,
  dest_ns: &str,
  dest_service: &str,
  dest: &str,
  value: f64,
) -> TelemetrySample {
  TelemetrySample::new(
    [
      (SOURCE_CLUSTER, CLUSTER),
      (SOURCE_WORKLOAD_NAMESPACE, source_ns),
      (SOURCE_WORKLOAD, source),
      (SOURCE_CANONICAL_SERVICE, source),
      (SOURCE_CANONICAL_REVISION, "v1"),
      (DESTINATION_CLUSTER, CLUSTER),
      (DESTINATION_SERVICE_NAMESPACE, dest_ns),
      (DESTINATION_SERVICE, dest_service),
      (DESTINATION_SERVICE_NAME, dest_service),
      (DESTINATION_WORKLOAD_NAMESPACE, dest_ns),
      (DESTINATION_WORKLOAD, dest),
      (DESTINATION_CANONICAL_SERVICE, dest),
      (DESTINATION_CANONICAL_REVISION, "v1"),
    ],
    value,
  )
}

/// Sample between two workloads of [NS].
pub(crate) fn sample(source: &str, dest_service: &str, dest: &str, value: f64) -> TelemetrySample {
  cross_sample(NS, source, NS, dest_service, dest, value)
}

pub(crate) fn workload_node(namespace: &str, name: &str) -> Node {
  Node::new(
    &NodeIdentity::workload(CLUSTER, namespace, name, name, "v1"),
    GraphType::Workload,
  )
  .unwrap()
}

pub(crate) fn service_node(namespace: &str, name: &str) -> Node {
  Node::new(&NodeIdentity::service(CLUSTER, namespace, name), GraphType::Workload).unwrap()
}

pub(crate) fn wl(namespace: &str, name: &str) -> String {
  format!("wl_{CLUSTER}_{namespace}_{name}")
}

pub(crate) fn svc(namespace: &str, name: &str) -> String {
  format!("svc_{CLUSTER}_{namespace}_{name}")
}

/// Workload-graph configuration, with or without service node injection.
pub(crate) fn workload_config(inject_service_nodes: bool) -> GraphConfig {
  GraphConfig {
    graph_type: GraphType::Workload,
    inject_service_nodes,
    ..GraphConfig::default()
  }
}

pub(crate) fn context(
  lookup: Arc<StaticWorkloadLookup>,
  telemetry: Arc<RecordedTelemetry>,
  namespace: &str,
) -> (GlobalInfo, NamespaceInfo) {
  let global = GlobalInfo::new(lookup, telemetry, Utc::now(), Duration::from_secs(5));
  (global, NamespaceInfo::new(namespace, Duration::from_secs(600)))
}
