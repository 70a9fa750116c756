//! Sidecars check: flags nodes whose workloads run without a mesh sidecar.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::config::GraphConfig;
use crate::context::{GlobalInfo, NamespaceInfo};
use crate::error::GraphError;
use crate::types::metadata::HAS_MISSING_SC;
use crate::types::{Node, NodeType, TrafficMap, WorkloadListItem, find_workload, is_ok};

use super::{Appender, SIDECARS_CHECK};

/// True if a workload backing `node` is known to run without a sidecar.
///
/// Workload nodes (and versioned apps that carry their workload) are checked by name; app
/// nodes by the app and version labels of the namespace's workloads.
pub(crate) fn missing_sidecar(node: &Node, workloads: &[WorkloadListItem]) -> bool {
  match node.node_type {
    NodeType::Workload => by_name(node, workloads),
    NodeType::VersionedApp if is_ok(&node.workload) => by_name(node, workloads),
    NodeType::App | NodeType::VersionedApp => workloads
      .iter()
      .filter(|w| w.app.as_deref() == Some(node.app.as_str()))
      .filter(|w| node.version.is_empty() || w.version.as_deref() == Some(node.version.as_str()))
      .any(|w| !w.istio_sidecar),
    NodeType::Service | NodeType::Aggregate | NodeType::Unknown => false,
  }
}

fn by_name(node: &Node, workloads: &[WorkloadListItem]) -> bool {
  find_workload(workloads, &node.workload).is_some_and(|w| !w.istio_sidecar)
}

/// Sets `hasMissingSC` on nodes of the pipeline namespace backed by sidecar-less workloads.
#[derive(Debug, Clone, Default)]
pub struct SidecarsCheckAppender;

impl SidecarsCheckAppender {
  pub fn new(_config: &GraphConfig) -> Self {
    Self
  }
}

#[async_trait]
impl Appender for SidecarsCheckAppender {
  fn name(&self) -> &'static str {
    SIDECARS_CHECK
  }

  #[instrument(level = "trace", skip(self, traffic_map, global, namespace), fields(namespace = %namespace.name))]
  async fn append_graph(
    &self,
    traffic_map: &mut TrafficMap,
    global: &mut GlobalInfo,
    namespace: &mut NamespaceInfo,
  ) -> Result<(), GraphError> {
    if traffic_map.is_empty() {
      return Ok(());
    }
    let workloads = namespace.workload_list(global).await?;
    let mut flagged = 0;
    for node in traffic_map.nodes_mut() {
      if node.namespace == namespace.name && missing_sidecar(node, &workloads) {
        node.set_metadata(HAS_MISSING_SC, true);
        flagged += 1;
      }
    }
    debug!(namespace = %namespace.name, flagged, "sidecars check");
    Ok(())
  }
}
