//! Dead-node pruning: removes nodes with no traffic and no backing workload.
//!
//! Removal can strand other nodes (a service whose only outgoing edge went to a removed
//! workload), so passes repeat until one removes nothing. Each removal shrinks the map, so the
//! number of passes is bounded by its initial size.

use async_trait::async_trait;
use tracing::{debug, instrument, trace};

use crate::config::GraphConfig;
use crate::context::{GlobalInfo, NamespaceInfo};
use crate::error::GraphError;
use crate::types::metadata::{IS_DEAD, IS_EGRESS_CLUSTER, IS_SERVICE_ENTRY};
use crate::types::{Node, NodeType, Protocol, TrafficMap, find_workload, is_ok};

use super::{Appender, DEAD_NODE};

/// What a pass decides for one node before consulting the workload inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Verdict {
  Keep,
  Remove,
  /// Decided by the workload named here, looked up in its namespace.
  Lookup { namespace: String, workload: String },
}

/// True if any inbound or outbound rate of `protocols` is positive on `node`.
pub(crate) fn has_traffic(node: &Node, protocols: &[Protocol]) -> bool {
  protocols
    .iter()
    .flat_map(|p| p.traffic_rates())
    .any(|rate| node.rate(rate.name).is_some_and(|v| v > 0.0))
}

/// Classifies `node` for one pruning pass.
#[instrument(level = "trace", skip(node, protocols), fields(node = %node.id))]
pub(crate) fn classify(node: &Node, protocols: &[Protocol]) -> Verdict {
  if has_traffic(node, protocols) {
    return Verdict::Keep;
  }
  match node.node_type {
    NodeType::Aggregate => Verdict::Keep,
    NodeType::Service => {
      if node.edges.is_empty()
        && !node.is_flagged(IS_SERVICE_ENTRY)
        && !node.is_flagged(IS_EGRESS_CLUSTER)
      {
        Verdict::Remove
      } else {
        Verdict::Keep
      }
    }
    NodeType::App | NodeType::VersionedApp | NodeType::Workload | NodeType::Unknown => {
      if node.node_type != NodeType::Unknown && !is_ok(&node.workload) {
        return Verdict::Keep;
      }
      // no namespace to look in: the workload cannot be found
      if !is_ok(&node.namespace) {
        return Verdict::Remove;
      }
      Verdict::Lookup {
        namespace: node.namespace.clone(),
        workload: node.workload.clone(),
      }
    }
  }
}

/// Removes dead nodes and flags zero-pod workloads with `isDead`.
#[derive(Debug, Clone)]
pub struct DeadNodeAppender {
  protocols: Vec<Protocol>,
}

impl DeadNodeAppender {
  pub fn new(config: &GraphConfig) -> Self {
    Self {
      protocols: config.protocols.clone(),
    }
  }

  /// Runs one pass. Returns the number of nodes removed; edges to them are left for the caller
  /// to prune.
  async fn prune_pass(
    &self,
    traffic_map: &mut TrafficMap,
    global: &mut GlobalInfo,
    namespace: &mut NamespaceInfo,
  ) -> Result<usize, GraphError> {
    let verdicts: Vec<(String, Verdict)> = traffic_map
      .nodes()
      .map(|n| (n.id.clone(), classify(n, &self.protocols)))
      .collect();

    let mut removed = 0;
    for (id, verdict) in verdicts {
      let remove = match verdict {
        Verdict::Keep => false,
        Verdict::Remove => true,
        Verdict::Lookup {
          namespace: workload_namespace,
          workload,
        } => {
          let list = namespace.workload_list_for(global, &workload_namespace).await?;
          match find_workload(&list, &workload) {
            None => true,
            Some(found) => {
              if found.pod_count == 0 {
                if let Some(node) = traffic_map.get_mut(&id) {
                  node.set_metadata(IS_DEAD, true);
                }
              }
              false
            }
          }
        }
      };
      if remove {
        trace!(node = %id, "removing dead node");
        traffic_map.remove(&id);
        removed += 1;
      }
    }
    Ok(removed)
  }
}

#[async_trait]
impl Appender for DeadNodeAppender {
  fn name(&self) -> &'static str {
    DEAD_NODE
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
    namespace.workload_list(global).await?;

    let mut pass = 0;
    loop {
      pass += 1;
      let removed = self.prune_pass(traffic_map, global, namespace).await?;
      let dropped_edges = if removed > 0 {
        traffic_map.prune_dangling_edges()
      } else {
        0
      };
      debug!(
        namespace = %namespace.name,
        pass,
        removed,
        dropped_edges,
        remaining = traffic_map.len(),
        "dead node pass"
      );
      if removed == 0 {
        return Ok(());
      }
    }
  }
}
