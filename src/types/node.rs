//! A participant in the traffic graph.

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

use super::graph_type::{GraphType, NodeType, UNKNOWN};
use super::metadata::{self, Metadata, MetadataValue};
use super::{Edge, NodeIdentity};

/// A participant in the traffic graph. Owns its outgoing edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
  pub id: String,
  pub node_type: NodeType,
  #[serde(default)]
  pub cluster: String,
  #[serde(default)]
  pub namespace: String,
  #[serde(default)]
  pub workload: String,
  #[serde(default)]
  pub app: String,
  #[serde(default)]
  pub version: String,
  #[serde(default)]
  pub service: String,
  #[serde(default)]
  pub edges: Vec<Edge>,
  #[serde(default)]
  pub metadata: Metadata,
}

impl Node {
  /// Builds a node from its identity, deriving id and type for `graph_type`.
  pub fn new(identity: &NodeIdentity, graph_type: GraphType) -> Result<Self, GraphError> {
    let (id, node_type) = identity.resolve(graph_type)?;
    Ok(Self::explicit(id, node_type, identity, graph_type))
  }

  /// Builds a node with a known id and type, trimming identity fields the type does not carry.
  pub fn explicit(
    id: impl Into<String>,
    node_type: NodeType,
    identity: &NodeIdentity,
    graph_type: GraphType,
  ) -> Self {
    let mut workload = identity.workload.clone();
    let mut app = identity.app.clone();
    let mut version = identity.version.clone();
    let mut service = identity.service.clone();

    match node_type {
      NodeType::Workload => {
        // app and version labels are kept when known, they help grouping
        if app == UNKNOWN {
          app.clear();
        }
        if version == UNKNOWN {
          version.clear();
        }
        service.clear();
      }
      NodeType::App | NodeType::VersionedApp => {
        // a versioned app is backed by a single workload, keep its name
        if node_type == NodeType::App || graph_type != GraphType::VersionedApp {
          workload.clear();
          version.clear();
        }
        service.clear();
      }
      NodeType::Service => {
        app.clear();
        workload.clear();
        version.clear();
      }
      NodeType::Aggregate | NodeType::Unknown => {}
    }

    Self {
      id: id.into(),
      node_type,
      cluster: identity.cluster.clone(),
      namespace: identity.namespace().to_string(),
      workload,
      app,
      version,
      service,
      edges: Vec::new(),
      metadata: Metadata::new(),
    }
  }

  /// Appends an edge to `dest_id` and returns it. Callers that hold the traffic map should
  /// prefer [super::TrafficMap::add_edge], which checks the destination exists.
  pub fn add_edge(&mut self, dest_id: impl Into<String>) -> &mut Edge {
    self.edges.push(Edge::new(dest_id));
    let last = self.edges.len() - 1;
    &mut self.edges[last]
  }

  pub fn edge_to(&self, dest_id: &str) -> Option<&Edge> {
    self.edges.iter().find(|e| e.dest == dest_id)
  }

  pub fn edge_to_mut(&mut self, dest_id: &str) -> Option<&mut Edge> {
    self.edges.iter_mut().find(|e| e.dest == dest_id)
  }

  pub fn set_metadata(&mut self, key: &str, value: impl Into<MetadataValue>) {
    self.metadata.insert(key.to_string(), value.into());
  }

  pub fn rate(&self, key: &str) -> Option<f64> {
    metadata::number(&self.metadata, key)
  }

  pub fn is_flagged(&self, key: &str) -> bool {
    metadata::is_flagged(&self.metadata, key)
  }
}
