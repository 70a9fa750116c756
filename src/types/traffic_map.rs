//! The whole graph for one request: node id → node.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::GraphError;

use super::{Edge, Node};

/// The whole graph for one request, keyed by node id.
///
/// Sole owner of all nodes. Edges refer to their destination by id; every edge destination must
/// be present in the map. Iteration is in ascending id order so output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Node>", try_from = "Vec<Node>")]
pub struct TrafficMap {
  nodes: BTreeMap<String, Node>,
}

impl TrafficMap {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn contains(&self, id: &str) -> bool {
    self.nodes.contains_key(id)
  }

  pub fn get(&self, id: &str) -> Option<&Node> {
    self.nodes.get(id)
  }

  pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
    self.nodes.get_mut(id)
  }

  /// Inserts `node`, returning the existing node with the same id unchanged if there is one.
  pub fn add_node(&mut self, node: Node) -> &mut Node {
    match self.nodes.entry(node.id.clone()) {
      Entry::Occupied(e) => e.into_mut(),
      Entry::Vacant(e) => e.insert(node),
    }
  }

  /// Adds an edge `source_id -> dest_id`. Both nodes must already be in the map.
  pub fn add_edge(&mut self, source_id: &str, dest_id: &str) -> Result<&mut Edge, GraphError> {
    if !self.nodes.contains_key(dest_id) {
      return Err(GraphError::DanglingEdge {
        source_id: source_id.to_string(),
        dest_id: dest_id.to_string(),
      });
    }
    let source = self
      .nodes
      .get_mut(source_id)
      .ok_or_else(|| GraphError::Identity(format!("source node not found: {source_id}")))?;
    Ok(source.add_edge(dest_id))
  }

  /// Removes a node without touching edges that point at it; callers must follow up with
  /// [TrafficMap::prune_dangling_edges] before handing the map on.
  pub fn remove(&mut self, id: &str) -> Option<Node> {
    self.nodes.remove(id)
  }

  pub fn ids(&self) -> impl Iterator<Item = &String> {
    self.nodes.keys()
  }

  pub fn nodes(&self) -> impl Iterator<Item = &Node> {
    self.nodes.values()
  }

  pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
    self.nodes.values_mut()
  }

  pub fn edge_count(&self) -> usize {
    self.nodes.values().map(|n| n.edges.len()).sum()
  }

  /// Mutable access to the edge `source_id -> dest_id` if both the source and the edge exist.
  pub fn edge_mut(&mut self, source_id: &str, dest_id: &str) -> Option<&mut Edge> {
    self.nodes.get_mut(source_id)?.edge_to_mut(dest_id)
  }

  /// Drops every edge whose destination is no longer in the map. Returns the number dropped.
  pub fn prune_dangling_edges(&mut self) -> usize {
    let Self { nodes } = self;
    let live: BTreeSet<String> = nodes.keys().cloned().collect();
    let mut dropped = 0;
    for node in nodes.values_mut() {
      let before = node.edges.len();
      node.edges.retain(|e| live.contains(&e.dest));
      dropped += before - node.edges.len();
    }
    dropped
  }

  /// Returns the first edge whose destination is missing, if any.
  pub fn find_dangling_edge(&self) -> Option<(&str, &str)> {
    self.nodes.values().find_map(|n| {
      n.edges
        .iter()
        .find(|e| !self.nodes.contains_key(&e.dest))
        .map(|e| (n.id.as_str(), e.dest.as_str()))
    })
  }

  /// Checks the edge-consistency invariant.
  pub fn check_consistency(&self) -> Result<(), GraphError> {
    match self.find_dangling_edge() {
      Some((source, dest)) => Err(GraphError::DanglingEdge {
        source_id: source.to_string(),
        dest_id: dest.to_string(),
      }),
      None => Ok(()),
    }
  }
}

impl From<TrafficMap> for Vec<Node> {
  fn from(map: TrafficMap) -> Self {
    map.nodes.into_values().collect()
  }
}

impl TryFrom<Vec<Node>> for TrafficMap {
  type Error = GraphError;

  fn try_from(nodes: Vec<Node>) -> Result<Self, Self::Error> {
    let mut map = TrafficMap::new();
    for node in nodes {
      if map.contains(&node.id) {
        return Err(GraphError::DuplicateNode(node.id));
      }
      map.nodes.insert(node.id.clone(), node);
    }
    map.check_consistency()?;
    Ok(map)
  }
}

impl<'a> IntoIterator for &'a TrafficMap {
  type Item = &'a Node;
  type IntoIter = std::collections::btree_map::Values<'a, String, Node>;

  fn into_iter(self) -> Self::IntoIter {
    self.nodes.values()
  }
}
