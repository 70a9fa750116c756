//! Graph type variants and node types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder value used by telemetry when an identity label is not known.
pub const UNKNOWN: &str = "unknown";

/// Returns true if an identity value is set and is not the `unknown` placeholder.
pub fn is_ok(value: &str) -> bool {
  !value.is_empty() && value != UNKNOWN
}

/// Granularity at which telemetry is folded into graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GraphType {
  App,
  #[default]
  VersionedApp,
  Workload,
  Service,
}

impl fmt::Display for GraphType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GraphType::App => write!(f, "app"),
      GraphType::VersionedApp => write!(f, "versionedApp"),
      GraphType::Workload => write!(f, "workload"),
      GraphType::Service => write!(f, "service"),
    }
  }
}

/// Kind of mesh participant a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
  App,
  VersionedApp,
  Workload,
  Service,
  Aggregate,
  Unknown,
}

impl fmt::Display for NodeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      NodeType::App => write!(f, "app"),
      NodeType::VersionedApp => write!(f, "versionedApp"),
      NodeType::Workload => write!(f, "workload"),
      NodeType::Service => write!(f, "service"),
      NodeType::Aggregate => write!(f, "aggregate"),
      NodeType::Unknown => write!(f, "unknown"),
    }
  }
}
