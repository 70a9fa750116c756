//! A directed edge from its owning node to `dest`.

use serde::{Deserialize, Serialize};

use super::metadata::{self, Metadata, MetadataValue};

/// A directed edge from its owning node to `dest`.
///
/// `dest` is the id of a node in the same traffic map, never an owning reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
  pub dest: String,
  #[serde(default)]
  pub metadata: Metadata,
}

impl Edge {
  pub fn new(dest: impl Into<String>) -> Self {
    Self {
      dest: dest.into(),
      metadata: Metadata::new(),
    }
  }

  pub fn set_metadata(&mut self, key: &str, value: impl Into<MetadataValue>) {
    self.metadata.insert(key.to_string(), value.into());
  }

  pub fn number(&self, key: &str) -> Option<f64> {
    metadata::number(&self.metadata, key)
  }
}
