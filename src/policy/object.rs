//! Generic mesh configuration objects and the client that stores them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::error::ClientError;

/// API group/version of policy objects.
pub const POLICY_API_VERSION: &str = "config.istio.io/v1alpha2";

/// Kinds of policy objects the handler service touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
  Adapter,
  Handler,
  Instance,
  Rule,
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ResourceKind::Adapter => write!(f, "adapter"),
      ResourceKind::Handler => write!(f, "handler"),
      ResourceKind::Instance => write!(f, "instance"),
      ResourceKind::Rule => write!(f, "rule"),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
  pub name: String,
  pub namespace: String,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub labels: BTreeMap<String, String>,
}

/// A configuration object: type header, metadata and a free-form spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigObject {
  pub api_version: String,
  pub kind: ResourceKind,
  pub metadata: ObjectMeta,
  #[serde(default)]
  pub spec: serde_json::Value,
}

impl ConfigObject {
  pub fn name(&self) -> &str {
    &self.metadata.name
  }
}

/// What the caller may do with a kind of object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePermissions {
  pub create: bool,
  pub update: bool,
  pub delete: bool,
}

/// CRUD over configuration objects in a namespace.
#[async_trait]
pub trait ConfigObjectClient: Send + Sync {
  async fn get(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<ConfigObject, ClientError>;

  /// Objects of `kind` carrying the label key `label`.
  async fn list(&self, kind: ResourceKind, namespace: &str, label: &str) -> Result<Vec<ConfigObject>, ClientError>;

  async fn create(&self, namespace: &str, object: &ConfigObject) -> Result<ConfigObject, ClientError>;

  async fn update(&self, namespace: &str, name: &str, object: &ConfigObject) -> Result<ConfigObject, ClientError>;

  async fn delete(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<(), ClientError>;

  async fn permissions(&self, kind: ResourceKind, namespace: &str) -> Result<ResourcePermissions, ClientError>;
}
