//! Workload summary as returned by the cluster workload lookup.

use serde::{Deserialize, Serialize};

/// One workload in a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadListItem {
  pub name: String,
  pub pod_count: u32,
  /// Whether the workload's pods run a mesh sidecar.
  #[serde(default = "default_sidecar")]
  pub istio_sidecar: bool,
  #[serde(default)]
  pub app: Option<String>,
  #[serde(default)]
  pub version: Option<String>,
}

fn default_sidecar() -> bool {
  true
}

impl WorkloadListItem {
  pub fn new(name: impl Into<String>, pod_count: u32) -> Self {
    Self {
      name: name.into(),
      pod_count,
      istio_sidecar: true,
      app: None,
      version: None,
    }
  }

  pub fn with_app(mut self, app: impl Into<String>, version: impl Into<String>) -> Self {
    self.app = Some(app.into());
    self.version = Some(version.into());
    self
  }

  pub fn without_sidecar(mut self) -> Self {
    self.istio_sidecar = false;
    self
  }
}

/// Finds a workload by name.
pub fn find_workload<'a>(list: &'a [WorkloadListItem], name: &str) -> Option<&'a WorkloadListItem> {
  list.iter().find(|w| w.name == name)
}
