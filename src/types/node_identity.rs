//! Deterministic node identity.
//!
//! The same rule is used when the graph is assembled from telemetry and when appenders map
//! telemetry samples back onto existing nodes, so both sides must go through [NodeIdentity].

use crate::error::GraphError;

use super::graph_type::{GraphType, NodeType, UNKNOWN, is_ok};

/// Identity tuple of a graph participant as reported by telemetry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeIdentity {
  pub cluster: String,
  pub service_namespace: String,
  pub service: String,
  pub workload_namespace: String,
  pub workload: String,
  pub app: String,
  pub version: String,
}

impl NodeIdentity {
  /// Identity of a service node.
  pub fn service(
    cluster: impl Into<String>,
    namespace: impl Into<String>,
    service: impl Into<String>,
  ) -> Self {
    Self {
      cluster: cluster.into(),
      service_namespace: namespace.into(),
      service: service.into(),
      ..Self::default()
    }
  }

  /// Identity of a workload-backed node (workload, app or versioned app depending on graph type).
  pub fn workload(
    cluster: impl Into<String>,
    namespace: impl Into<String>,
    workload: impl Into<String>,
    app: impl Into<String>,
    version: impl Into<String>,
  ) -> Self {
    Self {
      cluster: cluster.into(),
      workload_namespace: namespace.into(),
      workload: workload.into(),
      app: app.into(),
      version: version.into(),
      ..Self::default()
    }
  }

  /// The workload namespace when set, otherwise the service namespace.
  pub fn namespace(&self) -> &str {
    if is_ok(&self.workload_namespace) {
      &self.workload_namespace
    } else {
      &self.service_namespace
    }
  }

  /// Derives the node id and node type for this identity under `graph_type`.
  pub fn resolve(&self, graph_type: GraphType) -> Result<(String, NodeType), GraphError> {
    let cluster = if self.cluster.is_empty() {
      UNKNOWN
    } else {
      self.cluster.as_str()
    };
    let namespace = self.namespace();

    if namespace == UNKNOWN && self.workload == UNKNOWN && self.app == UNKNOWN && self.service.is_empty() {
      return Ok((format!("{cluster}_{UNKNOWN}"), NodeType::Unknown));
    }

    // A request to an unknown destination; one such service node per namespace.
    if self.workload == UNKNOWN && self.app == UNKNOWN && self.service == UNKNOWN {
      return Ok((format!("svc_{cluster}_{namespace}_{UNKNOWN}"), NodeType::Service));
    }

    let workload_ok = is_ok(&self.workload);
    let app_ok = is_ok(&self.app);
    let service_ok = is_ok(&self.service);

    if !workload_ok && !app_ok && !service_ok {
      return Err(self.identity_error(graph_type));
    }

    let service_node = match graph_type {
      GraphType::Service => service_ok && !workload_ok && !app_ok,
      _ => service_ok && !workload_ok,
    };
    if service_node {
      return Ok((format!("svc_{cluster}_{namespace}_{}", self.service), NodeType::Service));
    }

    match graph_type {
      GraphType::Workload | GraphType::Service => {
        if workload_ok {
          Ok((format!("wl_{cluster}_{namespace}_{}", self.workload), NodeType::Workload))
        } else if app_ok {
          Ok((format!("app_{cluster}_{namespace}_{}", self.app), NodeType::App))
        } else {
          Err(self.identity_error(graph_type))
        }
      }
      GraphType::App | GraphType::VersionedApp => {
        if app_ok {
          if graph_type == GraphType::VersionedApp && is_ok(&self.version) {
            Ok((
              format!("vapp_{cluster}_{namespace}_{}_{}", self.app, self.version),
              NodeType::VersionedApp,
            ))
          } else {
            Ok((format!("app_{cluster}_{namespace}_{}", self.app), NodeType::App))
          }
        } else if workload_ok {
          Ok((format!("wl_{cluster}_{namespace}_{}", self.workload), NodeType::Workload))
        } else {
          Err(self.identity_error(graph_type))
        }
      }
    }
  }

  fn identity_error(&self, graph_type: GraphType) -> GraphError {
    GraphError::Identity(format!(
      "namespace=[{}] workload=[{}] app=[{}] version=[{}] service=[{}] graphType=[{}]",
      self.namespace(),
      self.workload,
      self.app,
      self.version,
      self.service,
      graph_type
    ))
  }
}
