//! Error types for graph generation.

use std::time::Duration;

/// Errors that abort a graph-generation request.
///
/// Every variant is fatal to the request: the pipeline stops at the first error and no partial
/// graph is returned.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
  #[error("workload lookup failed for namespace '{namespace}': {message}")]
  WorkloadLookup { namespace: String, message: String },

  #[error("telemetry query failed for namespace '{namespace}': {message}")]
  Telemetry { namespace: String, message: String },

  #[error("{operation} timed out after {}s", .timeout.as_secs())]
  Timeout {
    operation: String,
    timeout: Duration,
  },

  #[error("cannot derive node id: {0}")]
  Identity(String),

  #[error("edge {source_id} -> {dest_id} references a node that is not in the traffic map")]
  DanglingEdge { source_id: String, dest_id: String },

  #[error("duplicate node id: {0}")]
  DuplicateNode(String),

  #[error("unknown appender: {0}")]
  UnknownAppender(String),

  #[error("invalid configuration: {0}")]
  Config(String),

  #[error("appender '{appender}' failed: {source}")]
  Appender {
    appender: &'static str,
    #[source]
    source: Box<GraphError>,
  },

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

impl GraphError {
  /// Wraps an error with the name of the appender that raised it.
  pub fn in_appender(self, appender: &'static str) -> Self {
    match self {
      already @ GraphError::Appender { .. } => already,
      other => GraphError::Appender {
        appender,
        source: Box::new(other),
      },
    }
  }

  /// Returns the innermost error, unwrapping appender context.
  pub fn root(&self) -> &GraphError {
    match self {
      GraphError::Appender { source, .. } => source.root(),
      other => other,
    }
  }
}
