//! Graph generation configuration.
//!
//! A [GraphConfig] is built once per process (file, then CLI/env overrides) and handed to the
//! pipeline and each appender at construction; nothing in the core reads configuration
//! ambiently.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

use crate::error::GraphError;
use crate::types::{GraphType, Protocol};

/// Which side of the exchange the throughput appender measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThroughputKind {
  #[default]
  Request,
  Response,
}

impl ThroughputKind {
  pub fn metric(&self) -> &'static str {
    match self {
      ThroughputKind::Request => "istio_request_bytes_sum",
      ThroughputKind::Response => "istio_response_bytes_sum",
    }
  }
}

/// Throughput appender settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThroughputConfig {
  pub kind: ThroughputKind,
  /// Multiplier applied to the summed byte rate before rounding.
  pub scale: f64,
  /// Decimal places kept after scaling.
  pub decimals: u32,
  /// Raw rates at or below this value are treated as no data.
  pub threshold: f64,
}

impl Default for ThroughputConfig {
  fn default() -> Self {
    Self {
      kind: ThroughputKind::Request,
      scale: 0.001,
      decimals: 2,
      threshold: 0.001,
    }
  }
}

/// Response time appender settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseTimeConfig {
  pub quantile: f64,
  pub decimals: u32,
}

impl Default for ResponseTimeConfig {
  fn default() -> Self {
    Self {
      quantile: 0.95,
      decimals: 2,
    }
  }
}

/// Settings for the policy handler service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
  /// Namespace holding mesh configuration objects.
  pub config_namespace: String,
  pub adapter_name: String,
  pub adapter_service: String,
  pub adapter_port: String,
  /// Workload label carrying the app name.
  pub app_label: String,
  /// Workload label carrying the version.
  pub version_label: String,
}

impl Default for PolicyConfig {
  fn default() -> Self {
    Self {
      config_namespace: "istio-system".to_string(),
      adapter_name: "threescale".to_string(),
      adapter_service: "threescale-istio-adapter".to_string(),
      adapter_port: "3333".to_string(),
      app_label: "app".to_string(),
      version_label: "version".to_string(),
    }
  }
}

/// Configuration for one graph-generation deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
  pub graph_type: GraphType,
  /// Interpose service nodes between workload-to-workload edges.
  pub inject_service_nodes: bool,
  /// Appenders to run, by name. `None` runs all of them.
  pub appenders: Option<Vec<String>>,
  /// Protocols whose node rates count as traffic.
  pub protocols: Vec<Protocol>,
  /// Telemetry time window.
  pub duration_secs: u64,
  /// Deadline for each upstream call.
  pub query_timeout_secs: u64,
  pub prometheus_url: String,
  pub throughput: ThroughputConfig,
  pub response_time: ResponseTimeConfig,
  pub policy: PolicyConfig,
}

impl Default for GraphConfig {
  fn default() -> Self {
    Self {
      graph_type: GraphType::VersionedApp,
      inject_service_nodes: true,
      appenders: None,
      protocols: Protocol::ALL.to_vec(),
      duration_secs: 600,
      query_timeout_secs: 30,
      prometheus_url: "http://prometheus.istio-system:9090".to_string(),
      throughput: ThroughputConfig::default(),
      response_time: ResponseTimeConfig::default(),
      policy: PolicyConfig::default(),
    }
  }
}

impl GraphConfig {
  pub fn duration(&self) -> Duration {
    Duration::from_secs(self.duration_secs)
  }

  pub fn query_timeout(&self) -> Duration {
    Duration::from_secs(self.query_timeout_secs)
  }

  /// Rejects values no request could run with.
  pub fn validate(&self) -> Result<(), GraphError> {
    if self.duration_secs == 0 {
      return Err(GraphError::Config("duration_secs must be positive".to_string()));
    }
    if self.query_timeout_secs == 0 {
      return Err(GraphError::Config(
        "query_timeout_secs must be positive".to_string(),
      ));
    }
    if !(self.throughput.scale.is_finite() && self.throughput.scale > 0.0) {
      return Err(GraphError::Config(format!(
        "throughput.scale must be positive, got {}",
        self.throughput.scale
      )));
    }
    if self.throughput.threshold.is_nan() || self.throughput.threshold < 0.0 {
      return Err(GraphError::Config(
        "throughput.threshold must not be negative".to_string(),
      ));
    }
    if self.throughput.decimals > 9 || self.response_time.decimals > 9 {
      return Err(GraphError::Config("decimals must be at most 9".to_string()));
    }
    let q = self.response_time.quantile;
    if !(q > 0.0 && q < 1.0) {
      return Err(GraphError::Config(format!(
        "response_time.quantile must be in (0, 1), got {q}"
      )));
    }
    Ok(())
  }
}

/// Loads a configuration from a JSON file; missing fields take their defaults.
#[instrument(level = "trace", skip(path))]
pub fn load_config(path: &Path) -> Result<GraphConfig, GraphError> {
  let bytes = std::fs::read(path)?;
  let config: GraphConfig = serde_json::from_slice(&bytes)?;
  config.validate()?;
  Ok(config)
}

/// Rounds `value` to `decimals` decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
  let factor = 10f64.powi(decimals as i32);
  (value * factor).round() / factor
}
