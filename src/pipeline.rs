//! Pipeline executor: runs the configured appenders over the traffic map, one namespace at a
//! time.
//!
//! - [Pipeline::run_namespace]: every appender, in order, for one namespace.
//! - [Pipeline::run]: namespaces serially against the same map.
//! - [generate_graph]: builds the request context from configuration and runs the pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

use crate::appenders::{Appender, GraphAppender};
use crate::config::GraphConfig;
use crate::context::{GlobalInfo, NamespaceInfo};
use crate::error::GraphError;
use crate::types::TrafficMap;
use crate::upstream::{TelemetryClient, WorkloadLookup};

/// Whole milliseconds in `elapsed`, saturating at `u64::MAX`.
pub(crate) fn elapsed_ms(elapsed: Duration) -> u64 {
  u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// An ordered list of appenders built once per request.
#[derive(Debug, Clone)]
pub struct Pipeline {
  appenders: Vec<GraphAppender>,
  duration: Duration,
}

impl Pipeline {
  pub fn new(appenders: Vec<GraphAppender>, duration: Duration) -> Self {
    Self {
      appenders,
      duration,
    }
  }

  /// Builds the configured appenders in canonical order.
  pub fn from_config(config: &GraphConfig) -> Result<Self, GraphError> {
    config.validate()?;
    Ok(Self::new(GraphAppender::from_config(config)?, config.duration()))
  }

  pub fn appender_names(&self) -> Vec<&'static str> {
    self.appenders.iter().map(|a| a.name()).collect()
  }

  /// Runs every appender for `namespace`. Stops at the first failure; the error names the
  /// appender. Edge consistency is checked after each appender.
  #[instrument(level = "trace", skip(self, traffic_map, global, namespace), fields(namespace = %namespace.name))]
  pub async fn run_namespace(
    &self,
    traffic_map: &mut TrafficMap,
    global: &mut GlobalInfo,
    namespace: &mut NamespaceInfo,
  ) -> Result<(), GraphError> {
    for appender in &self.appenders {
      let name = appender.name();
      let started = Instant::now();
      appender
        .append_graph(traffic_map, global, namespace)
        .await
        .map_err(|e| e.in_appender(name))?;
      traffic_map
        .check_consistency()
        .map_err(|e| e.in_appender(name))?;
      info!(
        appender = name,
        namespace = %namespace.name,
        nodes = traffic_map.len(),
        edges = traffic_map.edge_count(),
        elapsed_ms = elapsed_ms(started.elapsed()),
        "appender completed"
      );
    }
    Ok(())
  }

  /// Runs the pipeline for each namespace in turn.
  pub async fn run(
    &self,
    traffic_map: &mut TrafficMap,
    global: &mut GlobalInfo,
    namespaces: &[String],
  ) -> Result<(), GraphError> {
    for name in namespaces {
      let mut namespace = NamespaceInfo::new(name.clone(), self.duration);
      self.run_namespace(traffic_map, global, &mut namespace).await?;
    }
    Ok(())
  }
}

/// Appends the configured annotations to `traffic_map` for `namespaces` and returns the
/// finished map. No partial map is returned on failure.
#[instrument(level = "trace", skip(traffic_map, config, workloads, telemetry))]
pub async fn generate_graph(
  mut traffic_map: TrafficMap,
  config: &GraphConfig,
  workloads: Arc<dyn WorkloadLookup>,
  telemetry: Arc<dyn TelemetryClient>,
  namespaces: &[String],
) -> Result<TrafficMap, GraphError> {
  let pipeline = Pipeline::from_config(config)?;
  let mut global = GlobalInfo::from_config(config, workloads, telemetry);
  info!(
    namespaces = ?namespaces,
    appenders = ?pipeline.appender_names(),
    graph_type = %config.graph_type,
    nodes = traffic_map.len(),
    "generating graph"
  );
  pipeline.run(&mut traffic_map, &mut global, namespaces).await?;
  Ok(traffic_map)
}
