//! Throughput: annotates edges with their byte rate.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::config::{GraphConfig, ThroughputConfig, round_to};
use crate::context::{GlobalInfo, NamespaceInfo};
use crate::error::GraphError;
use crate::types::TrafficMap;
use crate::types::metadata::THROUGHPUT as THROUGHPUT_KEY;
use crate::upstream::QueryTemplate;

use super::edge_samples::{apply_to_edges, fetch_samples};
use super::{Appender, EdgeResolver, Merge, THROUGHPUT};

/// Writes `throughput` onto edges matched by byte-rate telemetry.
///
/// Values are scaled and rounded; a value that rounds to zero is not written, so an edge without
/// the key had no measurable throughput.
#[derive(Debug, Clone)]
pub struct ThroughputAppender {
  resolver: EdgeResolver,
  config: ThroughputConfig,
}

impl ThroughputAppender {
  pub fn new(config: &GraphConfig) -> Self {
    Self {
      resolver: EdgeResolver::from_config(config),
      config: config.throughput.clone(),
    }
  }

  /// Converts a summed byte rate into the stored value, or `None` if it rounds to zero.
  pub(crate) fn scaled(&self, rate: f64) -> Option<f64> {
    let value = round_to(rate * self.config.scale, self.config.decimals);
    (value > 0.0).then_some(value)
  }
}

#[async_trait]
impl Appender for ThroughputAppender {
  fn name(&self) -> &'static str {
    THROUGHPUT
  }

  #[instrument(level = "trace", skip(self, traffic_map, global, namespace), fields(namespace = %namespace.name))]
  async fn append_graph(
    &self,
    traffic_map: &mut TrafficMap,
    global: &mut GlobalInfo,
    namespace: &mut NamespaceInfo,
  ) -> Result<(), GraphError> {
    if traffic_map.is_empty() {
      return Ok(());
    }
    let metric = self.config.kind.metric();
    let threshold = self.config.threshold;
    let samples = fetch_samples(global, namespace, |filter| {
      QueryTemplate::rate_sum(metric, filter, threshold)
    })
    .await?;

    let rates = self.resolver.collect(&samples, threshold, Merge::Sum);
    let written = apply_to_edges(traffic_map, &rates, THROUGHPUT_KEY, |rate| self.scaled(rate));
    debug!(
      namespace = %namespace.name,
      samples = samples.len(),
      edges = rates.len(),
      written,
      "throughput"
    );
    Ok(())
  }
}
