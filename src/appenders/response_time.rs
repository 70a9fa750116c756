//! Response time: annotates edges with a request duration quantile in milliseconds.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::config::{GraphConfig, ResponseTimeConfig, round_to};
use crate::context::{GlobalInfo, NamespaceInfo};
use crate::error::GraphError;
use crate::types::TrafficMap;
use crate::types::metadata::RESPONSE_TIME as RESPONSE_TIME_KEY;
use crate::upstream::{Aggregation, QueryTemplate, SourceFilter};

use super::edge_samples::{apply_to_edges, fetch_samples};
use super::{Appender, EdgeResolver, Merge, RESPONSE_TIME};

/// Request duration histogram, without the `_bucket` suffix.
pub const DURATION_METRIC: &str = "istio_request_duration_milliseconds";

/// Writes `responseTime` onto edges. When several samples land on one edge (injected service
/// edges, split versions) the slowest wins.
#[derive(Debug, Clone)]
pub struct ResponseTimeAppender {
  resolver: EdgeResolver,
  config: ResponseTimeConfig,
}

impl ResponseTimeAppender {
  pub fn new(config: &GraphConfig) -> Self {
    Self {
      resolver: EdgeResolver::from_config(config),
      config: config.response_time.clone(),
    }
  }

  fn template(&self, filter: SourceFilter) -> QueryTemplate {
    QueryTemplate {
      metric: DURATION_METRIC.to_string(),
      filter,
      aggregation: Aggregation::Quantile(self.config.quantile),
      extra_group_by: Vec::new(),
      threshold: 0.0,
    }
  }
}

#[async_trait]
impl Appender for ResponseTimeAppender {
  fn name(&self) -> &'static str {
    RESPONSE_TIME
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
    let samples = fetch_samples(global, namespace, |filter| self.template(filter)).await?;
    let durations = self.resolver.collect(&samples, 0.0, Merge::Max);
    let decimals = self.config.decimals;
    let written = apply_to_edges(traffic_map, &durations, RESPONSE_TIME_KEY, |ms| {
      let value = round_to(ms, decimals);
      (value > 0.0).then_some(value)
    });
    debug!(namespace = %namespace.name, samples = samples.len(), written, "response time");
    Ok(())
  }
}
