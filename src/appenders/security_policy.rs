//! Security policy: annotates edges with the share of requests sent over mutual TLS.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::config::GraphConfig;
use crate::context::{GlobalInfo, NamespaceInfo};
use crate::error::GraphError;
use crate::types::{TelemetrySample, TrafficMap};
use crate::types::metadata::IS_MTLS;
use crate::types::telemetry_sample::CONNECTION_SECURITY_POLICY;
use crate::upstream::QueryTemplate;

use super::edge_samples::{apply_to_edges, fetch_samples};
use super::{Appender, EdgeKey, EdgeResolver, Merge, SECURITY_POLICY};

pub const REQUESTS_METRIC: &str = "istio_requests_total";
pub const MUTUAL_TLS: &str = "mutual_tls";

/// Writes `isMTLS` (percentage, 0..=100) onto edges that carried any mutual TLS traffic.
#[derive(Debug, Clone)]
pub struct SecurityPolicyAppender {
  resolver: EdgeResolver,
}

impl SecurityPolicyAppender {
  pub fn new(config: &GraphConfig) -> Self {
    Self {
      resolver: EdgeResolver::from_config(config),
    }
  }
}

/// Percentage of `mtls` in `total` per edge, for edges where both are positive.
pub(crate) fn mtls_percentages(
  total: &BTreeMap<EdgeKey, f64>,
  mtls: &BTreeMap<EdgeKey, f64>,
) -> BTreeMap<EdgeKey, f64> {
  total
    .iter()
    .filter_map(|(key, &all)| {
      let secured = mtls.get(key).copied().unwrap_or(0.0);
      (all > 0.0 && secured > 0.0).then(|| (key.clone(), (secured / all * 100.0).min(100.0)))
    })
    .collect()
}

#[async_trait]
impl Appender for SecurityPolicyAppender {
  fn name(&self) -> &'static str {
    SECURITY_POLICY
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
    let samples = fetch_samples(global, namespace, |filter| {
      QueryTemplate::rate_sum(REQUESTS_METRIC, filter, 0.0).group_by(CONNECTION_SECURITY_POLICY)
    })
    .await?;

    let secured: Vec<TelemetrySample> = samples
      .iter()
      .filter(|s| s.label(CONNECTION_SECURITY_POLICY) == Some(MUTUAL_TLS))
      .cloned()
      .collect();
    let total = self.resolver.collect(&samples, 0.0, Merge::Sum);
    let mtls = self.resolver.collect(&secured, 0.0, Merge::Sum);
    let percentages = mtls_percentages(&total, &mtls);
    let written = apply_to_edges(traffic_map, &percentages, IS_MTLS, Some);
    debug!(namespace = %namespace.name, samples = samples.len(), written, "security policy");
    Ok(())
  }
}
