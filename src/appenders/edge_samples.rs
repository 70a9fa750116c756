//! Mapping telemetry samples onto traffic map edges.
//!
//! Shared by the telemetry-driven appenders: fetch both source-filter variants of a query,
//! resolve each sample to the edge it is reported on, fold values per edge and write the result
//! into edges that exist. Nodes and edges are never created here.

use futures::try_join;
use std::collections::BTreeMap;
use tracing::{instrument, trace, warn};

use crate::config::GraphConfig;
use crate::context::{GlobalInfo, NamespaceInfo};
use crate::error::GraphError;
use crate::types::{
  GraphType, NodeIdentity, NodeType, TelemetrySample, TrafficLabels, TrafficMap, is_ok,
};
use crate::upstream::{QueryTemplate, SourceFilter, TelemetryQuery, with_deadline};

/// An edge identified by (source node id, destination node id).
pub type EdgeKey = (String, String);

/// How values landing on the same edge combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
  Sum,
  Max,
}

impl Merge {
  fn apply(self, current: f64, value: f64) -> f64 {
    match self {
      Merge::Sum => current + value,
      Merge::Max => current.max(value),
    }
  }
}

/// Resolves sample identities to edge keys under one graph type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeResolver {
  pub graph_type: GraphType,
  pub inject_service_nodes: bool,
}

impl EdgeResolver {
  pub fn from_config(config: &GraphConfig) -> Self {
    Self {
      graph_type: config.graph_type,
      inject_service_nodes: config.inject_service_nodes,
    }
  }

  /// The edge the sample is reported on. With service nodes injected in front of a
  /// non-service destination that is the service → destination edge; the edge into the
  /// service node carries no sample values.
  pub fn resolve(&self, labels: &TrafficLabels) -> Result<EdgeKey, GraphError> {
    let (source_id, _) = labels.source.resolve(self.graph_type)?;
    let (dest_id, dest_type) = labels.destination.resolve(self.graph_type)?;

    let dest = &labels.destination;
    if self.inject_service_nodes && is_ok(&dest.service) && dest_type != NodeType::Service {
      let service = NodeIdentity::service(&dest.cluster, &dest.service_namespace, &dest.service);
      let (service_id, _) = service.resolve(self.graph_type)?;
      return Ok((service_id, dest_id));
    }
    Ok((source_id, dest_id))
  }

  /// Folds samples above `threshold` into per-edge values.
  ///
  /// Samples without the full identity tuple are skipped with a warning; samples whose identity
  /// cannot produce a node id are skipped silently.
  pub fn collect(
    &self,
    samples: &[TelemetrySample],
    threshold: f64,
    merge: Merge,
  ) -> BTreeMap<EdgeKey, f64> {
    let mut values: BTreeMap<EdgeKey, f64> = BTreeMap::new();
    for sample in samples {
      if sample.value.is_nan() || sample.value <= threshold {
        continue;
      }
      let labels = match TrafficLabels::from_sample(sample) {
        Ok(labels) => labels,
        Err(missing) => {
          warn!(label = missing, "skipping telemetry sample without identity label");
          continue;
        }
      };
      let key = match self.resolve(&labels) {
        Ok(key) => key,
        Err(e) => {
          trace!(error = %e, "skipping telemetry sample");
          continue;
        }
      };
      values
        .entry(key)
        .and_modify(|v| *v = merge.apply(*v, sample.value))
        .or_insert(sample.value);
    }
    values
  }
}

/// Runs `template` for both source filters of the namespace concurrently and returns all
/// samples, outside-namespace first.
#[instrument(level = "trace", skip(global, namespace, template), fields(namespace = %namespace.name))]
pub(crate) async fn fetch_samples<T>(
  global: &GlobalInfo,
  namespace: &NamespaceInfo,
  template: T,
) -> Result<Vec<TelemetrySample>, GraphError>
where
  T: Fn(SourceFilter) -> QueryTemplate,
{
  let [outside, inside] = SourceFilter::BOTH.map(|filter| TelemetryQuery {
    namespace: namespace.name.clone(),
    window: namespace.duration,
    time: global.query_time,
    template: template(filter),
  });
  let operation = format!("telemetry query for namespace '{}'", namespace.name);
  let (mut samples, inside_samples) = try_join!(
    with_deadline(global.query_timeout, &operation, global.telemetry.query(&outside)),
    with_deadline(global.query_timeout, &operation, global.telemetry.query(&inside)),
  )?;
  samples.extend(inside_samples);
  Ok(samples)
}

/// Writes folded values into matching edges under `key`. `transform` maps the folded value to
/// what is stored; `None` leaves the edge untouched. Returns the number of edges written.
pub(crate) fn apply_to_edges<F>(
  traffic_map: &mut TrafficMap,
  values: &BTreeMap<EdgeKey, f64>,
  key: &str,
  transform: F,
) -> usize
where
  F: Fn(f64) -> Option<f64>,
{
  let mut written = 0;
  for ((source, dest), value) in values {
    let Some(edge) = traffic_map.edge_mut(source, dest) else {
      trace!(source = %source, dest = %dest, "no edge for telemetry");
      continue;
    };
    if let Some(stored) = transform(*value) {
      edge.set_metadata(key, stored);
      written += 1;
    }
  }
  written
}
