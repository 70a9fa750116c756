//! Snapshot-backed collaborators: a fixed workload inventory and recorded telemetry vectors.
//!
//! Used by the CLI for offline runs and by tests; both count the calls they serve so callers can
//! check how often upstream was consulted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{instrument, trace};

use crate::error::GraphError;
use crate::types::{TelemetrySample, WorkloadListItem};
use crate::upstream::{SourceFilter, TelemetryClient, TelemetryQuery, WorkloadLookup};

/// Workload inventory keyed by namespace. Namespaces not present have no workloads.
#[derive(Debug, Default)]
pub struct StaticWorkloadLookup {
  workloads: HashMap<String, Vec<WorkloadListItem>>,
  calls: AtomicUsize,
}

impl StaticWorkloadLookup {
  pub fn new(workloads: HashMap<String, Vec<WorkloadListItem>>) -> Self {
    Self {
      workloads,
      calls: AtomicUsize::new(0),
    }
  }

  pub fn with_namespace(mut self, namespace: impl Into<String>, items: Vec<WorkloadListItem>) -> Self {
    self.workloads.insert(namespace.into(), items);
    self
  }

  /// Number of `workload_list` calls served so far.
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl WorkloadLookup for StaticWorkloadLookup {
  async fn workload_list(&self, namespace: &str) -> Result<Vec<WorkloadListItem>, GraphError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(self.workloads.get(namespace).cloned().unwrap_or_default())
  }
}

/// A recorded answer to one query shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedVector {
  pub namespace: String,
  pub metric: String,
  pub filter: SourceFilter,
  #[serde(default)]
  pub samples: Vec<TelemetrySample>,
}

/// Telemetry answered from recorded vectors, matched on (namespace, metric, filter).
/// Unmatched queries return an empty vector.
#[derive(Debug, Default)]
pub struct RecordedTelemetry {
  vectors: Vec<RecordedVector>,
  calls: AtomicUsize,
}

impl RecordedTelemetry {
  pub fn new(vectors: Vec<RecordedVector>) -> Self {
    Self {
      vectors,
      calls: AtomicUsize::new(0),
    }
  }

  pub fn record(
    mut self,
    namespace: impl Into<String>,
    metric: impl Into<String>,
    filter: SourceFilter,
    samples: Vec<TelemetrySample>,
  ) -> Self {
    self.vectors.push(RecordedVector {
      namespace: namespace.into(),
      metric: metric.into(),
      filter,
      samples,
    });
    self
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl TelemetryClient for RecordedTelemetry {
  async fn query(&self, query: &TelemetryQuery) -> Result<Vec<TelemetrySample>, GraphError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let samples: Vec<TelemetrySample> = self
      .vectors
      .iter()
      .filter(|v| {
        v.namespace == query.namespace
          && v.metric == query.template.metric
          && v.filter == query.template.filter
      })
      .flat_map(|v| v.samples.iter().cloned())
      .collect();
    trace!(expression = %query.expression(), samples = samples.len(), "recorded telemetry");
    Ok(samples)
  }
}

/// Loads a workload inventory (`{"namespace": [workload, ...]}`) from a JSON file.
#[instrument(level = "trace", skip(path))]
pub fn load_workloads(path: &Path) -> Result<StaticWorkloadLookup, GraphError> {
  let bytes = std::fs::read(path)?;
  let workloads: HashMap<String, Vec<WorkloadListItem>> = serde_json::from_slice(&bytes)?;
  Ok(StaticWorkloadLookup::new(workloads))
}

/// Loads recorded telemetry vectors from a JSON file.
#[instrument(level = "trace", skip(path))]
pub fn load_recorded_telemetry(path: &Path) -> Result<RecordedTelemetry, GraphError> {
  let bytes = std::fs::read(path)?;
  let vectors: Vec<RecordedVector> = serde_json::from_slice(&bytes)?;
  Ok(RecordedTelemetry::new(vectors))
}
