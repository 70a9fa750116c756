//! Interfaces to the external collaborators: telemetry queries and cluster workload lookup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::error::GraphError;
use crate::types::telemetry_sample::EDGE_GROUP_BY;
use crate::types::{TelemetrySample, WorkloadListItem};

/// Which traffic a namespace query selects, by where the source workload lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceFilter {
  /// Source outside the namespace, destination service inside it.
  OutsideNamespace,
  /// Source inside the namespace (intra-namespace and outbound traffic).
  InsideNamespace,
}

impl SourceFilter {
  pub const BOTH: [SourceFilter; 2] = [SourceFilter::OutsideNamespace, SourceFilter::InsideNamespace];

  fn selector(&self, namespace: &str) -> String {
    match self {
      SourceFilter::OutsideNamespace => format!(
        r#"reporter="destination",source_workload_namespace!="{namespace}",destination_service_namespace="{namespace}""#
      ),
      SourceFilter::InsideNamespace => {
        format!(r#"reporter="destination",source_workload_namespace="{namespace}""#)
      }
    }
  }
}

/// How samples of the metric are combined per edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregation {
  /// Per-second rate summed over the window.
  RateSum,
  /// Histogram quantile over the window; the metric names the histogram (without `_bucket`).
  Quantile(f64),
}

/// A query shape independent of namespace and window.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTemplate {
  pub metric: String,
  pub filter: SourceFilter,
  pub aggregation: Aggregation,
  /// Labels grouped by in addition to the edge identity labels.
  pub extra_group_by: Vec<String>,
  /// Samples at or below this value are dropped by the backend.
  pub threshold: f64,
}

impl QueryTemplate {
  pub fn rate_sum(metric: impl Into<String>, filter: SourceFilter, threshold: f64) -> Self {
    Self {
      metric: metric.into(),
      filter,
      aggregation: Aggregation::RateSum,
      extra_group_by: Vec::new(),
      threshold,
    }
  }

  pub fn group_by(mut self, label: impl Into<String>) -> Self {
    self.extra_group_by.push(label.into());
    self
  }

  /// Renders the template as PromQL for `namespace` over `window`.
  pub fn render(&self, namespace: &str, window: Duration) -> String {
    let selector = self.filter.selector(namespace);
    let secs = window.as_secs();
    let group_by = EDGE_GROUP_BY
      .iter()
      .map(|s| s.to_string())
      .chain(self.extra_group_by.iter().cloned())
      .collect::<Vec<_>>()
      .join(",");
    match self.aggregation {
      Aggregation::RateSum => format!(
        "sum(rate({}{{{selector}}}[{secs}s])) by ({group_by}) > {}",
        self.metric, self.threshold
      ),
      Aggregation::Quantile(q) => format!(
        "histogram_quantile({q}, sum(rate({}_bucket{{{selector}}}[{secs}s])) by (le,{group_by})) > {}",
        self.metric, self.threshold
      ),
    }
  }
}

/// One telemetry query: a template bound to a namespace, window and evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryQuery {
  pub namespace: String,
  pub window: Duration,
  pub time: DateTime<Utc>,
  pub template: QueryTemplate,
}

impl TelemetryQuery {
  pub fn expression(&self) -> String {
    self.template.render(&self.namespace, self.window)
  }
}

/// Telemetry backend. Errors are fatal to the request; implementations do their own retries.
#[async_trait]
pub trait TelemetryClient: Send + Sync {
  async fn query(&self, query: &TelemetryQuery) -> Result<Vec<TelemetrySample>, GraphError>;
}

/// Cluster workload listing.
#[async_trait]
pub trait WorkloadLookup: Send + Sync {
  async fn workload_list(&self, namespace: &str) -> Result<Vec<WorkloadListItem>, GraphError>;
}

/// Runs `fut` with a deadline; an elapsed deadline becomes [GraphError::Timeout].
pub async fn with_deadline<T, F>(timeout: Duration, operation: &str, fut: F) -> Result<T, GraphError>
where
  F: Future<Output = Result<T, GraphError>>,
{
  match tokio::time::timeout(timeout, fut).await {
    Ok(result) => result,
    Err(_) => Err(GraphError::Timeout {
      operation: operation.to_string(),
      timeout,
    }),
  }
}
