//! Request-scoped context handed to every appender.
//!
//! [GlobalInfo] lives for the whole request; [NamespaceInfo] for one namespace pass. Both are
//! discarded when the request completes, so the workload caches never outlive it.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::types::WorkloadListItem;
use crate::upstream::{TelemetryClient, WorkloadLookup, with_deadline};

/// Shared workload list for one namespace.
pub type WorkloadList = Arc<[WorkloadListItem]>;

/// Request-wide state: upstream handles, evaluation time and the cross-namespace workload cache.
pub struct GlobalInfo {
  pub workloads: Arc<dyn WorkloadLookup>,
  pub telemetry: Arc<dyn TelemetryClient>,
  /// Telemetry is evaluated at this instant.
  pub query_time: DateTime<Utc>,
  /// Deadline applied to each upstream call.
  pub query_timeout: Duration,
  workload_cache: HashMap<String, WorkloadList>,
}

impl fmt::Debug for GlobalInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GlobalInfo")
      .field("query_time", &self.query_time)
      .field("query_timeout", &self.query_timeout)
      .field("cached_namespaces", &self.workload_cache.len())
      .finish_non_exhaustive()
  }
}

impl GlobalInfo {
  pub fn new(
    workloads: Arc<dyn WorkloadLookup>,
    telemetry: Arc<dyn TelemetryClient>,
    query_time: DateTime<Utc>,
    query_timeout: Duration,
  ) -> Self {
    Self {
      workloads,
      telemetry,
      query_time,
      query_timeout,
      workload_cache: HashMap::new(),
    }
  }

  /// Context for a request evaluated now with the configured deadline.
  pub fn from_config(
    config: &GraphConfig,
    workloads: Arc<dyn WorkloadLookup>,
    telemetry: Arc<dyn TelemetryClient>,
  ) -> Self {
    Self::new(workloads, telemetry, Utc::now(), config.query_timeout())
  }

  /// Workload list of `namespace`, fetched at most once per request.
  pub async fn workload_list(&mut self, namespace: &str) -> Result<WorkloadList, GraphError> {
    if let Some(list) = self.workload_cache.get(namespace) {
      return Ok(Arc::clone(list));
    }
    let lookup = Arc::clone(&self.workloads);
    let operation = format!("workload lookup for namespace '{namespace}'");
    let items = with_deadline(self.query_timeout, &operation, lookup.workload_list(namespace)).await?;
    trace!(namespace, workloads = items.len(), "fetched workload list");
    let list: WorkloadList = items.into();
    self
      .workload_cache
      .insert(namespace.to_string(), Arc::clone(&list));
    Ok(list)
  }

  /// True if the workload list of `namespace` has already been fetched.
  pub fn has_workload_list(&self, namespace: &str) -> bool {
    self.workload_cache.contains_key(namespace)
  }
}

/// State for one namespace pass of the pipeline.
#[derive(Debug, Clone)]
pub struct NamespaceInfo {
  pub name: String,
  /// Telemetry window ending at [GlobalInfo::query_time].
  pub duration: Duration,
  workload_list: Option<WorkloadList>,
}

impl NamespaceInfo {
  pub fn new(name: impl Into<String>, duration: Duration) -> Self {
    Self {
      name: name.into(),
      duration,
      workload_list: None,
    }
  }

  /// Workload list of this namespace, populated by the first appender that asks for it.
  pub async fn workload_list(&mut self, global: &mut GlobalInfo) -> Result<WorkloadList, GraphError> {
    if let Some(list) = &self.workload_list {
      return Ok(Arc::clone(list));
    }
    let list = global.workload_list(&self.name).await?;
    self.workload_list = Some(Arc::clone(&list));
    Ok(list)
  }

  /// Workload list of `namespace`: this pass's cached list for its own namespace, otherwise the
  /// request-wide cache.
  pub async fn workload_list_for(
    &mut self,
    global: &mut GlobalInfo,
    namespace: &str,
  ) -> Result<WorkloadList, GraphError> {
    if namespace == self.name {
      self.workload_list(global).await
    } else {
      global.workload_list(namespace).await
    }
  }
}
