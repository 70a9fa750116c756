//! Graph appenders: ordered transformation passes over an assembled traffic map.
//!
//! Each appender mutates the shared [TrafficMap] in place and leaves every edge pointing at a
//! node still in the map. The set is closed ([GraphAppender]) and always runs in the canonical
//! order of [GraphAppender::NAMES], whatever order configuration lists them in.

mod dead_node;
mod edge_samples;
#[cfg(test)]
mod fixtures;
mod response_time;
#[cfg(test)]
mod response_time_test;
mod security_policy;
mod sidecars_check;
mod throughput;

use async_trait::async_trait;

use crate::config::GraphConfig;
use crate::context::{GlobalInfo, NamespaceInfo};
use crate::error::GraphError;
use crate::types::TrafficMap;

pub use dead_node::DeadNodeAppender;
pub use edge_samples::{EdgeKey, EdgeResolver, Merge};
pub use response_time::ResponseTimeAppender;
pub use security_policy::SecurityPolicyAppender;
pub use sidecars_check::SidecarsCheckAppender;
pub use throughput::ThroughputAppender;

pub const DEAD_NODE: &str = "deadNode";
pub const RESPONSE_TIME: &str = "responseTime";
pub const SECURITY_POLICY: &str = "securityPolicy";
pub const SIDECARS_CHECK: &str = "sidecarsCheck";
pub const THROUGHPUT: &str = "throughput";

/// A named transformation over the traffic map.
///
/// `append_graph` may be called once per namespace on the same map; it must be a no-op on an
/// empty map and must restore edge consistency before returning.
#[async_trait]
pub trait Appender: Send + Sync {
  fn name(&self) -> &'static str;

  async fn append_graph(
    &self,
    traffic_map: &mut TrafficMap,
    global: &mut GlobalInfo,
    namespace: &mut NamespaceInfo,
  ) -> Result<(), GraphError>;
}

/// The closed set of appenders.
#[derive(Debug, Clone)]
pub enum GraphAppender {
  DeadNode(DeadNodeAppender),
  ResponseTime(ResponseTimeAppender),
  SecurityPolicy(SecurityPolicyAppender),
  SidecarsCheck(SidecarsCheckAppender),
  Throughput(ThroughputAppender),
}

impl GraphAppender {
  /// Appender names in execution order.
  pub const NAMES: [&'static str; 5] = [DEAD_NODE, RESPONSE_TIME, SECURITY_POLICY, SIDECARS_CHECK, THROUGHPUT];

  /// Builds the appender called `name`.
  pub fn from_name(name: &str, config: &GraphConfig) -> Result<Self, GraphError> {
    match name {
      DEAD_NODE => Ok(GraphAppender::DeadNode(DeadNodeAppender::new(config))),
      RESPONSE_TIME => Ok(GraphAppender::ResponseTime(ResponseTimeAppender::new(config))),
      SECURITY_POLICY => Ok(GraphAppender::SecurityPolicy(SecurityPolicyAppender::new(config))),
      SIDECARS_CHECK => Ok(GraphAppender::SidecarsCheck(SidecarsCheckAppender::new(config))),
      THROUGHPUT => Ok(GraphAppender::Throughput(ThroughputAppender::new(config))),
      other => Err(GraphError::UnknownAppender(other.to_string())),
    }
  }

  /// Builds the configured appenders in canonical order. `None` selects all of them.
  pub fn from_config(config: &GraphConfig) -> Result<Vec<Self>, GraphError> {
    let selected: Vec<&str> = match &config.appenders {
      None => Self::NAMES.to_vec(),
      Some(names) => {
        if let Some(unknown) = names.iter().find(|n| !Self::NAMES.contains(&n.as_str())) {
          return Err(GraphError::UnknownAppender(unknown.clone()));
        }
        Self::NAMES
          .into_iter()
          .filter(|canonical| names.iter().any(|n| n == canonical))
          .collect()
      }
    };
    selected
      .into_iter()
      .map(|name| Self::from_name(name, config))
      .collect()
  }

  fn inner(&self) -> &dyn Appender {
    match self {
      GraphAppender::DeadNode(a) => a,
      GraphAppender::ResponseTime(a) => a,
      GraphAppender::SecurityPolicy(a) => a,
      GraphAppender::SidecarsCheck(a) => a,
      GraphAppender::Throughput(a) => a,
    }
  }
}

#[async_trait]
impl Appender for GraphAppender {
  fn name(&self) -> &'static str {
    self.inner().name()
  }

  async fn append_graph(
    &self,
    traffic_map: &mut TrafficMap,
    global: &mut GlobalInfo,
    namespace: &mut NamespaceInfo,
  ) -> Result<(), GraphError> {
    self.inner().append_graph(traffic_map, global, namespace).await
  }
}
