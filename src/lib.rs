//! # mesh-traffic-graph
//!
//! Service-mesh traffic graph construction and appender pipeline.
//!
//! ## Architecture
//!
//! A [TrafficMap] assembled from telemetry is handed to a [Pipeline] of appenders, run once per
//! namespace. Appenders prune it (dead nodes) and annotate it (throughput, response time, mTLS
//! share, missing sidecars) using the request-scoped [GlobalInfo] and [NamespaceInfo].
//!
//! Upstream systems are reached through [TelemetryClient] and [WorkloadLookup]; the crate ships a
//! Prometheus client and snapshot-backed implementations of both.

pub mod appenders;
pub mod config;
pub mod context;
pub mod error;
#[cfg(test)]
mod error_test;
pub mod pipeline;
pub mod policy;
pub mod prometheus;
pub mod snapshot;
#[cfg(test)]
mod snapshot_test;
pub mod traffic_map_io;
#[cfg(test)]
mod traffic_map_io_test;
pub mod types;
pub mod upstream;

pub use appenders::{Appender, GraphAppender};
pub use config::{GraphConfig, load_config};
pub use context::{GlobalInfo, NamespaceInfo};
pub use error::GraphError;
pub use pipeline::{Pipeline, generate_graph};
pub use prometheus::PrometheusClient;
pub use types::{Edge, GraphType, Node, NodeIdentity, NodeType, TrafficMap};
pub use upstream::{TelemetryClient, WorkloadLookup};
