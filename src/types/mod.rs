//! Traffic graph data model: nodes, edges, the traffic map and the upstream records the
//! appenders consume.

mod edge;
mod graph_type;
pub mod metadata;
mod node;
mod node_identity;
#[cfg(test)]
mod node_identity_test;
mod protocol;
#[cfg(test)]
mod protocol_test;
pub mod telemetry_sample;
mod traffic_map;
mod workload;

pub use edge::Edge;
pub use graph_type::{GraphType, NodeType, UNKNOWN, is_ok};
pub use metadata::{Metadata, MetadataValue};
pub use node::Node;
pub use node_identity::NodeIdentity;
pub use protocol::{Protocol, Rate};
pub use telemetry_sample::{TelemetrySample, TrafficLabels};
pub use traffic_map::TrafficMap;
pub use workload::{WorkloadListItem, find_workload};
