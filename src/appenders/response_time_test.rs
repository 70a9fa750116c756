//! Tests for `response_time`.

use std::sync::Arc;

use crate::snapshot::{RecordedTelemetry, StaticWorkloadLookup};
use crate::types::TrafficMap;
use crate::types::metadata::RESPONSE_TIME as RESPONSE_TIME_KEY;
use crate::upstream::SourceFilter;

use super::fixtures::*;
use super::response_time::DURATION_METRIC;
use super::{Appender, RESPONSE_TIME, ResponseTimeAppender};

#[tokio::test]
async fn slowest_sample_wins_per_edge() {
  let mut tm = TrafficMap::new();
  tm.add_node(workload_node(NS, "a"));
  tm.add_node(service_node(NS, "b-svc"));
  tm.add_node(workload_node(NS, "b1"));
  tm.add_node(workload_node(NS, "b2"));
  tm.add_edge(&wl(NS, "a"), &svc(NS, "b-svc")).unwrap();
  tm.add_edge(&svc(NS, "b-svc"), &wl(NS, "b1")).unwrap();
  tm.add_edge(&svc(NS, "b-svc"), &wl(NS, "b2")).unwrap();

  let telemetry = Arc::new(RecordedTelemetry::default().record(
    NS,
    DURATION_METRIC,
    SourceFilter::InsideNamespace,
    vec![
      sample("a", "b-svc", "b1", 12.344),
      sample("a", "b-svc", "b2", 40.0),
      sample("a", "b-svc", "b2", 25.0),
    ],
  ));
  let (mut global, mut ns) = context(Arc::new(StaticWorkloadLookup::default()), telemetry, NS);
  let appender = ResponseTimeAppender::new(&workload_config(true));
  assert_eq!(appender.name(), RESPONSE_TIME);
  appender.append_graph(&mut tm, &mut global, &mut ns).await.unwrap();

  let rt = |s: &str, d: &str| tm.get(s).unwrap().edge_to(d).unwrap().number(RESPONSE_TIME_KEY);
  assert_eq!(rt(&wl(NS, "a"), &svc(NS, "b-svc")), None);
  assert_eq!(rt(&svc(NS, "b-svc"), &wl(NS, "b1")), Some(12.34));
  assert_eq!(rt(&svc(NS, "b-svc"), &wl(NS, "b2")), Some(40.0));
}

#[tokio::test]
async fn no_samples_leaves_edges_bare() {
  let mut tm = TrafficMap::new();
  tm.add_node(workload_node(NS, "a"));
  tm.add_node(workload_node(NS, "b"));
  tm.add_edge(&wl(NS, "a"), &wl(NS, "b")).unwrap();
  let telemetry = Arc::new(RecordedTelemetry::default());
  let (mut global, mut ns) = context(Arc::new(StaticWorkloadLookup::default()), telemetry.clone(), NS);
  ResponseTimeAppender::new(&workload_config(false))
    .append_graph(&mut tm, &mut global, &mut ns)
    .await
    .unwrap();
  assert!(tm.get(&wl(NS, "a")).unwrap().edges[0].metadata.is_empty());
  assert_eq!(telemetry.calls(), 2);
}
