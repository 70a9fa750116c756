//! Tests for snapshot-backed collaborators.

use chrono::Utc;
use std::time::Duration;

use crate::snapshot::{RecordedTelemetry, StaticWorkloadLookup, load_recorded_telemetry, load_workloads};
use crate::types::{TelemetrySample, WorkloadListItem};
use crate::upstream::{QueryTemplate, SourceFilter, TelemetryClient, TelemetryQuery, WorkloadLookup};

fn query(namespace: &str, metric: &str, filter: SourceFilter) -> TelemetryQuery {
  TelemetryQuery {
    namespace: namespace.to_string(),
    window: Duration::from_secs(60),
    time: Utc::now(),
    template: QueryTemplate::rate_sum(metric, filter, 0.001),
  }
}

#[tokio::test]
async fn static_lookup_counts_calls_and_defaults_empty() {
  let lookup = StaticWorkloadLookup::default()
    .with_namespace("bookinfo", vec![WorkloadListItem::new("reviews-v1", 1)]);
  assert_eq!(lookup.workload_list("bookinfo").await.unwrap().len(), 1);
  assert!(lookup.workload_list("other").await.unwrap().is_empty());
  assert_eq!(lookup.calls(), 2);
}

#[tokio::test]
async fn recorded_telemetry_matches_namespace_metric_and_filter() {
  let telemetry = RecordedTelemetry::default()
    .record(
      "bookinfo",
      "istio_request_bytes_sum",
      SourceFilter::InsideNamespace,
      vec![TelemetrySample::new([("a", "b")], 10.0)],
    )
    .record(
      "bookinfo",
      "istio_request_bytes_sum",
      SourceFilter::OutsideNamespace,
      vec![TelemetrySample::new([("a", "c")], 20.0)],
    );
  let inside = telemetry
    .query(&query("bookinfo", "istio_request_bytes_sum", SourceFilter::InsideNamespace))
    .await
    .unwrap();
  assert_eq!(inside.len(), 1);
  assert_eq!(inside[0].value, 10.0);
  let other = telemetry
    .query(&query("bookinfo", "istio_response_bytes_sum", SourceFilter::InsideNamespace))
    .await
    .unwrap();
  assert!(other.is_empty());
  assert_eq!(telemetry.calls(), 2);
}

#[tokio::test]
async fn load_snapshots_from_files() {
  let dir = tempfile::tempdir().unwrap();
  let wl = dir.path().join("workloads.json");
  std::fs::write(
    &wl,
    r#"{"bookinfo":[{"name":"reviews-v1","podCount":2},{"name":"legacy","podCount":1,"istioSidecar":false}]}"#,
  )
  .unwrap();
  let lookup = load_workloads(&wl).unwrap();
  let items = lookup.workload_list("bookinfo").await.unwrap();
  assert_eq!(items[0].pod_count, 2);
  assert!(items[0].istio_sidecar);
  assert!(!items[1].istio_sidecar);

  let tel = dir.path().join("telemetry.json");
  std::fs::write(
    &tel,
    r#"[{"namespace":"bookinfo","metric":"m","filter":"insideNamespace","samples":[{"labels":{"x":"y"},"value":3.0}]}]"#,
  )
  .unwrap();
  let telemetry = load_recorded_telemetry(&tel).unwrap();
  let samples = telemetry
    .query(&query("bookinfo", "m", SourceFilter::InsideNamespace))
    .await
    .unwrap();
  assert_eq!(samples[0].label("x"), Some("y"));
}
