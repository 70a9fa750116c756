//! Integration tests over the bookinfo snapshot in tests/fixtures/bookinfo/: the full pipeline
//! through the library entry point, and the append_graph CLI end to end.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use mesh_traffic_graph::snapshot::{RecordedTelemetry, StaticWorkloadLookup, load_recorded_telemetry, load_workloads};
use mesh_traffic_graph::traffic_map_io::load_traffic_map;
use mesh_traffic_graph::types::metadata::{HAS_MISSING_SC, IS_DEAD, IS_MTLS, RESPONSE_TIME, THROUGHPUT};
use mesh_traffic_graph::{GraphConfig, GraphError, GraphType, TrafficMap, generate_graph};

const PRODUCTPAGE: &str = "wl_east_bookinfo_productpage-v1";
const REVIEWS_SVC: &str = "svc_east_bookinfo_reviews";
const REVIEWS_V1: &str = "wl_east_bookinfo_reviews-v1";
const DETAILS_SVC: &str = "svc_east_bookinfo_details";
const DETAILS_V1: &str = "wl_east_bookinfo_details-v1";

fn fixture(name: &str) -> PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join("bookinfo")
    .join(name)
}

fn config() -> GraphConfig {
  GraphConfig {
    graph_type: GraphType::Workload,
    inject_service_nodes: true,
    ..GraphConfig::default()
  }
}

struct Snapshot {
  graph: TrafficMap,
  workloads: Arc<StaticWorkloadLookup>,
  telemetry: Arc<RecordedTelemetry>,
}

fn snapshot() -> Snapshot {
  Snapshot {
    graph: load_traffic_map(&fixture("graph.json")).expect("graph.json"),
    workloads: Arc::new(load_workloads(&fixture("workloads.json")).expect("workloads.json")),
    telemetry: Arc::new(load_recorded_telemetry(&fixture("telemetry.json")).expect("telemetry.json")),
  }
}

async fn run(snapshot: &Snapshot, config: &GraphConfig) -> Result<TrafficMap, GraphError> {
  generate_graph(
    snapshot.graph.clone(),
    config,
    snapshot.workloads.clone(),
    snapshot.telemetry.clone(),
    &["bookinfo".to_string()],
  )
  .await
}

fn edge_number(tm: &TrafficMap, source: &str, dest: &str, key: &str) -> Option<f64> {
  tm.get(source)?.edge_to(dest)?.number(key)
}

// ---- library: full pipeline ----

#[tokio::test]
async fn pipeline_prunes_dead_nodes() {
  let snap = snapshot();
  let tm = run(&snap, &config()).await.unwrap();

  let ids: Vec<&str> = tm.ids().map(String::as_str).collect();
  assert_eq!(ids, vec![DETAILS_SVC, REVIEWS_SVC, DETAILS_V1, PRODUCTPAGE, REVIEWS_V1]);
  assert!(tm.check_consistency().is_ok());
  assert!(tm.get(REVIEWS_SVC).unwrap().edge_to("wl_east_bookinfo_reviews-v2").is_none());
  assert!(tm.get(DETAILS_V1).unwrap().is_flagged(IS_DEAD));
  assert!(!tm.get(REVIEWS_V1).unwrap().is_flagged(IS_DEAD));
}

#[tokio::test]
async fn pipeline_annotates_edges() {
  let snap = snapshot();
  let tm = run(&snap, &config()).await.unwrap();

  assert_eq!(edge_number(&tm, REVIEWS_SVC, REVIEWS_V1, THROUGHPUT), Some(3.0));
  assert_eq!(edge_number(&tm, REVIEWS_SVC, REVIEWS_V1, RESPONSE_TIME), Some(25.46));
  assert_eq!(edge_number(&tm, REVIEWS_SVC, REVIEWS_V1, IS_MTLS), Some(75.0));
  // the edge into an injected service node carries no telemetry values
  let into_service = tm.get(PRODUCTPAGE).unwrap().edge_to(REVIEWS_SVC).unwrap();
  assert!(!into_service.metadata.contains_key(THROUGHPUT));
  assert!(!into_service.metadata.contains_key(RESPONSE_TIME));
  assert!(!into_service.metadata.contains_key(IS_MTLS));
  assert_eq!(edge_number(&tm, PRODUCTPAGE, DETAILS_SVC, THROUGHPUT), None);
}

#[tokio::test]
async fn pipeline_flags_missing_sidecars() {
  let snap = snapshot();
  let tm = run(&snap, &config()).await.unwrap();

  assert!(tm.get(DETAILS_V1).unwrap().is_flagged(HAS_MISSING_SC));
  assert!(!tm.get(PRODUCTPAGE).unwrap().is_flagged(HAS_MISSING_SC));
  assert!(!tm.get(DETAILS_SVC).unwrap().is_flagged(HAS_MISSING_SC));
}

#[tokio::test]
async fn pipeline_consults_upstream_once_per_query() {
  let snap = snapshot();
  run(&snap, &config()).await.unwrap();

  // one inventory fetch shared by deadNode and sidecarsCheck
  assert_eq!(snap.workloads.calls(), 1);
  // two source filters for each of responseTime, securityPolicy and throughput
  assert_eq!(snap.telemetry.calls(), 6);
}

#[tokio::test]
async fn pipeline_output_is_deterministic() {
  let snap = snapshot();
  let first = run(&snap, &config()).await.unwrap();
  let second = run(&snap, &config()).await.unwrap();
  assert_eq!(
    serde_json::to_string(&first).unwrap(),
    serde_json::to_string(&second).unwrap()
  );
}

#[tokio::test]
async fn pipeline_rerun_on_output_keeps_graph() {
  let snap = snapshot();
  let first = run(&snap, &config()).await.unwrap();
  let rerun = Snapshot {
    graph: first.clone(),
    ..snapshot()
  };
  let second = run(&rerun, &config()).await.unwrap();
  assert_eq!(first, second);
}

#[tokio::test]
async fn selected_appenders_only() {
  let snap = snapshot();
  let config = GraphConfig {
    appenders: Some(vec!["throughput".to_string()]),
    ..config()
  };
  let tm = run(&snap, &config).await.unwrap();

  // nothing pruned, only throughput written
  assert_eq!(tm.len(), snap.graph.len());
  assert_eq!(edge_number(&tm, REVIEWS_SVC, REVIEWS_V1, THROUGHPUT), Some(3.0));
  assert_eq!(edge_number(&tm, REVIEWS_SVC, REVIEWS_V1, RESPONSE_TIME), None);
  assert_eq!(snap.workloads.calls(), 0);
  assert_eq!(snap.telemetry.calls(), 2);
}

#[tokio::test]
async fn unknown_appender_fails_before_upstream() {
  let snap = snapshot();
  let config = GraphConfig {
    appenders: Some(vec!["deadNode".to_string(), "bogus".to_string()]),
    ..config()
  };
  let err = run(&snap, &config).await.unwrap_err();
  assert!(matches!(err, GraphError::UnknownAppender(ref name) if name == "bogus"));
  assert_eq!(snap.workloads.calls(), 0);
  assert_eq!(snap.telemetry.calls(), 0);
}

// ---- CLI ----

/// Run `cargo run --bin append_graph -- <args...>` from the crate root. Returns (stdout, stderr, success).
fn run_append_graph(args: &[&str]) -> (Vec<u8>, Vec<u8>, bool) {
  let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
  let out = Command::new(cargo.as_str())
    .args(["run", "--bin", "append_graph", "--"])
    .args(args)
    .current_dir(env!("CARGO_MANIFEST_DIR"))
    .env_remove("MESHGRAPH_CONFIG")
    .env_remove("MESHGRAPH_NAMESPACES")
    .env_remove("MESHGRAPH_APPENDERS")
    .env_remove("MESHGRAPH_GRAPH_TYPE")
    .env_remove("MESHGRAPH_PROMETHEUS_URL")
    .output()
    .expect("cargo run --bin append_graph");
  (out.stdout, out.stderr, out.status.success())
}

#[test]
fn cli_writes_annotated_graph_to_stdout() {
  let graph = fixture("graph.json");
  let workloads = fixture("workloads.json");
  let telemetry = fixture("telemetry.json");
  let (stdout, stderr, success) = run_append_graph(&[
    "-n",
    "bookinfo",
    "--graph-type",
    "workload",
    "--workloads",
    workloads.to_str().expect("path"),
    "--telemetry",
    telemetry.to_str().expect("path"),
    graph.to_str().expect("path"),
  ]);
  assert!(success, "stderr={}", String::from_utf8_lossy(&stderr));

  let tm: TrafficMap = serde_json::from_slice(&stdout).expect("stdout is a traffic map");
  assert_eq!(tm.len(), 5);
  assert_eq!(edge_number(&tm, REVIEWS_SVC, REVIEWS_V1, THROUGHPUT), Some(3.0));
  assert_eq!(edge_number(&tm, PRODUCTPAGE, REVIEWS_SVC, THROUGHPUT), None);
}

#[test]
fn cli_writes_output_file() {
  let dir = tempfile::tempdir().unwrap();
  let output = dir.path().join("out").join("graph.json");
  let graph = fixture("graph.json");
  let workloads = fixture("workloads.json");
  let telemetry = fixture("telemetry.json");
  let (_, stderr, success) = run_append_graph(&[
    "-n",
    "bookinfo",
    "--graph-type",
    "workload",
    "--appenders",
    "deadNode,sidecarsCheck",
    "--workloads",
    workloads.to_str().expect("path"),
    "--telemetry",
    telemetry.to_str().expect("path"),
    "-o",
    output.to_str().expect("path"),
    graph.to_str().expect("path"),
  ]);
  assert!(success, "stderr={}", String::from_utf8_lossy(&stderr));

  let tm = load_traffic_map(&output).unwrap();
  assert!(tm.get(DETAILS_V1).unwrap().is_flagged(HAS_MISSING_SC));
  assert_eq!(edge_number(&tm, REVIEWS_SVC, REVIEWS_V1, THROUGHPUT), None);
}

#[test]
fn cli_rejects_unknown_appender() {
  let graph = fixture("graph.json");
  let (stdout, stderr, success) = run_append_graph(&[
    "-n",
    "bookinfo",
    "--appenders",
    "bogus",
    graph.to_str().expect("path"),
  ]);
  assert!(!success);
  assert!(stdout.is_empty());
  assert!(String::from_utf8_lossy(&stderr).contains("unknown appender: bogus"));
}

#[test]
fn cli_requires_namespace() {
  let graph = fixture("graph.json");
  let (_, stderr, success) = run_append_graph(&[graph.to_str().expect("path")]);
  assert!(!success);
  assert!(String::from_utf8_lossy(&stderr).contains("at least one namespace is required"));
}
