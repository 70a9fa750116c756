//! Tests for `traffic_map_io`.

use crate::error::GraphError;
use crate::traffic_map_io::{load_traffic_map, save_traffic_map, write_traffic_map};
use crate::types::metadata::THROUGHPUT;
use crate::types::{GraphType, Node, NodeIdentity, TrafficMap};

fn sample_map() -> TrafficMap {
  let mut tm = TrafficMap::new();
  for name in ["b", "a"] {
    tm.add_node(
      Node::new(
        &NodeIdentity::workload("east", "bookinfo", name, name, "v1"),
        GraphType::Workload,
      )
      .unwrap(),
    );
  }
  tm.add_edge("wl_east_bookinfo_a", "wl_east_bookinfo_b")
    .unwrap()
    .set_metadata(THROUGHPUT, 0.25);
  tm
}

#[test]
fn save_then_load() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("out").join("graph.json");
  let tm = sample_map();
  save_traffic_map(&path, &tm).unwrap();
  assert_eq!(load_traffic_map(&path).unwrap(), tm);
}

#[test]
fn output_lists_nodes_by_id() {
  let mut buf = Vec::new();
  write_traffic_map(&mut buf, &sample_map()).unwrap();
  let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
  let ids: Vec<&str> = json
    .as_array()
    .unwrap()
    .iter()
    .map(|n| n["id"].as_str().unwrap())
    .collect();
  assert_eq!(ids, vec!["wl_east_bookinfo_a", "wl_east_bookinfo_b"]);
  assert_eq!(json[0]["edges"][0]["metadata"]["throughput"], 0.25);
  assert_eq!(json[0]["nodeType"], "workload");
}

#[test]
fn load_rejects_dangling_edge() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("graph.json");
  std::fs::write(
    &path,
    r#"[{"id":"a","nodeType":"workload","edges":[{"dest":"missing"}]}]"#,
  )
  .unwrap();
  assert!(matches!(load_traffic_map(&path), Err(GraphError::Json(_))));
}

#[test]
fn load_missing_file_is_io_error() {
  let dir = tempfile::tempdir().unwrap();
  assert!(matches!(
    load_traffic_map(&dir.path().join("nope.json")),
    Err(GraphError::Io(_))
  ));
}
