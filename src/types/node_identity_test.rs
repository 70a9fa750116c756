//! Tests for `NodeIdentity::resolve`.

use super::{GraphType, NodeIdentity, NodeType, UNKNOWN};

fn productpage_v1() -> NodeIdentity {
  NodeIdentity::workload("east", "bookinfo", "productpage-v1", "productpage", "v1")
}

#[test]
fn versioned_app_graph_uses_app_and_version() {
  let (id, nt) = productpage_v1().resolve(GraphType::VersionedApp).unwrap();
  assert_eq!(id, "vapp_east_bookinfo_productpage_v1");
  assert_eq!(nt, NodeType::VersionedApp);
}

#[test]
fn app_graph_drops_version() {
  let (id, nt) = productpage_v1().resolve(GraphType::App).unwrap();
  assert_eq!(id, "app_east_bookinfo_productpage");
  assert_eq!(nt, NodeType::App);
}

#[test]
fn workload_and_service_graphs_use_workload() {
  for gt in [GraphType::Workload, GraphType::Service] {
    let (id, nt) = productpage_v1().resolve(gt).unwrap();
    assert_eq!(id, "wl_east_bookinfo_productpage-v1");
    assert_eq!(nt, NodeType::Workload);
  }
}

#[test]
fn versioned_app_without_version_is_app_node() {
  let ident = NodeIdentity::workload("", "istio-system", "ingressgateway-unknown", "ingressgateway", UNKNOWN);
  let (id, nt) = ident.resolve(GraphType::VersionedApp).unwrap();
  assert_eq!(id, "app_unknown_istio-system_ingressgateway");
  assert_eq!(nt, NodeType::App);
}

#[test]
fn app_graph_falls_back_to_workload_without_app() {
  let ident = NodeIdentity::workload("east", "bookinfo", "legacy", "", "");
  let (id, nt) = ident.resolve(GraphType::App).unwrap();
  assert_eq!(id, "wl_east_bookinfo_legacy");
  assert_eq!(nt, NodeType::Workload);
}

#[test]
fn service_identity_is_service_node() {
  let (id, nt) = NodeIdentity::service("east", "bookinfo", "reviews")
    .resolve(GraphType::VersionedApp)
    .unwrap();
  assert_eq!(id, "svc_east_bookinfo_reviews");
  assert_eq!(nt, NodeType::Service);
}

#[test]
fn service_graph_prefers_workload_when_present() {
  let mut ident = productpage_v1();
  ident.service = "productpage".to_string();
  ident.service_namespace = "bookinfo".to_string();
  let (_, nt) = ident.resolve(GraphType::Service).unwrap();
  assert_eq!(nt, NodeType::Workload);
  let (_, nt) = ident.resolve(GraphType::VersionedApp).unwrap();
  assert_eq!(nt, NodeType::VersionedApp);
}

#[test]
fn unknown_source() {
  let mut ident = NodeIdentity::workload("east", UNKNOWN, UNKNOWN, UNKNOWN, UNKNOWN);
  ident.service_namespace = UNKNOWN.to_string();
  let (id, nt) = ident.resolve(GraphType::Workload).unwrap();
  assert_eq!(id, "east_unknown");
  assert_eq!(nt, NodeType::Unknown);
}

#[test]
fn unknown_destination_service() {
  let ident = NodeIdentity {
    cluster: "east".to_string(),
    service_namespace: "bookinfo".to_string(),
    service: UNKNOWN.to_string(),
    workload_namespace: UNKNOWN.to_string(),
    workload: UNKNOWN.to_string(),
    app: UNKNOWN.to_string(),
    version: UNKNOWN.to_string(),
  };
  let (id, nt) = ident.resolve(GraphType::App).unwrap();
  assert_eq!(id, "svc_east_bookinfo_unknown");
  assert_eq!(nt, NodeType::Service);
}

#[test]
fn nothing_known_is_an_error() {
  let ident = NodeIdentity::workload("east", "bookinfo", "", UNKNOWN, "v1");
  let err = ident.resolve(GraphType::VersionedApp).unwrap_err();
  assert!(err.to_string().contains("bookinfo"));
}

#[test]
fn resolve_is_deterministic() {
  let a = productpage_v1().resolve(GraphType::VersionedApp).unwrap();
  let b = productpage_v1().resolve(GraphType::VersionedApp).unwrap();
  assert_eq!(a, b);
}
