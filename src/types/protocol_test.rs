//! Tests for `Protocol`.

use super::Protocol;

#[test]
fn traffic_rates_are_in_and_out_totals() {
  let names: Vec<&str> = Protocol::Http.traffic_rates().map(|r| r.name).collect();
  assert_eq!(names, vec!["httpIn", "httpOut"]);
  let names: Vec<&str> = Protocol::Tcp.traffic_rates().map(|r| r.name).collect();
  assert_eq!(names, vec!["tcpIn", "tcpOut"]);
}

#[test]
fn error_rates_are_not_traffic() {
  assert!(
    Protocol::Grpc
      .traffic_rates()
      .all(|r| r.name != "grpcInErr")
  );
  assert!(
    Protocol::Grpc
      .node_rates()
      .iter()
      .any(|r| r.name == "grpcInErr")
  );
}

#[test]
fn serde_lowercase() {
  let p: Protocol = serde_json::from_str("\"http\"").unwrap();
  assert_eq!(p, Protocol::Http);
  assert_eq!(Protocol::Grpc.to_string(), "grpc");
}
