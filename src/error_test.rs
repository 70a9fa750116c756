//! Tests for `GraphError`.

use crate::error::GraphError;
use std::time::Duration;

#[test]
fn in_appender_wraps_once() {
  let err = GraphError::WorkloadLookup {
    namespace: "bookinfo".to_string(),
    message: "forbidden".to_string(),
  }
  .in_appender("deadNode")
  .in_appender("throughput");
  match &err {
    GraphError::Appender { appender, .. } => assert_eq!(*appender, "deadNode"),
    other => panic!("unexpected {other:?}"),
  }
  assert!(matches!(err.root(), GraphError::WorkloadLookup { .. }));
  assert!(err.to_string().contains("deadNode"));
  assert!(err.to_string().contains("forbidden"));
}

#[test]
fn timeout_message_has_seconds() {
  let err = GraphError::Timeout {
    operation: "telemetry query".to_string(),
    timeout: Duration::from_secs(30),
  };
  assert_eq!(err.to_string(), "telemetry query timed out after 30s");
}
