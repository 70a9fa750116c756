//! Prometheus HTTP API adapter for [TelemetryClient].
//!
//! Issues instant queries against `/api/v1/query` and converts the returned vector into
//! [TelemetrySample]s. Non-vector results and NaN samples are rejected or dropped here so the
//! appenders only ever see finite values.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{instrument, trace};

use crate::error::GraphError;
use crate::types::TelemetrySample;
use crate::upstream::{TelemetryClient, TelemetryQuery};

const QUERY_PATH: &str = "/api/v1/query";

#[derive(Debug, Deserialize)]
struct QueryResponse {
  status: String,
  #[serde(default)]
  data: Option<QueryData>,
  #[serde(default, rename = "errorType")]
  error_type: Option<String>,
  #[serde(default)]
  error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryData {
  result_type: String,
  #[serde(default)]
  result: Vec<VectorEntry>,
}

#[derive(Debug, Deserialize)]
struct VectorEntry {
  #[serde(default)]
  metric: BTreeMap<String, String>,
  /// `[unix seconds, "value"]`
  value: (f64, String),
}

/// Parses an instant-query response body into samples.
pub fn parse_vector_response(namespace: &str, body: &[u8]) -> Result<Vec<TelemetrySample>, GraphError> {
  let telemetry_error = |message: String| GraphError::Telemetry {
    namespace: namespace.to_string(),
    message,
  };
  let response: QueryResponse = serde_json::from_slice(body)
    .map_err(|e| telemetry_error(format!("invalid response body: {e}")))?;
  if response.status != "success" {
    return Err(telemetry_error(format!(
      "{}: {}",
      response.error_type.unwrap_or_else(|| response.status.clone()),
      response.error.unwrap_or_default()
    )));
  }
  let data = response
    .data
    .ok_or_else(|| telemetry_error("response has no data".to_string()))?;
  if data.result_type != "vector" {
    return Err(telemetry_error(format!(
      "expected a vector result, got {}",
      data.result_type
    )));
  }

  let mut samples = Vec::with_capacity(data.result.len());
  for entry in data.result {
    let value: f64 = entry
      .value
      .1
      .parse()
      .map_err(|e| telemetry_error(format!("invalid sample value '{}': {e}", entry.value.1)))?;
    if value.is_nan() {
      continue;
    }
    samples.push(TelemetrySample {
      labels: entry.metric,
      value,
    });
  }
  Ok(samples)
}

/// Telemetry client backed by a Prometheus server.
#[derive(Debug, Clone)]
pub struct PrometheusClient {
  base_url: String,
  http: reqwest::Client,
}

impl PrometheusClient {
  /// Client for the server at `base_url`; `timeout` bounds each HTTP request.
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GraphError> {
    let http = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| GraphError::Config(format!("cannot build HTTP client: {e}")))?;
    Ok(Self {
      base_url: base_url.into().trim_end_matches('/').to_string(),
      http,
    })
  }

  /// Full request URL for `query`.
  pub fn query_url(&self, query: &TelemetryQuery) -> Result<String, GraphError> {
    let time = query.time.timestamp().to_string();
    let expression = query.expression();
    let params = [("query", expression.as_str()), ("time", time.as_str())];
    let encoded = serde_urlencoded::to_string(params).map_err(|e| GraphError::Telemetry {
      namespace: query.namespace.clone(),
      message: format!("cannot encode query: {e}"),
    })?;
    Ok(format!("{}{QUERY_PATH}?{encoded}", self.base_url))
  }
}

#[async_trait]
impl TelemetryClient for PrometheusClient {
  #[instrument(level = "trace", skip(self, query), fields(namespace = %query.namespace))]
  async fn query(&self, query: &TelemetryQuery) -> Result<Vec<TelemetrySample>, GraphError> {
    let url = self.query_url(query)?;
    trace!(expression = %query.expression(), "prometheus query");
    let telemetry_error = |message: String| GraphError::Telemetry {
      namespace: query.namespace.clone(),
      message,
    };
    let response = self
      .http
      .get(&url)
      .send()
      .await
      .map_err(|e| telemetry_error(e.to_string()))?;
    let status = response.status();
    let body = response
      .bytes()
      .await
      .map_err(|e| telemetry_error(e.to_string()))?;
    // error responses carry a JSON error body; parse it for the message
    let samples = parse_vector_response(&query.namespace, &body);
    if !status.is_success() {
      return Err(match samples {
        Err(e) => e,
        Ok(_) => telemetry_error(format!("HTTP {status}")),
      });
    }
    samples
  }
}
