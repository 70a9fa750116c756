//! CLI: Run the appender pipeline over a traffic map.
//!
//! Reads an assembled traffic map (JSON), runs the configured appenders for each namespace and
//! writes the finished map as JSON.
//!
//! Usage: `append_graph [OPTIONS] --namespace <NS> <path-to-graph>`
//! Example: append_graph -n bookinfo --workloads workloads.json --telemetry telemetry.json graph.json
//!
//! Set RUST_LOG=mesh_traffic_graph=trace for TRACE-level span enter/exit and events.

use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use mesh_traffic_graph::snapshot::{StaticWorkloadLookup, load_recorded_telemetry, load_workloads};
use mesh_traffic_graph::traffic_map_io::{load_traffic_map, save_traffic_map, write_traffic_map};
use mesh_traffic_graph::{
  GraphConfig, GraphType, PrometheusClient, TelemetryClient, WorkloadLookup, generate_graph, load_config,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Run the appender pipeline over a traffic map.
#[derive(Parser, Debug)]
#[command(name = "append_graph")]
#[command(
  after_help = r#"Environment variables (override the matching flags when set):
  MESHGRAPH_CONFIG           Configuration file (JSON).
  MESHGRAPH_NAMESPACES       Comma-separated namespaces to run the pipeline for.
  MESHGRAPH_APPENDERS        Comma-separated appender names (deadNode, responseTime,
                             securityPolicy, sidecarsCheck, throughput).
  MESHGRAPH_GRAPH_TYPE       app | versionedApp | workload | service
  MESHGRAPH_PROMETHEUS_URL   Prometheus base URL, used when --telemetry is not given.

Examples:
  append_graph -n bookinfo --workloads workloads.json --telemetry telemetry.json graph.json
  append_graph -n bookinfo -n reviews --prometheus-url http://localhost:9090 graph.json"#
)]
struct Args {
  /// Configuration file (JSON). Missing fields take their defaults.
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Namespace to run the pipeline for. Repeat for several; they run in the order given.
  #[arg(short, long = "namespace", value_name = "NS")]
  namespaces: Vec<String>,

  /// Appenders to run (comma-separated). Default: all.
  #[arg(long, value_name = "NAMES", value_delimiter = ',')]
  appenders: Option<Vec<String>>,

  /// Graph type: app, versionedApp, workload or service.
  #[arg(long, value_name = "TYPE")]
  graph_type: Option<String>,

  /// Workload inventory snapshot (JSON object: namespace -> workloads).
  #[arg(long, value_name = "FILE")]
  workloads: Option<PathBuf>,

  /// Recorded telemetry (JSON). When absent, Prometheus is queried.
  #[arg(long, value_name = "FILE")]
  telemetry: Option<PathBuf>,

  /// Prometheus base URL. Overrides the configuration file.
  #[arg(long, value_name = "URL")]
  prometheus_url: Option<String>,

  /// Output file. Default: stdout.
  #[arg(short, long, value_name = "FILE")]
  output: Option<PathBuf>,

  /// Traffic map to append to (JSON array of nodes).
  #[arg(value_name = "path-to-graph")]
  graph: PathBuf,
}

fn split_list(value: &str) -> Vec<String> {
  value
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .collect()
}

fn parse_graph_type(value: &str) -> Result<GraphType, String> {
  serde_json::from_value(serde_json::Value::String(value.to_string()))
    .map_err(|_| format!("unknown graph type '{value}'"))
}

fn fail(context: &str, error: impl std::fmt::Display) -> ! {
  eprintln!("{context}: {error}");
  process::exit(1);
}

/// Configuration from file, then flags, then environment.
fn resolve_config(args: &Args) -> GraphConfig {
  let config_path = env::var("MESHGRAPH_CONFIG")
    .ok()
    .map(PathBuf::from)
    .or_else(|| args.config.clone());
  let mut config = match &config_path {
    Some(path) => load_config(path).unwrap_or_else(|e| fail(&format!("Error loading {}", path.display()), e)),
    None => GraphConfig::default(),
  };

  let appenders = env::var("MESHGRAPH_APPENDERS")
    .ok()
    .map(|v| split_list(&v))
    .or_else(|| args.appenders.clone());
  if appenders.is_some() {
    config.appenders = appenders;
  }
  if let Some(graph_type) = env::var("MESHGRAPH_GRAPH_TYPE")
    .ok()
    .or_else(|| args.graph_type.clone())
  {
    config.graph_type = parse_graph_type(&graph_type).unwrap_or_else(|e| fail("Invalid option", e));
  }
  if let Some(url) = env::var("MESHGRAPH_PROMETHEUS_URL")
    .ok()
    .or_else(|| args.prometheus_url.clone())
  {
    config.prometheus_url = url;
  }
  if let Err(e) = config.validate() {
    fail("Invalid configuration", e);
  }
  config
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
    .with_writer(std::io::stderr)
    .init();

  info!("append_graph starting");
  let args = Args::parse();
  let config = resolve_config(&args);

  // Env vars override flags. These are the values used by the program (not read from env again).
  let namespaces = env::var("MESHGRAPH_NAMESPACES")
    .ok()
    .map(|v| split_list(&v))
    .unwrap_or_else(|| args.namespaces.clone());
  if namespaces.is_empty() {
    fail("Invalid option", "at least one namespace is required");
  }
  info!(namespaces = ?namespaces, graph_type = %config.graph_type, "options (env or flags)");

  let workloads: Arc<dyn WorkloadLookup> = match &args.workloads {
    Some(path) => Arc::new(
      load_workloads(path).unwrap_or_else(|e| fail(&format!("Error reading {}", path.display()), e)),
    ),
    None => Arc::new(StaticWorkloadLookup::default()),
  };
  let telemetry: Arc<dyn TelemetryClient> = match &args.telemetry {
    Some(path) => Arc::new(
      load_recorded_telemetry(path).unwrap_or_else(|e| fail(&format!("Error reading {}", path.display()), e)),
    ),
    None => Arc::new(
      PrometheusClient::new(&config.prometheus_url, config.query_timeout())
        .unwrap_or_else(|e| fail("Error creating Prometheus client", e)),
    ),
  };

  let traffic_map = load_traffic_map(&args.graph)
    .unwrap_or_else(|e| fail(&format!("Error reading {}", args.graph.display()), e));

  let result = match generate_graph(traffic_map, &config, workloads, telemetry, &namespaces).await {
    Ok(map) => map,
    Err(e) => fail("Pipeline error", e),
  };
  info!(nodes = result.len(), edges = result.edge_count(), "pipeline completed");

  let written = match &args.output {
    Some(path) => save_traffic_map(path, &result),
    None => write_traffic_map(std::io::stdout().lock(), &result),
  };
  if let Err(e) = written {
    fail("Error writing output", e);
  }
}
