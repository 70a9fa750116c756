//! Traffic map save/load (JSON).

use crate::error::GraphError;
use crate::types::TrafficMap;
use std::io::Write;
use std::path::Path;
use tracing::instrument;

/// Saves a traffic map to `path` as pretty JSON, creating parent directories.
#[instrument(level = "trace", skip(path, traffic_map))]
pub fn save_traffic_map(path: &Path, traffic_map: &TrafficMap) -> Result<(), GraphError> {
  let json = serde_json::to_string_pretty(traffic_map)?;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)?;
  Ok(())
}

/// Loads a traffic map from `path`. Fails on invalid JSON, duplicate node ids or edges to
/// missing nodes.
#[instrument(level = "trace", skip(path))]
pub fn load_traffic_map(path: &Path) -> Result<TrafficMap, GraphError> {
  let bytes = std::fs::read(path)?;
  Ok(serde_json::from_slice(&bytes)?)
}

/// Writes a traffic map as pretty JSON followed by a newline.
pub fn write_traffic_map<W: Write>(mut writer: W, traffic_map: &TrafficMap) -> Result<(), GraphError> {
  serde_json::to_writer_pretty(&mut writer, traffic_map)?;
  writeln!(writer)?;
  Ok(())
}
