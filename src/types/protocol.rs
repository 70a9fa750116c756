//! Traffic protocols and the node rate metadata keys each one produces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A node rate metadata key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
  pub name: &'static str,
  /// Total inbound rate for the protocol.
  pub is_in: bool,
  /// Total outbound rate for the protocol.
  pub is_out: bool,
}

impl Rate {
  const fn new(name: &'static str, is_in: bool, is_out: bool) -> Self {
    Self {
      name,
      is_in,
      is_out,
    }
  }
}

const GRPC_RATES: &[Rate] = &[
  Rate::new("grpcIn", true, false),
  Rate::new("grpcInErr", false, false),
  Rate::new("grpcOut", false, true),
];

const HTTP_RATES: &[Rate] = &[
  Rate::new("httpIn", true, false),
  Rate::new("httpIn3xx", false, false),
  Rate::new("httpIn4xx", false, false),
  Rate::new("httpIn5xx", false, false),
  Rate::new("httpInNoResponse", false, false),
  Rate::new("httpOut", false, true),
];

const TCP_RATES: &[Rate] = &[Rate::new("tcpIn", true, false), Rate::new("tcpOut", false, true)];

/// Protocols for which node rates are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
  Grpc,
  Http,
  Tcp,
}

impl Protocol {
  pub const ALL: [Protocol; 3] = [Protocol::Grpc, Protocol::Http, Protocol::Tcp];

  pub fn node_rates(&self) -> &'static [Rate] {
    match self {
      Protocol::Grpc => GRPC_RATES,
      Protocol::Http => HTTP_RATES,
      Protocol::Tcp => TCP_RATES,
    }
  }

  /// Rates that count as traffic for liveness: the inbound and outbound totals.
  pub fn traffic_rates(self) -> impl Iterator<Item = &'static Rate> {
    self.node_rates().iter().filter(|r| r.is_in || r.is_out)
  }
}

impl fmt::Display for Protocol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Protocol::Grpc => write!(f, "grpc"),
      Protocol::Http => write!(f, "http"),
      Protocol::Tcp => write!(f, "tcp"),
    }
  }
}
