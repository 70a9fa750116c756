//! Errors for the policy handler service.

/// Error reported by the config object client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
  #[error("{kind} '{name}' not found")]
  NotFound { kind: String, name: String },

  #[error("{kind} '{name}' already exists")]
  AlreadyExists { kind: String, name: String },

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("config API error: {0}")]
  Api(String),
}

impl ClientError {
  pub fn is_not_found(&self) -> bool {
    matches!(self, ClientError::NotFound { .. })
  }
}

/// Errors returned by [super::HandlerService].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
  /// The request body could not be decoded. Never worth retrying.
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Client(#[from] ClientError),

  /// One or both halves of a paired handler/instance mutation failed. The half that succeeded is
  /// left in place.
  #[error("paired mutation failed (handler: {}, instance: {})", describe(.handler), describe(.instance))]
  PairedMutation {
    handler: Option<ClientError>,
    instance: Option<ClientError>,
  },
}

fn describe(error: &Option<ClientError>) -> String {
  match error {
    Some(e) => e.to_string(),
    None => "ok".to_string(),
  }
}

impl PolicyError {
  /// For a paired failure, the handler error when there is one, otherwise the instance error.
  pub fn handler_first(&self) -> Option<&ClientError> {
    match self {
      PolicyError::PairedMutation { handler, instance } => handler.as_ref().or(instance.as_ref()),
      PolicyError::Client(e) => Some(e),
      PolicyError::BadRequest(_) => None,
    }
  }
}
