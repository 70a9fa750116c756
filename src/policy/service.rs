//! Authorization handler service: manages handler + instance pairs and the rules binding them to
//! services.

use std::sync::Arc;
use tracing::{instrument, warn};

use crate::config::PolicyConfig;

use super::error::PolicyError;
use super::model::{HandlerSpec, PolicyInfo, ServiceRule, WIZARD_LABEL, instance_name};
use super::object::{ConfigObjectClient, ResourceKind};

/// Handler service over an injected config object client.
pub struct HandlerService {
  client: Arc<dyn ConfigObjectClient>,
  config: PolicyConfig,
}

impl HandlerService {
  pub fn new(client: Arc<dyn ConfigObjectClient>, config: PolicyConfig) -> Self {
    Self { client, config }
  }

  fn namespace(&self) -> &str {
    &self.config.config_namespace
  }

  /// Adapter presence and permissions. A missing adapter means the feature is disabled.
  #[instrument(level = "trace", skip(self))]
  pub async fn info(&self) -> Result<PolicyInfo, PolicyError> {
    match self
      .client
      .get(ResourceKind::Adapter, self.namespace(), &self.config.adapter_name)
      .await
    {
      Ok(_) => {}
      Err(e) if e.is_not_found() => return Ok(PolicyInfo::default()),
      Err(e) => return Err(e.into()),
    }
    let permissions = match self
      .client
      .permissions(ResourceKind::Adapter, self.namespace())
      .await
    {
      Ok(p) => p,
      Err(e) => {
        warn!(error = %e, "cannot read adapter permissions, assuming none");
        Default::default()
      }
    };
    Ok(PolicyInfo {
      enabled: true,
      permissions,
    })
  }

  /// Handlers created through this service.
  #[instrument(level = "trace", skip(self))]
  pub async fn list_handlers(&self) -> Result<Vec<HandlerSpec>, PolicyError> {
    let objects = self
      .client
      .list(ResourceKind::Handler, self.namespace(), WIZARD_LABEL)
      .await?;
    Ok(objects.iter().map(HandlerSpec::from_object).collect())
  }

  /// Creates the handler and its instance concurrently. Both outcomes are awaited; if either
  /// failed the error carries both, and nothing is rolled back.
  #[instrument(level = "trace", skip(self, body))]
  pub async fn create_handler(&self, body: &[u8]) -> Result<Vec<HandlerSpec>, PolicyError> {
    let spec = parse_handler(body)?;
    if spec.name.is_empty() {
      return Err(PolicyError::BadRequest("handler name is required".to_string()));
    }
    let handler = spec.handler_object(&self.config);
    let instance = spec.instance_object(&self.config);

    let (handler_result, instance_result) = tokio::join!(
      self.client.create(self.namespace(), &handler),
      self.client.create(self.namespace(), &instance),
    );
    if handler_result.is_err() || instance_result.is_err() {
      let error = PolicyError::PairedMutation {
        handler: handler_result.err(),
        instance: instance_result.err(),
      };
      warn!(handler = %spec.name, error = %error, "handler creation incomplete");
      return Err(error);
    }
    self.list_handlers().await
  }

  /// Replaces the handler `name`. The name from the path wins over the body; the paired
  /// instance is not touched.
  #[instrument(level = "trace", skip(self, body))]
  pub async fn update_handler(&self, name: &str, body: &[u8]) -> Result<Vec<HandlerSpec>, PolicyError> {
    let mut spec = parse_handler(body)?;
    spec.name = name.to_string();
    let handler = spec.handler_object(&self.config);
    self.client.update(self.namespace(), name, &handler).await?;
    self.list_handlers().await
  }

  /// Deletes the handler, then its instance. Stops at the first failure.
  #[instrument(level = "trace", skip(self))]
  pub async fn delete_handler(&self, name: &str) -> Result<Vec<HandlerSpec>, PolicyError> {
    self
      .client
      .delete(ResourceKind::Handler, self.namespace(), name)
      .await?;
    self
      .client
      .delete(ResourceKind::Instance, self.namespace(), &instance_name(name))
      .await?;
    self.list_handlers().await
  }

  /// Binds a handler to the service named in the body.
  #[instrument(level = "trace", skip(self, body))]
  pub async fn create_rule(&self, body: &[u8]) -> Result<ServiceRule, PolicyError> {
    let rule = parse_rule(body)?;
    self
      .client
      .create(self.namespace(), &rule.rule_object(&self.config))
      .await?;
    Ok(rule)
  }

  /// Replaces the rule of `namespace/service`; the path wins over the body.
  #[instrument(level = "trace", skip(self, body))]
  pub async fn update_rule(
    &self,
    namespace: &str,
    service: &str,
    body: &[u8],
  ) -> Result<ServiceRule, PolicyError> {
    let mut rule = parse_rule(body)?;
    rule.service_namespace = namespace.to_string();
    rule.service_name = service.to_string();
    self
      .client
      .update(self.namespace(), &rule.rule_name(), &rule.rule_object(&self.config))
      .await?;
    Ok(rule)
  }

  #[instrument(level = "trace", skip(self))]
  pub async fn delete_rule(&self, namespace: &str, service: &str) -> Result<(), PolicyError> {
    let rule = ServiceRule {
      service_namespace: namespace.to_string(),
      service_name: service.to_string(),
      ..ServiceRule::default()
    };
    self
      .client
      .delete(ResourceKind::Rule, self.namespace(), &rule.rule_name())
      .await
      .map_err(PolicyError::from)
  }
}

fn parse_handler(body: &[u8]) -> Result<HandlerSpec, PolicyError> {
  serde_json::from_slice(body).map_err(|e| PolicyError::BadRequest(format!("bad handler json: {e}")))
}

fn parse_rule(body: &[u8]) -> Result<ServiceRule, PolicyError> {
  serde_json::from_slice(body).map_err(|e| PolicyError::BadRequest(format!("bad rule json: {e}")))
}
