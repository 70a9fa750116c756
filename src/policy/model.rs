//! Request/response records of the policy handler service and the objects they map to.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use crate::config::PolicyConfig;

use super::object::{ConfigObject, ObjectMeta, POLICY_API_VERSION, ResourceKind, ResourcePermissions};

/// Label set on every object created through the handler service; listing filters on its key.
pub const WIZARD_LABEL: &str = "kiali_wizard";
pub const HANDLER_LABEL_VALUE: &str = "threescale-handler";
pub const INSTANCE_PREFIX: &str = "threescale-authorization-";
pub const AUTHORIZATION_TEMPLATE: &str = "threescale-authorization";

/// Name of the instance paired with handler `handler_name`.
pub fn instance_name(handler_name: &str) -> String {
  format!("{INSTANCE_PREFIX}{handler_name}")
}

/// Whether the authorization adapter is installed and what the caller may do with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyInfo {
  pub enabled: bool,
  pub permissions: ResourcePermissions,
}

/// An authorization handler as exchanged with callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerSpec {
  pub name: String,
  #[serde(default)]
  pub service_id: String,
  #[serde(default)]
  pub system_url: String,
  #[serde(default)]
  pub access_token: String,
}

fn wizard_labels(value: &str) -> BTreeMap<String, String> {
  BTreeMap::from([(WIZARD_LABEL.to_string(), value.to_string())])
}

impl HandlerSpec {
  /// The handler object for this spec.
  pub fn handler_object(&self, config: &PolicyConfig) -> ConfigObject {
    ConfigObject {
      api_version: POLICY_API_VERSION.to_string(),
      kind: ResourceKind::Handler,
      metadata: ObjectMeta {
        name: self.name.clone(),
        namespace: config.config_namespace.clone(),
        labels: wizard_labels(HANDLER_LABEL_VALUE),
      },
      spec: json!({
        "adapter": config.adapter_name,
        "params": {
          "service_id": self.service_id,
          "system_url": self.system_url,
          "access_token": self.access_token,
        },
        "connection": {
          "address": format!("{}:{}", config.adapter_service, config.adapter_port),
        },
      }),
    }
  }

  /// The authorization instance paired with this handler.
  pub fn instance_object(&self, config: &PolicyConfig) -> ConfigObject {
    ConfigObject {
      api_version: POLICY_API_VERSION.to_string(),
      kind: ResourceKind::Instance,
      metadata: ObjectMeta {
        name: instance_name(&self.name),
        namespace: config.config_namespace.clone(),
        labels: wizard_labels(HANDLER_LABEL_VALUE),
      },
      spec: json!({
        "template": AUTHORIZATION_TEMPLATE,
        "params": {
          "subject": {
            "user": r#"request.query_params["user_key"] | request.headers["User-Key"] | """#,
            "properties": {
              "app_id": r#"request.query_params["app_id"] | request.headers["App-Id"] | """#,
              "app_key": r#"request.query_params["app_key"] | request.headers["App-Key"] | """#,
            },
          },
          "action": {
            "path": "request.url_path",
            "method": r#"request.method | "get""#,
          },
        },
      }),
    }
  }

  /// Reads a handler back from its stored object. Missing params read as empty.
  pub fn from_object(object: &ConfigObject) -> Self {
    let param = |key: &str| {
      object.spec["params"][key]
        .as_str()
        .unwrap_or_default()
        .to_string()
    };
    Self {
      name: object.name().to_string(),
      service_id: param("service_id"),
      system_url: param("system_url"),
      access_token: param("access_token"),
    }
  }
}

/// Binds an authorization handler to a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRule {
  pub service_namespace: String,
  pub service_name: String,
  #[serde(default)]
  pub app_name: String,
  #[serde(default)]
  pub versions: Vec<String>,
  pub handler_name: String,
}

impl ServiceRule {
  pub fn rule_name(&self) -> String {
    format!("threescale-{}-{}", self.service_namespace, self.service_name)
  }

  /// Match expression selecting the rule's service, app and (when listed) versions.
  pub fn match_expression(&self, app_label: &str, version_label: &str) -> String {
    let mut expr = format!(
      r#"destination.service.namespace == "{}" && destination.service.name == "{}" && destination.labels["{app_label}"] == "{}""#,
      self.service_namespace, self.service_name, self.app_name
    );
    if !self.versions.is_empty() {
      let versions = self
        .versions
        .iter()
        .map(|v| format!(r#"destination.labels["{version_label}"] == "{v}""#))
        .collect::<Vec<_>>()
        .join(" || ");
      expr.push_str(&format!(" && ({versions})"));
    }
    expr
  }

  pub fn rule_object(&self, config: &PolicyConfig) -> ConfigObject {
    ConfigObject {
      api_version: POLICY_API_VERSION.to_string(),
      kind: ResourceKind::Rule,
      metadata: ObjectMeta {
        name: self.rule_name(),
        namespace: config.config_namespace.clone(),
        labels: wizard_labels(&format!("{}-{}", self.service_namespace, self.service_name)),
      },
      spec: json!({
        "match": self.match_expression(&config.app_label, &config.version_label),
        "actions": [{
          "handler": format!("{}.{}", self.handler_name, config.config_namespace),
          "instances": [instance_name(&self.handler_name)],
        }],
      }),
    }
  }
}
