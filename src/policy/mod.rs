//! Authorization policy handlers for mesh services.
//!
//! A handler is stored as two configuration objects, the handler itself and an authorization
//! instance named after it, in the mesh configuration namespace. Storage goes through an
//! injected [ConfigObjectClient].

mod error;
mod model;
mod object;
mod service;

pub use error::{ClientError, PolicyError};
pub use model::{HandlerSpec, PolicyInfo, ServiceRule, WIZARD_LABEL, instance_name};
pub use object::{
  ConfigObject, ConfigObjectClient, ObjectMeta, POLICY_API_VERSION, ResourceKind, ResourcePermissions,
};
pub use service::HandlerService;
