//! edgesync core library: domain types, config persistence, errors.
//!
//! - [`types`]: newtypes, artifact specs, validated artifacts, [`Config`]
//! - [`error`]: [`ConfigError`]
//! - [`config`]: load / save / init

pub mod config;
pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{
    Artifact, ArtifactKind, Condition, ConditionSpec, Config, EdgeLogic, HttpMethod,
    MaintenanceConfig, RequestSetting, ResponseObject, ServiceId, ServiceVersion, SettingSpec,
    VclSnippet, VclSpec, WebhookConfig,
};
