//! Domain types for edge-logic synchronization.
//!
//! Two layers live here:
//! - *specs* ([`VclSpec`], [`ConditionSpec`], [`SettingSpec`]) mirror what a
//!   user writes in `config.yaml` and may be incomplete;
//! - *artifacts* ([`Artifact`] and its variants) are validated values that can
//!   be sent to the provider as form fields.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Priority assigned to VCL snippets that do not set one explicitly.
pub const DEFAULT_SNIPPET_PRIORITY: u32 = 100;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed CDN service identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(pub String);

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ServiceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ServiceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// HTTP methods used against the versioned configuration API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }

    /// `true` for methods that carry a form-encoded body.
    pub fn has_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four kinds of edge-logic artifact a service version holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    VclSnippet,
    Condition,
    ResponseObject,
    RequestSetting,
}

impl ArtifactKind {
    /// URL path segment of the kind's collection under a version.
    pub fn path_segment(&self) -> &'static str {
        match self {
            ArtifactKind::VclSnippet => "snippet",
            ArtifactKind::Condition => "condition",
            ArtifactKind::ResponseObject => "response_object",
            ArtifactKind::RequestSetting => "request_settings",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::VclSnippet => write!(f, "VCL snippet"),
            ArtifactKind::Condition => write!(f, "condition"),
            ArtifactKind::ResponseObject => write!(f, "response object"),
            ArtifactKind::RequestSetting => write!(f, "request setting"),
        }
    }
}

// ---------------------------------------------------------------------------
// Remote records
// ---------------------------------------------------------------------------

/// One entry of the service's version list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceVersion {
    pub number: u32,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

// ---------------------------------------------------------------------------
// Specs (user-facing, possibly incomplete)
// ---------------------------------------------------------------------------

/// A VCL snippet request: content comes from the template `(directory, type)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VclSpec {
    /// Template set the snippet content is read from.
    pub directory: String,
    /// VCL subroutine the snippet hooks into (`recv`, `deliver`, ...).
    #[serde(rename = "type")]
    pub snippet_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<bool>,
}

impl VclSpec {
    pub fn new(directory: impl Into<String>, snippet_type: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            snippet_type: snippet_type.into(),
            priority: None,
            dynamic: None,
        }
    }

    /// Remote snippet name: `<prefix>_<type>`.
    pub fn snippet_name(&self, prefix: &str) -> String {
        format!("{prefix}_{}", self.snippet_type)
    }

    /// Build the snippet from rendered template content.
    pub fn into_snippet(&self, prefix: &str, content: String) -> VclSnippet {
        VclSnippet {
            name: self.snippet_name(prefix),
            snippet_type: self.snippet_type.clone(),
            content,
            priority: self.priority.unwrap_or(DEFAULT_SNIPPET_PRIORITY),
            dynamic: self.dynamic.unwrap_or(false),
        }
    }
}

/// A request condition as written in config. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConditionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub condition_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

impl ConditionSpec {
    /// Check that all fields are present and build a [`Condition`].
    pub fn validate(&self) -> Result<Condition, ConfigError> {
        let kind = ArtifactKind::Condition;
        let name = required(kind, "<unnamed>", "name", self.name.as_deref())?;
        let statement = required(kind, &name, "statement", self.statement.as_deref())?;
        let condition_type = required(kind, &name, "type", self.condition_type.as_deref())?;
        let priority = self.priority.ok_or_else(|| ConfigError::MissingField {
            kind,
            name: name.clone(),
            field: "priority",
        })?;
        Ok(Condition {
            name,
            statement,
            condition_type,
            priority,
        })
    }
}

/// A request setting as written in config. `name` and `action` are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SettingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_ssl: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_host: Option<String>,
}

impl SettingSpec {
    /// Check required fields and build a [`RequestSetting`].
    pub fn validate(&self) -> Result<RequestSetting, ConfigError> {
        let kind = ArtifactKind::RequestSetting;
        let name = required(kind, "<unnamed>", "name", self.name.as_deref())?;
        let action = required(kind, &name, "action", self.action.as_deref())?;
        Ok(RequestSetting {
            name,
            action,
            request_condition: self.request_condition.clone(),
            xff: self.xff.clone(),
            force_ssl: self.force_ssl,
            default_host: self.default_host.clone(),
        })
    }
}

fn required(
    kind: ArtifactKind,
    name: &str,
    field: &'static str,
    value: Option<&str>,
) -> Result<String, ConfigError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::MissingField {
            kind,
            name: name.to_string(),
            field,
        }),
    }
}

/// The full desired edge-logic payload for one `execute` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EdgeLogic {
    #[serde(default)]
    pub vcl: Vec<VclSpec>,
    #[serde(default)]
    pub conditions: Vec<ConditionSpec>,
    #[serde(default)]
    pub settings: Vec<SettingSpec>,
}

impl EdgeLogic {
    /// `true` when there is nothing to upload.
    pub fn is_empty(&self) -> bool {
        self.vcl.is_empty() && self.conditions.is_empty() && self.settings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Artifacts (validated)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VclSnippet {
    pub name: String,
    pub snippet_type: String,
    pub content: String,
    pub priority: u32,
    pub dynamic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub name: String,
    pub statement: String,
    pub condition_type: String,
    pub priority: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseObject {
    pub name: String,
    pub status: u16,
    pub response: String,
    pub content: String,
    pub content_type: String,
    pub request_condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSetting {
    pub name: String,
    pub action: String,
    pub request_condition: Option<String>,
    pub xff: Option<String>,
    pub force_ssl: Option<bool>,
    pub default_host: Option<String>,
}

/// One configuration unit tracked by name within a service version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    VclSnippet(VclSnippet),
    Condition(Condition),
    ResponseObject(ResponseObject),
    RequestSetting(RequestSetting),
}

impl Artifact {
    pub fn name(&self) -> &str {
        match self {
            Artifact::VclSnippet(a) => &a.name,
            Artifact::Condition(a) => &a.name,
            Artifact::ResponseObject(a) => &a.name,
            Artifact::RequestSetting(a) => &a.name,
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::VclSnippet(_) => ArtifactKind::VclSnippet,
            Artifact::Condition(_) => ArtifactKind::Condition,
            Artifact::ResponseObject(_) => ArtifactKind::ResponseObject,
            Artifact::RequestSetting(_) => ArtifactKind::RequestSetting,
        }
    }

    /// Form fields sent on insert and update. Optional fields are omitted when unset.
    pub fn form_fields(&self) -> BTreeMap<String, String> {
        let mut f = BTreeMap::new();
        let mut put = |k: &str, v: String| {
            f.insert(k.to_string(), v);
        };
        match self {
            Artifact::VclSnippet(s) => {
                put("name", s.name.clone());
                put("type", s.snippet_type.clone());
                put("content", s.content.clone());
                put("priority", s.priority.to_string());
                put("dynamic", bool_flag(s.dynamic));
            }
            Artifact::Condition(c) => {
                put("name", c.name.clone());
                put("statement", c.statement.clone());
                put("type", c.condition_type.clone());
                put("priority", c.priority.to_string());
            }
            Artifact::ResponseObject(r) => {
                put("name", r.name.clone());
                put("status", r.status.to_string());
                put("response", r.response.clone());
                put("content", r.content.clone());
                put("content_type", r.content_type.clone());
                if let Some(cond) = &r.request_condition {
                    put("request_condition", cond.clone());
                }
            }
            Artifact::RequestSetting(s) => {
                put("name", s.name.clone());
                put("action", s.action.clone());
                if let Some(cond) = &s.request_condition {
                    put("request_condition", cond.clone());
                }
                if let Some(xff) = &s.xff {
                    put("xff", xff.clone());
                }
                if let Some(force_ssl) = s.force_ssl {
                    put("force_ssl", bool_flag(force_ssl));
                }
                if let Some(host) = &s.default_host {
                    put("default_host", host.clone());
                }
            }
        }
        f
    }
}

fn bool_flag(b: bool) -> String {
    if b { "1" } else { "0" }.to_string()
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn default_api_base_url() -> String {
    "https://api.fastly.com".to_string()
}

fn default_auth_header() -> String {
    "Fastly-Key".to_string()
}

fn default_snippet_prefix() -> String {
    "drupalmodule".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Outcome notifications go to this webhook when enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Names and content used by the maintenance-page upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub condition_name: String,
    /// Request header the deliver snippet sets before restarting.
    pub trigger_header: String,
    pub condition_priority: u32,
    pub response_object_name: String,
    pub status: u16,
    pub response: String,
    pub content_type: String,
    /// Template set holding the maintenance `deliver` snippet.
    pub vcl_directory: String,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            condition_name: "maintenance_page_condition".to_string(),
            trigger_header: "X-Maintenance-Page".to_string(),
            condition_priority: 10,
            response_object_name: "maintenance_page_response".to_string(),
            status: 503,
            response: "Service Unavailable".to_string(),
            content_type: "text/html".to_string(),
            vcl_directory: "maintenance".to_string(),
        }
    }
}

impl MaintenanceConfig {
    /// The request condition that routes a restarted request to the page.
    pub fn condition(&self) -> Condition {
        Condition {
            name: self.condition_name.clone(),
            statement: format!("req.http.{} == \"1\"", self.trigger_header),
            condition_type: "REQUEST".to_string(),
            priority: self.condition_priority,
        }
    }

    /// The synthetic response object carrying `html`.
    pub fn response_object(&self, html: &str) -> ResponseObject {
        ResponseObject {
            name: self.response_object_name.clone(),
            status: self.status,
            response: self.response.clone(),
            content: html.to_string(),
            content_type: self.content_type.clone(),
            request_condition: Some(self.condition_name.clone()),
        }
    }
}

/// Root of `~/.edgesync/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub service_id: ServiceId,
    pub api_key: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_auth_header")]
    pub auth_header: String,
    #[serde(default = "default_snippet_prefix")]
    pub snippet_prefix: String,
    /// Directory of user `.vcl.tera` templates that override the embedded sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookConfig>,
    #[serde(default)]
    pub edge_logic: EdgeLogic,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Config {
    /// A config with defaults for everything but the credentials.
    pub fn new(service_id: ServiceId, api_key: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            service_id,
            api_key: api_key.into(),
            api_base_url: default_api_base_url(),
            auth_header: default_auth_header(),
            snippet_prefix: default_snippet_prefix(),
            template_dir: None,
            timeout_secs: default_timeout_secs(),
            webhook: None,
            edge_logic: EdgeLogic::default(),
            maintenance: MaintenanceConfig::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Reject configs that cannot address the API at all.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_id.0.trim().is_empty() {
            return Err(ConfigError::Invalid("service_id must not be empty".into()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("api_key must not be empty".into()));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                self.api_base_url
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
