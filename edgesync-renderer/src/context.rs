//! Template context: values exposed to every VCL template.

use serde::{Deserialize, Serialize};

use edgesync_core::types::Config;

use crate::error::RenderError;

/// Flat rendering payload built from [`Config`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VclContext {
    pub service_id: String,
    pub snippet_prefix: String,
    /// Header the maintenance `deliver` snippet sets before restarting.
    pub maintenance_header: String,
    pub maintenance_condition: String,
    pub maintenance_response_object: String,
}

impl VclContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            service_id: config.service_id.0.clone(),
            snippet_prefix: config.snippet_prefix.clone(),
            maintenance_header: config.maintenance.trigger_header.clone(),
            maintenance_condition: config.maintenance.condition_name.clone(),
            maintenance_response_object: config.maintenance.response_object_name.clone(),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgesync_core::types::ServiceId;

    #[test]
    fn context_mirrors_config() {
        let mut cfg = Config::new(ServiceId::from("svc"), "key");
        cfg.snippet_prefix = "site".into();
        let ctx = VclContext::from_config(&cfg);
        assert_eq!(ctx.service_id, "svc");
        assert_eq!(ctx.snippet_prefix, "site");
        assert_eq!(ctx.maintenance_header, "X-Maintenance-Page");
    }

    #[test]
    fn tera_context_exposes_fields() {
        let ctx = VclContext::from_config(&Config::new(ServiceId::from("svc"), "key"));
        let tera_ctx = ctx.to_tera_context().unwrap();
        assert!(tera_ctx.contains_key("snippet_prefix"));
        assert!(tera_ctx.contains_key("maintenance_condition"));
    }
}
