//! `edgesync init --service-id <id> --api-key <key>`

use anyhow::{Context, Result};
use clap::Args;

use edgesync_core::{config, types::ServiceId};

/// Write the config file for a service.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Service identifier from the provider's dashboard.
    #[arg(long)]
    pub service_id: String,

    /// API token sent with every request.
    #[arg(long)]
    pub api_key: String,

    /// API host (defaults to https://api.fastly.com).
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Prefix for snippet names (defaults to "drupalmodule").
    #[arg(long)]
    pub snippet_prefix: Option<String>,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home()?;
        let path = config::config_path_at(&home);

        if path.exists() {
            let existing = config::load_at(&home)
                .with_context(|| format!("existing config at {} is unusable", path.display()))?;
            println!(
                "✓ Already initialized for service '{}'",
                existing.service_id
            );
            println!("  Config: {}", path.display());
            return Ok(());
        }

        let service_id = self.service_id.clone();
        config::init_at(&home, ServiceId::from(self.service_id), &self.api_key)
            .with_context(|| format!("failed to init config for service '{service_id}'"))?;

        if self.api_base_url.is_some() || self.snippet_prefix.is_some() {
            config::update_at(&home, |cfg| {
                if let Some(url) = self.api_base_url {
                    cfg.api_base_url = url;
                }
                if let Some(prefix) = self.snippet_prefix {
                    cfg.snippet_prefix = prefix;
                }
            })
            .context("failed to apply init options")?;
        }

        println!("✓ Initialized edgesync for service '{service_id}'");
        println!("  Saved to: {}", path.display());
        Ok(())
    }
}
