//! `edgesync check`: run the connection probe once.

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use edgesync_sync::{Endpoints, Executor};

use crate::transport::UreqTransport;

/// Arguments for `edgesync check`.
#[derive(Args, Debug)]
pub struct CheckArgs {}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let config = super::load_config()?;
        let executor = Executor::new(
            UreqTransport::new(super::timeout(&config)),
            config.auth_header.clone(),
            config.api_key.clone(),
        );
        let endpoints = Endpoints::from_config(&config);

        let status = executor.test_connection(&endpoints);
        if !status.ok {
            bail!("{}", status.message);
        }
        println!(
            "{} {} (service '{}')",
            "✓".green(),
            status.message,
            endpoints.service_id()
        );
        Ok(())
    }
}
