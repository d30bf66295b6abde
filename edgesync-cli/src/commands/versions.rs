//! `edgesync versions`: the service's version list.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use edgesync_core::ServiceVersion;

/// Arguments for `edgesync versions`.
#[derive(Args, Debug)]
pub struct VersionsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct VersionRow {
    #[tabled(rename = "version")]
    number: u32,
    #[tabled(rename = "active")]
    active: String,
    #[tabled(rename = "locked")]
    locked: String,
    #[tabled(rename = "comment")]
    comment: String,
}

impl VersionsArgs {
    pub fn run(self) -> Result<()> {
        let config = super::load_config()?;
        let session = super::open_session(&config)?;
        if let Some(message) = session.connection_errors().first() {
            bail!("connection error: {message}");
        }

        let versions = session
            .list_versions()
            .with_context(|| format!("failed to list versions of '{}'", config.service_id))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&versions).context("failed to serialize versions")?
            );
            return Ok(());
        }

        print_table(&config.service_id.to_string(), &versions);
        Ok(())
    }
}

fn print_table(service: &str, versions: &[ServiceVersion]) {
    let active = versions
        .iter()
        .find(|v| v.active)
        .map(|v| format!("v{}", v.number))
        .unwrap_or_else(|| "none".to_string());
    println!(
        "{} | {} versions | active: {}",
        service.bold(),
        versions.len(),
        active.green()
    );

    let rows: Vec<VersionRow> = versions
        .iter()
        .map(|v| VersionRow {
            number: v.number,
            active: if v.active { "●".to_string() } else { String::new() },
            locked: if v.locked { "yes".to_string() } else { String::new() },
            comment: v.comment.clone().unwrap_or_default(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
