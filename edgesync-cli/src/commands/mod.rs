pub mod check;
pub mod init;
pub mod maintenance;
pub mod sync;
pub mod versions;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use colored::Colorize;

use edgesync_core::{config, Config};
use edgesync_renderer::TemplateEngine;
use edgesync_sync::{NoopNotifier, Notifier, RunReport, VersionSync};

use crate::notify::WebhookNotifier;
use crate::transport::UreqTransport;

pub type Session = VersionSync<UreqTransport, Box<dyn Notifier>>;

pub fn home() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

pub fn load_config() -> Result<Config> {
    let home = home()?;
    config::load_at(&home).context("failed to load config — run `edgesync init` first")
}

pub fn timeout(config: &Config) -> Duration {
    Duration::from_secs(config.timeout_secs)
}

/// Probe the service and resolve its active version.
pub fn open_session(config: &Config) -> Result<Session> {
    let templates = TemplateEngine::from_config(config).context("failed to load VCL templates")?;
    let notifier: Box<dyn Notifier> = match &config.webhook {
        Some(webhook) if webhook.enabled => {
            Box::new(WebhookNotifier::new(&webhook.url, timeout(config)))
        }
        _ => Box::new(NoopNotifier),
    };
    Ok(VersionSync::connect(
        UreqTransport::new(timeout(config)),
        notifier,
        templates,
        config,
    ))
}

/// Print a run report; a run that did not fully succeed is an error.
pub fn finish_run(report: &RunReport) -> Result<()> {
    for error in &report.errors {
        eprintln!("  {} {error}", "✗".red());
    }
    if report.succeeded() {
        println!("{} {}", "✓".green(), report.notification());
        return Ok(());
    }
    bail!("{}", report.notification())
}
