//! edgesync: versioned edge configuration sync CLI.
//!
//! # Usage
//!
//! ```text
//! edgesync init --service-id <id> --api-key <key> [--api-base-url <url>] [--snippet-prefix <p>]
//! edgesync sync [--activate] [--dry-run]
//! edgesync maintenance <html-file>
//! edgesync versions [--json]
//! edgesync check
//! ```

mod commands;
mod notify;
mod transport;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    check::CheckArgs, init::InitArgs, maintenance::MaintenanceArgs, sync::SyncArgs,
    versions::VersionsArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "edgesync",
    version,
    about = "Push VCL snippets, conditions, and request settings to a versioned CDN service",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write ~/.edgesync/config.yaml for a service.
    Init(InitArgs),

    /// Clone the active version and apply the configured edge logic to it.
    Sync(SyncArgs),

    /// Upload an HTML maintenance page and activate it.
    Maintenance(MaintenanceArgs),

    /// List the service's versions.
    Versions(VersionsArgs),

    /// Check that the API key can reach the service.
    Check(CheckArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Maintenance(args) => args.run(),
        Commands::Versions(args) => args.run(),
        Commands::Check(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
