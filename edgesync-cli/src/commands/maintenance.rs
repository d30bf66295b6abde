//! `edgesync maintenance <html-file>`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

/// Arguments for `edgesync maintenance`.
#[derive(Args, Debug)]
pub struct MaintenanceArgs {
    /// HTML document served while the origin is failing.
    pub file: PathBuf,
}

impl MaintenanceArgs {
    pub fn run(self) -> Result<()> {
        let html = std::fs::read_to_string(&self.file)
            .with_context(|| format!("cannot read maintenance page '{}'", self.file.display()))?;
        let config = super::load_config()?;
        let mut session = super::open_session(&config)?;

        let report = session.upload_maintenance_page(&html);
        super::finish_run(&report)
    }
}
