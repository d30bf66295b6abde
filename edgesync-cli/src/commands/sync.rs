//! `edgesync sync`: apply the configured edge logic to a fresh draft version.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use edgesync_sync::{Plan, PlannedAction};

/// Arguments for `edgesync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Activate the draft when every request succeeded.
    #[arg(long)]
    pub activate: bool,

    /// Compare against the active version without cloning or writing anything.
    #[arg(long, conflicts_with = "activate")]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let config = super::load_config()?;
        let mut session = super::open_session(&config)?;

        if self.dry_run {
            let plan = session
                .plan(&config.edge_logic)
                .with_context(|| format!("dry run failed for service '{}'", config.service_id))?;
            print_plan(&plan);
            return Ok(());
        }

        let report = session.execute(&config.edge_logic, self.activate);
        super::finish_run(&report)
    }
}

fn print_plan(plan: &Plan) {
    let pending = plan.pending().count();
    if pending == 0 {
        println!(
            "[dry-run] ✓ nothing to do against version {}",
            plan.base_version
        );
        return;
    }

    println!(
        "[dry-run] {} change(s) against version {}",
        pending, plan.base_version
    );
    for change in &plan.changes {
        let marker = match change.action {
            PlannedAction::Insert => "+".green(),
            PlannedAction::Update => "~".yellow(),
            PlannedAction::Unchanged => "·".bright_black(),
        };
        println!("  {marker}  {} '{}' ({})", change.kind, change.name, change.action);
    }
    for diff in plan.changes.iter().filter_map(|c| c.diff.as_deref()) {
        print!("{diff}");
        if !diff.ends_with('\n') {
            println!();
        }
    }
}
