//! Sync orchestrator: one session against one service.
//!
//! ## `execute`: 9-step run
//!
//! 1. Preflight: probe failures recorded at connect time abort the run.
//! 2. Resolve: no active version aborts ("last version does not exist").
//! 3. Require at least one VCL, condition, or setting spec.
//! 4. Clone the active version into a draft.
//! 5. Build requests: VCL, then conditions (missing ones inserted now), then settings.
//! 6. Validate the draft.
//! 7. Run the queued requests; a rejected request clears `pass` and the rest still run.
//! 8. Activate when `pass` holds and activation was requested.
//! 9. Notify the outcome and return a [`RunReport`].
//!
//! `upload_maintenance_page` is the fail-fast variant: the first failing
//! step aborts the run.

use edgesync_core::{Artifact, Config, ConfigError, EdgeLogic, MaintenanceConfig, ServiceVersion, VclSpec};
use edgesync_renderer::TemplateEngine;

use crate::draft;
use crate::error::SyncError;
use crate::error_log::ErrorLog;
use crate::executor::Executor;
use crate::notify::{category, Notifier};
use crate::plan::{self, Plan};
use crate::reconcile::Reconciler;
use crate::request::{Endpoints, Request};
use crate::resolver;
use crate::transport::Transport;
use crate::validate;

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Which workflow produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    EdgeLogic,
    MaintenancePage,
}

impl RunKind {
    pub fn subject(&self) -> &'static str {
        match self {
            RunKind::EdgeLogic => "Edge logic",
            RunKind::MaintenancePage => "Maintenance page",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            RunKind::EdgeLogic => category::EDGE_LOGIC,
            RunKind::MaintenancePage => category::MAINTENANCE_PAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run stopped before or during a step that cannot be continued.
    Aborted,
    /// Every step ran; `pass` is false when any request was rejected.
    Completed {
        version: u32,
        pass: bool,
        activated: bool,
    },
}

/// Outcome of one run plus every error recorded during it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub kind: RunKind,
    pub outcome: RunOutcome,
    pub errors: Vec<String>,
}

impl RunReport {
    pub fn is_aborted(&self) -> bool {
        self.outcome == RunOutcome::Aborted
    }

    /// Completed with no rejected request.
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed { pass: true, .. })
    }

    pub fn activated(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed { activated: true, .. })
    }

    /// The draft the run wrote to, if it got that far.
    pub fn draft_version(&self) -> Option<u32> {
        match self.outcome {
            RunOutcome::Completed { version, .. } => Some(version),
            RunOutcome::Aborted => None,
        }
    }

    /// Status message of a completed run; `None` when aborted.
    pub fn message(&self) -> Option<String> {
        match self.outcome {
            RunOutcome::Aborted => None,
            RunOutcome::Completed { .. } => Some(self.notification()),
        }
    }

    /// The one notification this run sends.
    pub fn notification(&self) -> String {
        let subject = self.kind.subject();
        match self.outcome {
            RunOutcome::Completed {
                version,
                activated: true,
                ..
            } => format!("{subject} updated and activated (version {version})."),
            RunOutcome::Completed {
                version,
                pass: true,
                activated: false,
            } => format!("{subject} updated in version {version} but not activated."),
            RunOutcome::Completed { version, .. } => format!(
                "{subject} update failed in version {version} ({} error(s)); not activated.",
                self.errors.len()
            ),
            RunOutcome::Aborted => match self.errors.first() {
                Some(first) => format!("{subject} update failed: {first}"),
                None => format!("{subject} update failed."),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// VersionSync
// ---------------------------------------------------------------------------

/// A session bound to one service: probe and resolution happen at connect.
pub struct VersionSync<T, N> {
    executor: Executor<T>,
    endpoints: Endpoints,
    templates: TemplateEngine,
    notifier: N,
    snippet_prefix: String,
    maintenance: MaintenanceConfig,
    connection_errors: Vec<String>,
    resolution_error: Option<String>,
    active: Option<ServiceVersion>,
    next_cloned_version: Option<u32>,
}

impl<T: Transport, N: Notifier> VersionSync<T, N> {
    /// Open a session: probe the service, then resolve its active version.
    ///
    /// Never fails; problems are kept and surface when a run starts.
    pub fn connect(transport: T, notifier: N, templates: TemplateEngine, config: &Config) -> Self {
        let mut session = Self {
            executor: Executor::new(transport, config.auth_header.clone(), config.api_key.clone()),
            endpoints: Endpoints::from_config(config),
            templates,
            notifier,
            snippet_prefix: config.snippet_prefix.clone(),
            maintenance: config.maintenance.clone(),
            connection_errors: Vec::new(),
            resolution_error: None,
            active: None,
            next_cloned_version: None,
        };
        session.refresh();
        session
    }

    /// Re-run the probe and version resolution.
    pub fn refresh(&mut self) {
        self.connection_errors.clear();
        self.resolution_error = None;
        self.active = None;
        self.next_cloned_version = None;

        let status = self.executor.test_connection(&self.endpoints);
        if !status.ok {
            tracing::warn!(service = %self.endpoints.service_id(), "{}", status.message);
            self.connection_errors.push(status.message);
            return;
        }

        match resolver::get_last_version(&self.executor, &self.endpoints) {
            Ok(resolved) => {
                self.active = Some(resolved.active);
                self.next_cloned_version = Some(resolved.next_cloned_version);
            }
            Err(SyncError::Transport(err)) => self.connection_errors.push(err.to_string()),
            Err(SyncError::NoActiveVersion) => {
                tracing::warn!(service = %self.endpoints.service_id(), "no active version");
            }
            Err(err) => {
                tracing::warn!(service = %self.endpoints.service_id(), "{err}");
                self.resolution_error = Some(err.to_string());
            }
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn executor(&self) -> &Executor<T> {
        &self.executor
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn is_connected(&self) -> bool {
        self.connection_errors.is_empty()
    }

    pub fn connection_errors(&self) -> &[String] {
        &self.connection_errors
    }

    pub fn active_version(&self) -> Option<&ServiceVersion> {
        self.active.as_ref()
    }

    pub fn next_cloned_version(&self) -> Option<u32> {
        self.next_cloned_version
    }

    pub fn list_versions(&self) -> Result<Vec<ServiceVersion>, SyncError> {
        resolver::list_versions(&self.executor, &self.endpoints)
    }

    pub fn clone_last_active_version(&self) -> Result<u32, SyncError> {
        draft::clone_version(&self.executor, &self.endpoints, self.active.as_ref())
    }

    /// Read-only preview of `execute` against the active version.
    pub fn plan(&self, edge_logic: &EdgeLogic) -> Result<Plan, SyncError> {
        if let Some(message) = self.connection_errors.first() {
            return Err(SyncError::Connection(message.clone()));
        }
        let active = self.active.as_ref().ok_or(SyncError::NoActiveVersion)?;
        plan::plan_edge_logic(
            &self.executor,
            &self.endpoints,
            &self.templates,
            &self.snippet_prefix,
            active.number,
            edge_logic,
        )
    }

    // -----------------------------------------------------------------------
    // Runs
    // -----------------------------------------------------------------------

    /// Push `edge_logic` into a fresh draft, optionally activating it.
    pub fn execute(&mut self, edge_logic: &EdgeLogic, activate: bool) -> RunReport {
        let mut log = ErrorLog::default();
        let outcome = if self.preflight(&mut log) {
            match self.apply_edge_logic(edge_logic, activate, &mut log) {
                Ok(outcome) => outcome,
                Err(err) => {
                    log.record(&err);
                    RunOutcome::Aborted
                }
            }
        } else {
            RunOutcome::Aborted
        };
        self.finish(RunKind::EdgeLogic, outcome, log)
    }

    /// Install `html` as the maintenance page and activate it.
    pub fn upload_maintenance_page(&mut self, html: &str) -> RunReport {
        let mut log = ErrorLog::default();
        let outcome = if self.preflight(&mut log) {
            match self.apply_maintenance_page(html) {
                Ok(outcome) => outcome,
                Err(err) => {
                    log.record(&err);
                    RunOutcome::Aborted
                }
            }
        } else {
            RunOutcome::Aborted
        };
        self.finish(RunKind::MaintenancePage, outcome, log)
    }

    /// Record connect-time problems; `false` means the run must not start.
    fn preflight(&self, log: &mut ErrorLog) -> bool {
        if !self.connection_errors.is_empty() {
            for message in &self.connection_errors {
                log.record(&SyncError::Connection(message.clone()));
            }
            return false;
        }
        if self.active.is_none() {
            if let Some(detail) = &self.resolution_error {
                log.push(detail.clone());
            }
            log.record(&SyncError::NoActiveVersion);
            return false;
        }
        true
    }

    fn apply_edge_logic(
        &mut self,
        edge_logic: &EdgeLogic,
        activate: bool,
        log: &mut ErrorLog,
    ) -> Result<RunOutcome, SyncError> {
        if edge_logic.is_empty() {
            return Err(SyncError::NothingToUpload);
        }
        let draft = self.clone_last_active_version()?;
        let reconciler = Reconciler::new(&self.executor, &self.endpoints, draft);

        let mut queue =
            reconciler.snippet_requests(&edge_logic.vcl, &self.templates, &self.snippet_prefix)?;
        let conditions = reconciler.condition_requests(&edge_logic.conditions, log)?;
        queue.extend(conditions.requests);
        queue.extend(reconciler.setting_requests(&edge_logic.settings)?);

        validate::validate_version(&self.executor, &self.endpoints, draft)?;
        let batch = self.executor.run_batch(&queue, log)?;

        let mut pass = conditions.pass && batch.pass;
        let mut activated = false;
        if pass && activate {
            let request = validate::prepare_activate_version(&self.endpoints, draft);
            match validate::activate(&self.executor, &request, draft) {
                Ok(()) => activated = true,
                Err(err) if err.is_connection() => return Err(err),
                Err(err) => {
                    pass = false;
                    log.record(&err);
                }
            }
        } else if activate {
            tracing::warn!(version = draft, "requests failed; draft left inactive");
        }

        if activated {
            self.mark_active(draft);
        }
        Ok(RunOutcome::Completed {
            version: draft,
            pass,
            activated,
        })
    }

    fn apply_maintenance_page(&mut self, html: &str) -> Result<RunOutcome, SyncError> {
        if html.trim().is_empty() {
            return Err(ConfigError::Invalid("maintenance page is empty".into()).into());
        }
        let draft = self.clone_last_active_version()?;
        let reconciler = Reconciler::new(&self.executor, &self.endpoints, draft);

        let condition = Artifact::Condition(self.maintenance.condition());
        if !reconciler.exists_by_status(&condition)? {
            self.executor
                .execute_checked(&Request::insert(&self.endpoints, draft, &condition))?;
            tracing::info!(name = condition.name(), version = draft, "inserted maintenance condition");
        }

        let object = Artifact::ResponseObject(self.maintenance.response_object(html));
        self.executor
            .execute_checked(&reconciler.upsert_request(&object)?)?;

        validate::validate_version(&self.executor, &self.endpoints, draft)?;

        let snippet = Artifact::VclSnippet(self.maintenance_snippet()?);
        self.executor
            .execute_checked(&reconciler.upsert_request(&snippet)?)?;

        let request = validate::prepare_activate_version(&self.endpoints, draft);
        validate::activate(&self.executor, &request, draft)?;

        self.mark_active(draft);
        Ok(RunOutcome::Completed {
            version: draft,
            pass: true,
            activated: true,
        })
    }

    /// The maintenance `deliver` snippet, named `<prefix>_<directory>_deliver`.
    fn maintenance_snippet(&self) -> Result<edgesync_core::VclSnippet, SyncError> {
        let directory = &self.maintenance.vcl_directory;
        let spec = VclSpec::new(directory.as_str(), "deliver");
        let content = self.templates.read_template(directory, &spec.snippet_type)?;
        let prefix = format!("{}_{directory}", self.snippet_prefix);
        Ok(spec.into_snippet(&prefix, content))
    }

    fn mark_active(&mut self, version: u32) {
        self.active = Some(ServiceVersion {
            number: version,
            active: true,
            locked: true,
            comment: None,
        });
        self.next_cloned_version = Some(version + 1);
    }

    fn finish(&self, kind: RunKind, outcome: RunOutcome, log: ErrorLog) -> RunReport {
        let report = RunReport {
            kind,
            outcome,
            errors: log.into_vec(),
        };
        match report.outcome {
            RunOutcome::Aborted => tracing::error!("{}", report.notification()),
            RunOutcome::Completed { pass: false, .. } => tracing::warn!("{}", report.notification()),
            RunOutcome::Completed { .. } => tracing::info!("{}", report.notification()),
        }
        self.notifier.send(&report.notification(), kind.category());
        report
    }
}
