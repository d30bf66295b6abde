//! Artifact reconciler: existence check, then an insert or update request.
//!
//! | Kind            | Present when                                        |
//! |-----------------|-----------------------------------------------------|
//! | VCL snippet     | body non-empty and parses with a non-empty `content` |
//! | Condition       | parsed body has a truthy `version`                  |
//! | Request setting | parsed body has a truthy `version`                  |
//! | Response object | status is not 404                                   |
//!
//! Present artifacts get a PUT to their named URL, absent ones a POST to the
//! collection. Missing conditions are the exception: they are inserted right
//! away, because settings queued after them may reference them by name.

use serde_json::Value;

use edgesync_core::{Artifact, ConditionSpec, SettingSpec, VclSpec};
use edgesync_renderer::TemplateEngine;

use crate::error::SyncError;
use crate::error_log::ErrorLog;
use crate::executor::Executor;
use crate::request::{Endpoints, Request};
use crate::transport::{Response, Transport};

// ---------------------------------------------------------------------------
// Existence predicates
// ---------------------------------------------------------------------------

pub fn snippet_present(response: &Response) -> bool {
    if response.is_empty() {
        return false;
    }
    response
        .json()
        .ok()
        .and_then(|body| {
            body.get("content")
                .and_then(Value::as_str)
                .map(|content| !content.is_empty())
        })
        .unwrap_or(false)
}

pub fn version_present(response: &Response) -> bool {
    response
        .json()
        .ok()
        .and_then(|body| body.get("version").map(is_truthy))
        .unwrap_or(false)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// What reconciling one artifact produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// A request to run with the batch.
    Queued(Request),
    /// The request already ran (missing-condition insert).
    Applied { request: Request, response: Response },
}

/// Queued requests plus whether every eager insert succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Built {
    pub requests: Vec<Request>,
    pub pass: bool,
}

/// Builds requests against one draft version.
pub struct Reconciler<'a, T> {
    executor: &'a Executor<T>,
    endpoints: &'a Endpoints,
    version: u32,
}

impl<'a, T: Transport> Reconciler<'a, T> {
    pub fn new(executor: &'a Executor<T>, endpoints: &'a Endpoints, version: u32) -> Self {
        Self {
            executor,
            endpoints,
            version,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Kind-specific existence check in the draft version.
    pub fn exists(&self, artifact: &Artifact) -> Result<bool, SyncError> {
        let response = self.fetch(artifact)?;
        let present = match artifact {
            Artifact::VclSnippet(_) => snippet_present(&response),
            Artifact::Condition(_) | Artifact::RequestSetting(_) => version_present(&response),
            Artifact::ResponseObject(_) => !response.is_not_found(),
        };
        tracing::debug!(
            kind = %artifact.kind(),
            name = artifact.name(),
            present,
            "existence check"
        );
        Ok(present)
    }

    /// Existence by status alone: anything but 404 counts as present.
    pub fn exists_by_status(&self, artifact: &Artifact) -> Result<bool, SyncError> {
        Ok(!self.fetch(artifact)?.is_not_found())
    }

    fn fetch(&self, artifact: &Artifact) -> Result<Response, SyncError> {
        let url = self
            .endpoints
            .resource(self.version, artifact.kind(), artifact.name());
        Ok(self.executor.get(&url)?)
    }

    /// Existence check, then the matching update or insert request.
    pub fn upsert_request(&self, artifact: &Artifact) -> Result<Request, SyncError> {
        let exists = self.exists(artifact)?;
        Ok(Request::upsert(self.endpoints, self.version, artifact, exists))
    }

    pub fn reconcile(&self, artifact: &Artifact) -> Result<Reconciled, SyncError> {
        match artifact {
            Artifact::Condition(_) => self.reconcile_condition(artifact),
            Artifact::VclSnippet(_) | Artifact::ResponseObject(_) | Artifact::RequestSetting(_) => {
                Ok(Reconciled::Queued(self.upsert_request(artifact)?))
            }
        }
    }

    fn reconcile_condition(&self, artifact: &Artifact) -> Result<Reconciled, SyncError> {
        if self.exists(artifact)? {
            return Ok(Reconciled::Queued(Request::update(
                self.endpoints,
                self.version,
                artifact,
            )));
        }
        let request = Request::insert(self.endpoints, self.version, artifact);
        let response = self.executor.dispatch(&request)?;
        tracing::info!(
            name = artifact.name(),
            status = response.status,
            "inserted missing condition"
        );
        Ok(Reconciled::Applied { request, response })
    }

    // -----------------------------------------------------------------------
    // Per-kind batches
    // -----------------------------------------------------------------------

    /// One request per VCL spec. A missing template aborts the whole kind.
    pub fn snippet_requests(
        &self,
        specs: &[VclSpec],
        templates: &TemplateEngine,
        prefix: &str,
    ) -> Result<Vec<Request>, SyncError> {
        let mut requests = Vec::with_capacity(specs.len());
        for spec in specs {
            let content = templates.read_template(&spec.directory, &spec.snippet_type)?;
            let artifact = Artifact::VclSnippet(spec.into_snippet(prefix, content));
            requests.push(self.upsert_request(&artifact)?);
        }
        Ok(requests)
    }

    /// Condition updates to queue; missing conditions are inserted now.
    ///
    /// Every spec is validated before anything is sent. A rejected insert is
    /// recorded in `log` and clears [`Built::pass`].
    pub fn condition_requests(
        &self,
        specs: &[ConditionSpec],
        log: &mut ErrorLog,
    ) -> Result<Built, SyncError> {
        let conditions = specs
            .iter()
            .map(ConditionSpec::validate)
            .collect::<Result<Vec<_>, _>>()?;

        let mut built = Built {
            requests: Vec::new(),
            pass: true,
        };
        for condition in conditions {
            match self.reconcile(&Artifact::Condition(condition))? {
                Reconciled::Queued(request) => built.requests.push(request),
                Reconciled::Applied { request, response } if !response.is_ok() => {
                    built.pass = false;
                    log.record(&SyncError::remote(&request, &response));
                }
                Reconciled::Applied { .. } => {}
            }
        }
        Ok(built)
    }

    /// One request per setting spec, after validating them all.
    pub fn setting_requests(&self, specs: &[SettingSpec]) -> Result<Vec<Request>, SyncError> {
        let settings = specs
            .iter()
            .map(SettingSpec::validate)
            .collect::<Result<Vec<_>, _>>()?;
        settings
            .into_iter()
            .map(|setting| self.upsert_request(&Artifact::RequestSetting(setting)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
