//! Dry-run plan: what `execute` would change, checked against a live version.
//!
//! Only `GET`s are sent. VCL snippets carry a unified diff between the
//! remote content and the rendered template.

use std::fmt;

use similar::TextDiff;

use edgesync_core::{Artifact, ArtifactKind, ConditionSpec, EdgeLogic, SettingSpec, VclSnippet};
use edgesync_renderer::TemplateEngine;

use crate::error::SyncError;
use crate::executor::Executor;
use crate::reconcile::{snippet_present, Reconciler};
use crate::request::Endpoints;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    Insert,
    Update,
    /// Remote snippet content already matches the template.
    Unchanged,
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlannedAction::Insert => "insert",
            PlannedAction::Update => "update",
            PlannedAction::Unchanged => "unchanged",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChange {
    pub kind: ArtifactKind,
    pub name: String,
    pub action: PlannedAction,
    /// Unified diff for VCL snippets whose content would change.
    pub diff: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Version the checks ran against.
    pub base_version: u32,
    pub changes: Vec<PlannedChange>,
}

impl Plan {
    /// Changes that would send a mutation.
    pub fn pending(&self) -> impl Iterator<Item = &PlannedChange> {
        self.changes
            .iter()
            .filter(|c| c.action != PlannedAction::Unchanged)
    }

    pub fn is_noop(&self) -> bool {
        self.pending().next().is_none()
    }
}

/// Build the plan for `edge_logic` against `version`.
pub fn plan_edge_logic<T: Transport>(
    executor: &Executor<T>,
    endpoints: &Endpoints,
    templates: &TemplateEngine,
    prefix: &str,
    version: u32,
    edge_logic: &EdgeLogic,
) -> Result<Plan, SyncError> {
    if edge_logic.is_empty() {
        return Err(SyncError::NothingToUpload);
    }
    let reconciler = Reconciler::new(executor, endpoints, version);
    let mut changes = Vec::new();

    for spec in &edge_logic.vcl {
        let content = templates.read_template(&spec.directory, &spec.snippet_type)?;
        let snippet = spec.into_snippet(prefix, content);
        changes.push(plan_snippet(executor, endpoints, version, snippet)?);
    }

    let conditions = edge_logic
        .conditions
        .iter()
        .map(ConditionSpec::validate)
        .collect::<Result<Vec<_>, _>>()?;
    for condition in conditions {
        changes.push(plan_presence(&reconciler, &Artifact::Condition(condition))?);
    }

    let settings = edge_logic
        .settings
        .iter()
        .map(SettingSpec::validate)
        .collect::<Result<Vec<_>, _>>()?;
    for setting in settings {
        changes.push(plan_presence(&reconciler, &Artifact::RequestSetting(setting))?);
    }

    tracing::debug!(base = version, changes = changes.len(), "plan built");
    Ok(Plan {
        base_version: version,
        changes,
    })
}

fn plan_snippet<T: Transport>(
    executor: &Executor<T>,
    endpoints: &Endpoints,
    version: u32,
    snippet: VclSnippet,
) -> Result<PlannedChange, SyncError> {
    let url = endpoints.resource(version, ArtifactKind::VclSnippet, &snippet.name);
    let response = executor.get(&url)?;

    let remote = if snippet_present(&response) {
        response
            .json()
            .ok()
            .and_then(|body| body.get("content").and_then(|c| c.as_str()).map(normalize_line_endings))
    } else {
        None
    };

    let (action, diff) = match remote {
        Some(existing) if existing == snippet.content => (PlannedAction::Unchanged, None),
        Some(existing) => (
            PlannedAction::Update,
            Some(unified_diff(&snippet.name, &existing, &snippet.content)),
        ),
        None => (
            PlannedAction::Insert,
            Some(unified_diff(&snippet.name, "", &snippet.content)),
        ),
    };
    Ok(PlannedChange {
        kind: ArtifactKind::VclSnippet,
        name: snippet.name,
        action,
        diff,
    })
}

fn plan_presence<T: Transport>(
    reconciler: &Reconciler<'_, T>,
    artifact: &Artifact,
) -> Result<PlannedChange, SyncError> {
    let action = if reconciler.exists(artifact)? {
        PlannedAction::Update
    } else {
        PlannedAction::Insert
    };
    Ok(PlannedChange {
        kind: artifact.kind(),
        name: artifact.name().to_string(),
        action,
        diff: None,
    })
}

fn unified_diff(name: &str, old: &str, new: &str) -> String {
    let old_header = format!("a/{name}");
    let new_header = format!("b/{name}");
    TextDiff::from_lines(old, new)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}
