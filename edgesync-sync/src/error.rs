//! Error types for edgesync-sync.

use thiserror::Error;

use edgesync_core::{ConfigError, HttpMethod};
use edgesync_renderer::RenderError;

use crate::request::Request;
use crate::transport::Response;

/// Network-level failure. Non-200 statuses are *not* transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error contacting {url}: {message}")]
    Network { url: String, message: String },

    #[error("failed to read response body from {url}: {message}")]
    Body { url: String, message: String },
}

/// All errors that can arise from a synchronization step.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The connection probe failed before any mutation.
    #[error("connection error: {0}")]
    Connection(String),

    /// A transport fault raised mid-run.
    #[error("connection error: {0}")]
    Transport(#[from] TransportError),

    /// The version list was empty, unreadable, or not a list.
    #[error("unable to resolve service versions: {0}")]
    Resolution(String),

    #[error("last version does not exist")]
    NoActiveVersion,

    #[error("Unable to clone last version: {0}")]
    Clone(String),

    /// No VCL, condition, or setting payload supplied.
    #[error("nothing to upload: no VCL snippets, conditions, or settings configured")]
    NothingToUpload,

    /// Malformed artifact data.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("VCL template missing: no '{kind}' template in '{directory}'")]
    TemplateMissing { directory: String, kind: String },

    #[error("template error: {0}")]
    Render(RenderError),

    #[error("{method} {url} failed with status {status}: {body}")]
    RemoteRequest {
        method: HttpMethod,
        url: String,
        status: u16,
        body: String,
    },

    #[error("version {version} is invalid: {errors}")]
    Validation { version: u32, errors: String },

    #[error("activation of version {version} failed with status {status}: {body}")]
    Activation {
        version: u32,
        status: u16,
        body: String,
    },
}

impl SyncError {
    /// [`SyncError::RemoteRequest`] for a non-200 `response` to `request`.
    pub fn remote(request: &Request, response: &Response) -> Self {
        SyncError::RemoteRequest {
            method: request.method,
            url: request.url.clone(),
            status: response.status,
            body: response.text(),
        }
    }

    /// `true` for errors that mean the remote side was unreachable.
    pub fn is_connection(&self) -> bool {
        matches!(self, SyncError::Connection(_) | SyncError::Transport(_))
    }
}

impl From<RenderError> for SyncError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::TemplateNotFound { directory, kind } => {
                SyncError::TemplateMissing { directory, kind }
            }
            other => SyncError::Render(other),
        }
    }
}
