//! # edgesync-sync
//!
//! Versioned configuration sync against an edge provider's REST API.
//!
//! A run never edits the live version. It clones the active version into a
//! draft, reconciles every artifact into the draft, validates, and activates
//! only when every request succeeded. [`VersionSync`] drives the whole run;
//! the modules below are its individual steps.
//!
//! HTTP goes through the [`Transport`] trait so callers pick the client.

pub mod draft;
pub mod error;
pub mod error_log;
pub mod executor;
pub mod notify;
pub mod orchestrator;
pub mod plan;
pub mod reconcile;
pub mod request;
pub mod resolver;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod transport;
pub mod validate;

pub use error::{SyncError, TransportError};
pub use error_log::ErrorLog;
pub use executor::{BatchOutcome, Executor};
pub use notify::{NoopNotifier, Notifier};
pub use orchestrator::{RunKind, RunOutcome, RunReport, VersionSync};
pub use plan::{Plan, PlannedAction, PlannedChange};
pub use reconcile::Reconciler;
pub use request::{Endpoints, Request};
pub use transport::{ConnectionStatus, FormData, Headers, Response, Transport};
