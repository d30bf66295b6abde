//! Clone manager: produces the draft version a run mutates.

use edgesync_core::ServiceVersion;

use crate::error::SyncError;
use crate::executor::Executor;
use crate::request::{Endpoints, Request};
use crate::transport::{FormData, Transport};

/// Clone `active` into a new draft and return the draft's number.
///
/// Without a resolved active version this fails before sending anything.
/// A response without a numeric `number` field is a clone failure.
pub fn clone_version<T: Transport>(
    executor: &Executor<T>,
    endpoints: &Endpoints,
    active: Option<&ServiceVersion>,
) -> Result<u32, SyncError> {
    let active = active.ok_or(SyncError::NoActiveVersion)?;
    let request = Request::put(endpoints.clone_version(active.number), FormData::new());
    let response = executor.dispatch(&request)?;

    let number = response
        .json()
        .ok()
        .and_then(|body| body.get("number").and_then(|n| n.as_u64()))
        .and_then(|n| u32::try_from(n).ok());

    match number {
        Some(draft) => {
            tracing::info!(from = active.number, draft, "cloned active version");
            Ok(draft)
        }
        None => Err(SyncError::Clone(format!(
            "no version number in clone response (status {})",
            response.status
        ))),
    }
}
