//! Version resolver: finds the service's active version.

use edgesync_core::ServiceVersion;

use crate::error::SyncError;
use crate::executor::Executor;
use crate::request::Endpoints;
use crate::transport::Transport;

/// The active version plus the number the next clone is expected to get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub active: ServiceVersion,
    /// `count(versions) + 1`; informational only, the clone response is authoritative.
    pub next_cloned_version: u32,
}

/// First record with `active == true`. Later duplicates are ignored.
pub fn find_active(versions: &[ServiceVersion]) -> Option<&ServiceVersion> {
    let mut active = versions.iter().filter(|v| v.active);
    let first = active.next()?;
    let extra = active.count();
    if extra > 0 {
        tracing::warn!(
            version = first.number,
            duplicates = extra,
            "several versions report active; using the first"
        );
    }
    Some(first)
}

/// GET the versions collection and parse it.
///
/// Fails with [`SyncError::Resolution`] when the list is empty, unreadable,
/// or the request was rejected.
pub fn list_versions<T: Transport>(
    executor: &Executor<T>,
    endpoints: &Endpoints,
) -> Result<Vec<ServiceVersion>, SyncError> {
    let response = executor.get(&endpoints.versions())?;
    if !response.is_ok() {
        return Err(SyncError::Resolution(format!(
            "version list request returned status {}",
            response.status
        )));
    }
    let versions: Vec<ServiceVersion> = serde_json::from_slice(&response.body)
        .map_err(|e| SyncError::Resolution(format!("malformed version list: {e}")))?;
    if versions.is_empty() {
        return Err(SyncError::Resolution("service has no versions".to_string()));
    }
    Ok(versions)
}

/// Resolve the active version.
///
/// [`SyncError::NoActiveVersion`] is distinct from a failed or empty listing.
pub fn get_last_version<T: Transport>(
    executor: &Executor<T>,
    endpoints: &Endpoints,
) -> Result<Resolved, SyncError> {
    let versions = list_versions(executor, endpoints)?;
    let next_cloned_version = versions.len() as u32 + 1;
    let active = find_active(&versions)
        .cloned()
        .ok_or(SyncError::NoActiveVersion)?;
    tracing::info!(
        active = active.number,
        next = next_cloned_version,
        "resolved active version"
    );
    Ok(Resolved {
        active,
        next_cloned_version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use edgesync_core::{HttpMethod, ServiceId};
    use rstest::rstest;
    use serde_json::json;

    fn endpoints() -> Endpoints {
        Endpoints::new("https://api.example.test", ServiceId::from("S"))
    }

    fn version(number: u32, active: bool) -> ServiceVersion {
        ServiceVersion {
            number,
            active,
            locked: false,
            comment: None,
        }
    }

    #[rstest]
    #[case(vec![version(1, false), version(2, true), version(3, false)], Some(2))]
    #[case(vec![version(1, true), version(2, true)], Some(1))]
    #[case(vec![version(1, false), version(2, false)], None)]
    #[case(vec![], None)]
    fn first_active_record_wins(#[case] versions: Vec<ServiceVersion>, #[case] expected: Option<u32>) {
        assert_eq!(find_active(&versions).map(|v| v.number), expected);
    }

    #[test]
    fn resolves_active_and_next_number() {
        let e = endpoints();
        let t = ScriptedTransport::new();
        t.on_json(
            HttpMethod::Get,
            &e.versions(),
            200,
            json!([{"number": 1, "active": false}, {"number": 2, "active": true}]),
        );
        let resolved = get_last_version(&Executor::new(&t, "Fastly-Key", "k"), &e).unwrap();
        assert_eq!(resolved.active.number, 2);
        assert_eq!(resolved.next_cloned_version, 3);
    }

    #[test]
    fn no_active_version_is_its_own_error() {
        let e = endpoints();
        let t = ScriptedTransport::new();
        t.on_json(HttpMethod::Get, &e.versions(), 200, json!([{"number": 1}]));
        let err = get_last_version(&Executor::new(&t, "Fastly-Key", "k"), &e).unwrap_err();
        assert!(matches!(err, SyncError::NoActiveVersion));
    }

    #[rstest]
    #[case(200, "[]")]
    #[case(200, "{\"number\": 1}")]
    #[case(200, "not json")]
    #[case(401, "{\"msg\":\"unauthorized\"}")]
    fn empty_or_malformed_listing_fails_fast(#[case] status: u16, #[case] body: &str) {
        let e = endpoints();
        let t = ScriptedTransport::new();
        t.on(HttpMethod::Get, &e.versions(), status, body);
        let err = get_last_version(&Executor::new(&t, "Fastly-Key", "k"), &e).unwrap_err();
        assert!(matches!(err, SyncError::Resolution(_)), "got: {err}");
    }
}
