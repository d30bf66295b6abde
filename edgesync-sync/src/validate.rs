//! Remote validation and activation of a draft version.

use serde_json::Value;

use crate::error::SyncError;
use crate::executor::Executor;
use crate::request::{Endpoints, Request};
use crate::transport::{FormData, Transport};

/// Messages in the `errors` field of a validation body.
///
/// Accepts an array (strings or objects) or a bare string; anything else,
/// including `null` and `[]`, means no errors.
pub fn validation_errors(body: &Value) -> Vec<String> {
    match body.get("errors") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// GET `{version}/validate`; a non-200 answer or a non-empty `errors` field
/// rejects the version.
pub fn validate_version<T: Transport>(
    executor: &Executor<T>,
    endpoints: &Endpoints,
    version: u32,
) -> Result<(), SyncError> {
    let response = executor.get(&endpoints.validate(version))?;
    if !response.is_ok() {
        return Err(SyncError::Validation {
            version,
            errors: format!("validation request returned status {}", response.status),
        });
    }
    let body = response.json().map_err(|_| SyncError::Validation {
        version,
        errors: format!("unreadable validation response (status {})", response.status),
    })?;
    let errors = validation_errors(&body);
    if !errors.is_empty() {
        return Err(SyncError::Validation {
            version,
            errors: errors.join("; "),
        });
    }
    tracing::info!(version, "version validated");
    Ok(())
}

/// PUT `{version}/activate`, not yet sent.
pub fn prepare_activate_version(endpoints: &Endpoints, version: u32) -> Request {
    Request::put(endpoints.activate(version), FormData::new())
}

/// Send a prepared activation request.
pub fn activate<T: Transport>(
    executor: &Executor<T>,
    request: &Request,
    version: u32,
) -> Result<(), SyncError> {
    let response = executor.dispatch(request)?;
    if !response.is_ok() {
        return Err(SyncError::Activation {
            version,
            status: response.status,
            body: response.text(),
        });
    }
    tracing::info!(version, "version activated");
    Ok(())
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

    #[rstest]
    #[case(json!({"status": "ok", "errors": []}), 0)]
    #[case(json!({"status": "ok"}), 0)]
    #[case(json!({"errors": null}), 0)]
    #[case(json!({"errors": ""}), 0)]
    #[case(json!({"errors": ["Syntax error at line 3"]}), 1)]
    #[case(json!({"errors": "Unknown subroutine"}), 1)]
    #[case(json!({"errors": [{"line": 3}, "x"]}), 2)]
    fn counts_validation_errors(#[case] body: Value, #[case] expected: usize) {
        assert_eq!(validation_errors(&body).len(), expected);
    }

    #[test]
    fn invalid_version_carries_messages() {
        let e = endpoints();
        let t = ScriptedTransport::new();
        t.on_json(HttpMethod::Get, &e.validate(5), 200, json!({"status": "error", "errors": ["bad vcl"]}));
        let err = validate_version(&Executor::new(&t, "Fastly-Key", "k"), &e, 5).unwrap_err();
        assert!(matches!(err, SyncError::Validation { version: 5, .. }));
        assert!(err.to_string().contains("bad vcl"));
    }

    #[test]
    fn unreadable_validation_body_is_invalid() {
        let e = endpoints();
        let t = ScriptedTransport::new();
        t.on(HttpMethod::Get, &e.validate(5), 502, "<html>bad gateway</html>");
        assert!(validate_version(&Executor::new(&t, "Fastly-Key", "k"), &e, 5).is_err());
    }

    #[rstest]
    #[case(500, json!({"msg": "Internal Server Error"}))]
    #[case(404, json!({"msg": "Record not found"}))]
    #[case(503, json!({"status": "ok", "errors": []}))]
    fn error_status_rejects_version(#[case] status: u16, #[case] body: Value) {
        let e = endpoints();
        let t = ScriptedTransport::new();
        t.on_json(HttpMethod::Get, &e.validate(5), status, body);
        let err = validate_version(&Executor::new(&t, "Fastly-Key", "k"), &e, 5).unwrap_err();
        assert!(matches!(err, SyncError::Validation { version: 5, .. }));
        assert!(err
            .to_string()
            .contains(&format!("validation request returned status {status}")));
    }

    #[test]
    fn activation_failure_reports_status() {
        let e = endpoints();
        let t = ScriptedTransport::new();
        t.on(HttpMethod::Put, &e.activate(5), 409, "{\"msg\":\"conflict\"}");
        let exec = Executor::new(&t, "Fastly-Key", "k");
        let request = prepare_activate_version(&e, 5);
        assert_eq!(request.method, HttpMethod::Put);
        let err = activate(&exec, &request, 5).unwrap_err();
        assert!(matches!(err, SyncError::Activation { status: 409, .. }));
    }
}
