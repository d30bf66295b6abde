//! Request executor: attaches headers and dispatches through the transport.
//!
//! Headers depend only on the method:
//!
//! | Method     | Headers                                                           |
//! |------------|-------------------------------------------------------------------|
//! | `GET`      | auth key, `Accept: application/json`                              |
//! | `POST/PUT` | auth key, `Accept`, `Content-Type: application/x-www-form-urlencoded` |

use edgesync_core::HttpMethod;

use crate::error::{SyncError, TransportError};
use crate::error_log::ErrorLog;
use crate::request::{Endpoints, Request};
use crate::transport::{ConnectionStatus, Headers, Response, Transport};

/// Outcome of running a queue of requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// `false` once any request returned a non-200 status.
    pub pass: bool,
    pub executed: usize,
    pub failed: usize,
}

/// Authenticated dispatcher over a [`Transport`].
pub struct Executor<T> {
    transport: T,
    auth_header: String,
    api_key: String,
}

impl<T: Transport> Executor<T> {
    pub fn new(transport: T, auth_header: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            auth_header: auth_header.into(),
            api_key: api_key.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn headers_for(&self, method: HttpMethod) -> Headers {
        let mut headers = Headers::new();
        headers.insert(self.auth_header.clone(), self.api_key.clone());
        headers.insert("Accept".to_string(), "application/json".to_string());
        if method.has_body() {
            headers.insert(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            );
        }
        headers
    }

    /// Send one request. Any status is `Ok`; only transport faults are `Err`.
    pub fn dispatch(&self, request: &Request) -> Result<Response, TransportError> {
        let headers = self.headers_for(request.method);
        tracing::debug!(method = %request.method, url = %request.url, "dispatch");
        let response = self
            .transport
            .send(request.method, &request.url, &headers, &request.data)?;
        tracing::debug!(status = response.status, url = %request.url, "response");
        Ok(response)
    }

    pub fn get(&self, url: &str) -> Result<Response, TransportError> {
        self.dispatch(&Request::get(url))
    }

    /// Dispatch and turn a non-200 status into [`SyncError::RemoteRequest`].
    pub fn execute_checked(&self, request: &Request) -> Result<Response, SyncError> {
        let response = self.dispatch(request)?;
        if !response.is_ok() {
            return Err(SyncError::remote(request, &response));
        }
        Ok(response)
    }

    /// Run every request in order without short-circuiting.
    ///
    /// A non-200 response clears `pass` and records the body in `log`;
    /// the remaining requests still run. Transport faults stop the batch.
    pub fn run_batch(
        &self,
        requests: &[Request],
        log: &mut ErrorLog,
    ) -> Result<BatchOutcome, TransportError> {
        let mut outcome = BatchOutcome {
            pass: true,
            executed: 0,
            failed: 0,
        };
        for request in requests {
            let response = self.dispatch(request)?;
            outcome.executed += 1;
            if !response.is_ok() {
                outcome.pass = false;
                outcome.failed += 1;
                tracing::warn!(
                    method = %request.method,
                    url = %request.url,
                    status = response.status,
                    "request rejected"
                );
                log.record(&SyncError::remote(request, &response));
            }
        }
        tracing::info!(
            executed = outcome.executed,
            failed = outcome.failed,
            "batch finished"
        );
        Ok(outcome)
    }

    /// Probe the service endpoint once.
    pub fn test_connection(&self, endpoints: &Endpoints) -> ConnectionStatus {
        match self.get(&endpoints.service()) {
            Ok(resp) if resp.is_ok() => ConnectionStatus::ok(),
            Ok(resp) if resp.status == 401 || resp.status == 403 => ConnectionStatus::failed(
                format!("API key rejected (status {})", resp.status),
            ),
            Ok(resp) if resp.is_not_found() => ConnectionStatus::failed(format!(
                "service '{}' not found",
                endpoints.service_id()
            )),
            Ok(resp) => ConnectionStatus::failed(format!(
                "unexpected status {} from {}",
                resp.status,
                endpoints.service()
            )),
            Err(err) => ConnectionStatus::failed(format!("connection failed: {err}")),
        }
    }
}
