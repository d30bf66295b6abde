//! The transport seam: one blocking request in, one response out.

use std::collections::BTreeMap;

use serde_json::Value;

use edgesync_core::HttpMethod;

use crate::error::TransportError;

/// Request headers, ordered for stable comparisons.
pub type Headers = BTreeMap<String, String>;

/// Form-encoded request body.
pub type FormData = BTreeMap<String, String>;

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The provider signals success with exactly 200.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Blocking HTTP capability.
///
/// Implementations must return `Ok` for every response the server produced,
/// whatever its status, and `Err` only when no response was obtained.
pub trait Transport {
    fn send(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &Headers,
        form: &FormData,
    ) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &Headers,
        form: &FormData,
    ) -> Result<Response, TransportError> {
        (**self).send(method, url, headers, form)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &Headers,
        form: &FormData,
    ) -> Result<Response, TransportError> {
        (**self).send(method, url, headers, form)
    }
}

/// Result of the up-front connection probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub ok: bool,
    pub message: String,
}

impl ConnectionStatus {
    pub fn ok() -> Self {
        Self {
            ok: true,
            message: "connection OK".to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}
