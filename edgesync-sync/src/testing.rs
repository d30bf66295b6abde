//! In-memory doubles for the transport and notifier seams.
//!
//! [`ScriptedTransport`] answers from per-route response queues and records
//! every request it receives. Unscripted routes answer `404`.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use serde_json::Value;

use edgesync_core::HttpMethod;

use crate::error::TransportError;
use crate::notify::Notifier;
use crate::request::Endpoints;
use crate::transport::{FormData, Headers, Response, Transport};

/// One request as the transport saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub form: FormData,
}

type Route = (HttpMethod, String);

/// Scripted, recording [`Transport`].
///
/// Each route holds a queue of responses; the last one repeats once the
/// others have been consumed.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: RefCell<HashMap<Route, VecDeque<Response>>>,
    failing: RefCell<HashSet<Route>>,
    log: RefCell<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose probe succeeds and whose version list is `versions`.
    pub fn healthy(endpoints: &Endpoints, versions: Value) -> Self {
        let t = Self::new();
        t.on(HttpMethod::Get, &endpoints.service(), 200, "{}");
        t.on_json(HttpMethod::Get, &endpoints.versions(), 200, versions);
        t
    }

    /// Queue a response for `(method, url)`.
    pub fn on(&self, method: HttpMethod, url: &str, status: u16, body: &str) -> &Self {
        self.routes
            .borrow_mut()
            .entry((method, url.to_string()))
            .or_default()
            .push_back(Response::new(status, body.as_bytes().to_vec()));
        self
    }

    pub fn on_json(&self, method: HttpMethod, url: &str, status: u16, body: Value) -> &Self {
        self.on(method, url, status, &body.to_string())
    }

    /// Drop anything queued for `(method, url)` and answer with this instead.
    pub fn replace(&self, method: HttpMethod, url: &str, status: u16, body: &str) -> &Self {
        self.routes.borrow_mut().remove(&(method, url.to_string()));
        self.on(method, url, status, body)
    }

    /// Make `(method, url)` fail at the network level.
    pub fn fail(&self, method: HttpMethod, url: &str) -> &Self {
        self.failing.borrow_mut().insert((method, url.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.borrow().clone()
    }

    /// Recorded requests excluding `GET`s.
    pub fn mutations(&self) -> Vec<RecordedRequest> {
        self.log
            .borrow()
            .iter()
            .filter(|r| r.method != HttpMethod::Get)
            .cloned()
            .collect()
    }

    pub fn count(&self, method: HttpMethod, url: &str) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    pub fn sent(&self, method: HttpMethod, url: &str) -> bool {
        self.count(method, url) > 0
    }
}

impl Transport for ScriptedTransport {
    fn send(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &Headers,
        form: &FormData,
    ) -> Result<Response, TransportError> {
        self.log.borrow_mut().push(RecordedRequest {
            method,
            url: url.to_string(),
            headers: headers.clone(),
            form: form.clone(),
        });

        let route = (method, url.to_string());
        if self.failing.borrow().contains(&route) {
            return Err(TransportError::Network {
                url: url.to_string(),
                message: "scripted network failure".to_string(),
            });
        }

        let mut routes = self.routes.borrow_mut();
        let response = match routes.get_mut(&route) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| Response::new(404, r#"{"msg":"Record not found"}"#)))
    }
}

/// [`Notifier`] that keeps every `(message, category)` it is given.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: RefCell<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, message: &str, category: &str) {
        self.sent
            .borrow_mut()
            .push((message.to_string(), category.to_string()));
    }
}
