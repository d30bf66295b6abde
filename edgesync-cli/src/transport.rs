//! Blocking HTTP transport over `ureq`.

use std::io::Read;
use std::time::Duration;

use edgesync_core::HttpMethod;
use edgesync_sync::{FormData, Headers, Response, Transport, TransportError};

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Transport for UreqTransport {
    fn send(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &Headers,
        form: &FormData,
    ) -> Result<Response, TransportError> {
        let mut request = self.agent.request(method.as_str(), url);
        for (name, value) in headers {
            request = request.set(name, value);
        }

        let result = if method.has_body() {
            let pairs: Vec<(&str, &str)> = form
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            request.send_form(&pairs)
        } else {
            request.call()
        };

        // ureq reports 4xx/5xx as errors; they are ordinary responses here.
        let response = match result {
            Ok(response) | Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => {
                return Err(TransportError::Network {
                    url: url.to_string(),
                    message: err.to_string(),
                })
            }
        };

        let status = response.status();
        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| TransportError::Body {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(Response::new(status, body))
    }
}
