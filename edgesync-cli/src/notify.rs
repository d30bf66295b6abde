//! Webhook notifier: `{"text": "[category] message"}` posted as JSON.

use std::time::Duration;

use edgesync_sync::Notifier;

pub struct WebhookNotifier {
    agent: ureq::Agent,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: &str, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            url: url.to_string(),
        }
    }
}

impl Notifier for WebhookNotifier {
    fn send(&self, message: &str, category: &str) {
        let payload = serde_json::json!({ "text": format!("[{category}] {message}") });
        match self.agent.post(&self.url).send_json(payload) {
            Ok(_) => tracing::debug!(category, "notification delivered"),
            Err(err) => tracing::warn!(category, "webhook notification failed: {err}"),
        }
    }
}
