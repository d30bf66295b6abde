//! Per-run error accumulator.

use crate::error::SyncError;

/// Ordered, append-only list of human-readable errors for one run.
///
/// Every entry is also emitted at `error` level as it is recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLog(Vec<String>);

impl ErrorLog {
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{message}");
        self.0.push(message);
    }

    pub fn record(&mut self, err: &SyncError) {
        self.push(err.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}
