//! Outcome notification seam.

/// Notification categories.
pub mod category {
    pub const EDGE_LOGIC: &str = "edge_logic";
    pub const MAINTENANCE_PAGE: &str = "maintenance_page";
}

/// Fire-and-forget sink for run outcomes. Implementations swallow their own failures.
pub trait Notifier {
    fn send(&self, message: &str, category: &str);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn send(&self, message: &str, category: &str) {
        (**self).send(message, category)
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn send(&self, message: &str, category: &str) {
        (**self).send(message, category)
    }
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn send(&self, message: &str, category: &str) {
        tracing::debug!(category, "notification dropped: {message}");
    }
}
