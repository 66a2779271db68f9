//! User notification seam.
//!
//! Notifications are fire-and-forget with no delivery guarantee; the
//! evaluator and aggregator never depend on whether one landed.

use std::sync::Mutex;

/// Sends user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Writes notifications to the log (and stdout when enabled).
///
/// Stands in for a desktop notification center in the CLI deployment.
pub struct LogNotifier {
    enabled: bool,
}

impl LogNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) {
        if !self.enabled {
            log::debug!("notification suppressed: {title}");
            return;
        }
        log::info!("notification: {title} -- {body}");
        println!("[notify] {title}: {body}");
    }
}

/// Captures notifications for assertions in tests.
#[derive(Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("notifier lock poisoned").clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().expect("notifier lock poisoned").len()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, title: &str, body: &str) {
        self.sent
            .lock()
            .expect("notifier lock poisoned")
            .push((title.to_string(), body.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_notifier_records_in_order() {
        let n = MemoryNotifier::new();
        n.notify("first", "a");
        n.notify("second", "b");
        let sent = n.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "first");
        assert_eq!(sent[1].1, "b");
    }
}
