//! Notifier that keeps what it was sent.

use std::sync::Mutex;

use crate::error::PortError;
use crate::ports::notify::{Notification, Notifier};
use crate::ports::tasks::PortFuture;

/// Records `(identity, notification)` pairs, optionally failing every call.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, Notification)>>,
    failing: bool,
}

impl RecordingNotifier {
    /// A notifier that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every delivery fails (after recording the attempt).
    #[must_use]
    pub fn failing() -> Self {
        Self { sent: Mutex::new(Vec::new()), failing: true }
    }

    /// Everything delivered or attempted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<(String, Notification)> {
        self.sent.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }
}

impl RecordingNotifier {
    fn deliver(&self, identity: &str, notification: &Notification) -> Result<(), PortError> {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((identity.to_string(), notification.clone()));
        if self.failing {
            return Err("notification service unavailable".into());
        }
        Ok(())
    }
}

impl Notifier for RecordingNotifier {
    fn notify<'a>(
        &'a self,
        identity: &'a str,
        notification: &'a Notification,
    ) -> PortFuture<'a, ()> {
        Box::pin(async move { self.deliver(identity, notification) })
    }
}
