//! Notification sink port.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tasks::PortFuture;

/// A message delivered to an identity's notification inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification type, e.g. `task_created`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable text.
    pub message: String,
    /// Task the notification refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// When the notification was raised.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Notification sent to the creator of a new task.
    #[must_use]
    pub fn task_created(task_id: &str, title: &str, at: DateTime<Utc>) -> Self {
        Self {
            kind: "task_created".to_string(),
            message: format!("New task created: {title}"),
            task_id: Some(task_id.to_string()),
            created_at: at,
        }
    }
}

/// Fire-and-forget delivery of notifications.
///
/// Callers log and discard failures; a failed notification never fails the
/// operation that raised it.
pub trait Notifier: Send + Sync {
    /// Delivers `notification` to `identity`.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    fn notify<'a>(&'a self, identity: &'a str, notification: &'a Notification)
        -> PortFuture<'a, ()>;
}
