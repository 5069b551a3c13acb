//! Task store ports: the personal calendar and the workspace projects.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::watch;

use crate::error::PortError;
use crate::task::{TaskDraft, TaskFields, TaskPatch, TaskPath, WorkspaceTaskRecord};

/// Boxed future returned by async port methods, keeping the traits dyn-compatible.
pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PortError>> + Send + 'a>>;

/// One emission of a live task subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent<T> {
    /// The complete current contents of the source.
    Snapshot(Vec<T>),
    /// The subscription broke. Consumers treat the source as empty.
    Failed(String),
}

impl<T> Default for FeedEvent<T> {
    fn default() -> Self {
        Self::Snapshot(Vec::new())
    }
}

/// Receiving end of a live subscription. Holds the latest snapshot only.
pub type TaskFeed<T> = watch::Receiver<FeedEvent<T>>;

/// The current identity's personal calendar tasks.
///
/// Tasks are keyed by id under a per-owner namespace.
pub trait PersonalTaskStore: Send + Sync {
    /// Subscribes to the owner's tasks, ordered by `start` ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription cannot be established.
    fn subscribe(&self, owner: &str) -> Result<TaskFeed<TaskFields>, PortError>;

    /// Creates a task from `draft` and returns its new id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    fn create<'a>(&'a self, owner: &'a str, draft: TaskDraft) -> PortFuture<'a, String>;

    /// Applies `patch` to the owner's task `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the task does not exist or the write is rejected.
    fn update<'a>(&'a self, owner: &'a str, id: &'a str, patch: &'a TaskPatch)
        -> PortFuture<'a, ()>;

    /// Deletes the owner's task `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the task does not exist or the delete is rejected.
    fn delete<'a>(&'a self, owner: &'a str, id: &'a str) -> PortFuture<'a, ()>;
}

/// Tasks living in workspace projects, addressed by their storage path.
pub trait WorkspaceTaskStore: Send + Sync {
    /// Subscribes to every workspace task listing `identity` as an assignee.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription cannot be established (for
    /// example when the backing query needs an index that does not exist).
    fn subscribe_assigned(
        &self,
        identity: &str,
    ) -> Result<TaskFeed<WorkspaceTaskRecord>, PortError>;

    /// Applies `patch` to the task stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the task does not exist or the write is rejected.
    fn update_at<'a>(&'a self, path: &'a TaskPath, patch: &'a TaskPatch) -> PortFuture<'a, ()>;

    /// Deletes the task stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the task does not exist or the delete is rejected.
    fn delete_at<'a>(&'a self, path: &'a TaskPath) -> PortFuture<'a, ()>;
}
