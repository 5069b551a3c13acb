//! The merged task type seen by the aggregator.

use serde::Serialize;

use super::category::Category;
use super::path::TaskPath;
use super::record::{TaskFields, WorkspaceOrigin, WorkspaceTaskRecord};
use super::status::Status;

/// A task from one of the two sources.
///
/// The variant is decided when the aggregator merges the sources and never
/// changes afterwards: a task is never re-homed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Task {
    /// Owned by the current identity's personal calendar.
    Personal(TaskFields),
    /// Owned by a workspace project and assigned to the current identity.
    Workspace {
        /// The shared task fields.
        #[serde(flatten)]
        fields: TaskFields,
        /// Where the task lives.
        #[serde(flatten)]
        origin: WorkspaceOrigin,
    },
}

impl Task {
    /// The shared fields regardless of source.
    #[must_use]
    pub fn fields(&self) -> &TaskFields {
        match self {
            Self::Personal(fields) | Self::Workspace { fields, .. } => fields,
        }
    }

    /// Task id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.fields().id
    }

    /// Raw `start` string, if any.
    #[must_use]
    pub fn start(&self) -> Option<&str> {
        self.fields().start.as_deref()
    }

    /// Whether the task came from a workspace project.
    #[must_use]
    pub fn is_workspace_task(&self) -> bool {
        matches!(self, Self::Workspace { .. })
    }

    /// Storage path for workspace tasks.
    #[must_use]
    pub fn path(&self) -> Option<&TaskPath> {
        match self {
            Self::Personal(_) => None,
            Self::Workspace { origin, .. } => Some(&origin.path),
        }
    }

    /// Workspace origin, if any.
    #[must_use]
    pub fn origin(&self) -> Option<&WorkspaceOrigin> {
        match self {
            Self::Personal(_) => None,
            Self::Workspace { origin, .. } => Some(origin),
        }
    }

    /// Category used for filtering. Uncategorized tasks count as work.
    #[must_use]
    pub fn effective_category(&self) -> Category {
        self.fields().category.unwrap_or(Category::Work)
    }

    /// Done by status or by full progress.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let fields = self.fields();
        fields.progress == Some(100) || fields.status == Some(Status::Done)
    }
}

impl From<WorkspaceTaskRecord> for Task {
    fn from(record: WorkspaceTaskRecord) -> Self {
        Self::Workspace { fields: record.fields, origin: record.origin }
    }
}
