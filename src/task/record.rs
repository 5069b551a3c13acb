//! Task records as stored by the sources, plus drafts and patches.

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::path::TaskPath;
use super::status::Status;

/// Fields shared by every task, personal or workspace.
///
/// This is also the document shape a personal store emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    /// Opaque identifier, stable for the task's lifetime.
    pub id: String,
    /// Display title.
    pub title: String,
    /// ISO-8601 start. Missing on malformed records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// ISO-8601 end. Absent for point-in-time events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Display category. Absent on older records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Color stamped at creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Workflow status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Completion percentage, 0 to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Identities the task is assigned to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}

impl TaskFields {
    /// Creates a minimal record with only an id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start: None,
            end: None,
            category: None,
            color: None,
            status: None,
            progress: None,
            description: None,
            assignees: Vec::new(),
        }
    }
}

/// Where a workspace task came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceOrigin {
    /// Owning workspace.
    pub workspace_id: String,
    /// Owning project.
    pub project_id: String,
    /// Storage location used to route updates and deletes.
    pub path: TaskPath,
}

/// A task document as emitted by a workspace store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceTaskRecord {
    /// The shared task fields.
    #[serde(flatten)]
    pub fields: TaskFields,
    /// Workspace, project and path of the document.
    #[serde(flatten)]
    pub origin: WorkspaceOrigin,
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Display title.
    pub title: String,
    /// ISO-8601 start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// ISO-8601 end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Display category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Explicit color. Filled from the category when left empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Identities to assign.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}

impl TaskDraft {
    /// Turns the draft into a stored record under the given id.
    #[must_use]
    pub fn into_fields(self, id: impl Into<String>) -> TaskFields {
        TaskFields {
            id: id.into(),
            title: self.title,
            start: self.start,
            end: self.end,
            category: self.category,
            color: self.color,
            status: self.status,
            progress: None,
            description: self.description,
            assignees: self.assignees,
        }
    }
}

/// A partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// New end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// New category. The stored color is not re-derived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// New color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// New status. Any status may follow any other.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// New progress, clamped to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TaskPatch {
    /// The patch applied by "mark complete": progress 100 and status done.
    #[must_use]
    pub fn complete() -> Self {
        Self { progress: Some(100), status: Some(Status::Done), ..Self::default() }
    }

    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Writes the patch onto a record in place.
    pub fn apply(&self, fields: &mut TaskFields) {
        if let Some(title) = &self.title {
            fields.title.clone_from(title);
        }
        if let Some(start) = &self.start {
            fields.start = Some(start.clone());
        }
        if let Some(end) = &self.end {
            fields.end = Some(end.clone());
        }
        if let Some(category) = self.category {
            fields.category = Some(category);
        }
        if let Some(color) = &self.color {
            fields.color = Some(color.clone());
        }
        if let Some(status) = self.status {
            fields.status = Some(status);
        }
        if let Some(progress) = self.progress {
            fields.progress = Some(progress.min(100));
        }
        if let Some(description) = &self.description {
            fields.description = Some(description.clone());
        }
    }
}
