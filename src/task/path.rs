//! Fully-qualified storage location of a workspace task.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Where a workspace task lives, e.g. `workspaces/acme/projects/site/tasks/t-1`.
///
/// Updates and deletes of workspace tasks are addressed by this path, never by
/// id alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskPath(String);

/// The components of a [`TaskPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPathParts<'a> {
    /// Owning workspace.
    pub workspace_id: &'a str,
    /// Owning project.
    pub project_id: &'a str,
    /// Task id.
    pub task_id: &'a str,
}

impl TaskPath {
    /// Builds the path for a task in the given workspace project.
    #[must_use]
    pub fn new(workspace_id: &str, project_id: &str, task_id: &str) -> Self {
        Self(format!("workspaces/{workspace_id}/projects/{project_id}/tasks/{task_id}"))
    }

    /// Splits the path into workspace, project and task ids.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if the path is not of the form
    /// `workspaces/<ws>/projects/<project>/tasks/<id>`.
    pub fn parts(&self) -> Result<TaskPathParts<'_>> {
        let segments: Vec<&str> = self.0.split('/').collect();
        match segments.as_slice() {
            ["workspaces", ws, "projects", project, "tasks", id]
                if is_plain_segment(ws) && is_plain_segment(project) && is_plain_segment(id) =>
            {
                Ok(TaskPathParts { workspace_id: ws, project_id: project, task_id: id })
            }
            _ => Err(Error::InvalidPath(self.0.clone())),
        }
    }

    /// The path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether `segment` is safe to use as one path component: non-empty, not
/// `.` or `..`, and free of separators.
#[must_use]
pub fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains(['/', '\\'])
}

impl From<String> for TaskPath {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TaskPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
