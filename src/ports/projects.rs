//! Project metadata lookup port.

use serde::{Deserialize, Serialize};

use super::tasks::PortFuture;

/// Display metadata for a workspace project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMeta {
    /// Project name.
    pub name: String,
    /// Accent color.
    #[serde(default)]
    pub color: Option<String>,
    /// Icon emoji.
    #[serde(default)]
    pub emoji: Option<String>,
}

/// Resolves project metadata. Results may be cached indefinitely.
pub trait ProjectDirectory: Send + Sync {
    /// Looks up the metadata of `project_id` in `workspace_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is unknown or the lookup fails.
    fn project_meta<'a>(
        &'a self,
        workspace_id: &'a str,
        project_id: &'a str,
    ) -> PortFuture<'a, ProjectMeta>;
}
