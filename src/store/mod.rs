//! File-backed task store: personal calendars, workspace projects and
//! project metadata as YAML documents under one root.
//!
//! All I/O goes through the `FileSystem` port. Directory layout:
//!
//! ```text
//! <root>/
//!   ├── users/<identity>/tasks/<id>.yaml
//!   └── workspaces/<workspace>/projects/<project>/
//!         ├── project.yaml
//!         └── tasks/<id>.yaml
//! ```
//!
//! A workspace task's path is its document location relative to the root,
//! without the extension.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::error::{Error, PortError, Result};
use crate::ports::filesystem::FileSystem;
use crate::ports::id_gen::IdGenerator;
use crate::ports::projects::{ProjectDirectory, ProjectMeta};
use crate::ports::tasks::{
    FeedEvent, PersonalTaskStore, PortFuture, TaskFeed, WorkspaceTaskStore,
};
use crate::task::{
    is_plain_segment, TaskDraft, TaskFields, TaskPatch, TaskPath, WorkspaceOrigin,
    WorkspaceTaskRecord,
};

#[derive(Default)]
struct Feeds {
    personal: HashMap<String, watch::Sender<FeedEvent<TaskFields>>>,
    assigned: HashMap<String, watch::Sender<FeedEvent<WorkspaceTaskRecord>>>,
}

/// Task store persisted as YAML documents.
///
/// Subscriptions opened through the port traits are republished after every
/// successful write made through the same store.
pub struct FileTaskStore {
    fs: Box<dyn FileSystem>,
    ids: Box<dyn IdGenerator>,
    root: PathBuf,
    feeds: Mutex<Feeds>,
}

impl FileTaskStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(fs: Box<dyn FileSystem>, ids: Box<dyn IdGenerator>, root: &Path) -> Self {
        Self { fs, ids, root: root.to_path_buf(), feeds: Mutex::new(Feeds::default()) }
    }

    /// The store's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn feeds(&self) -> MutexGuard<'_, Feeds> {
        self.feeds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- layout ---

    // Every id joined into a path must be a single plain component.

    fn personal_dir(&self, owner: &str) -> Result<PathBuf> {
        Ok(self.root.join("users").join(segment("owner", owner)?).join("tasks"))
    }

    fn personal_doc(&self, owner: &str, id: &str) -> Result<PathBuf> {
        Ok(self.personal_dir(owner)?.join(format!("{}.yaml", segment("task id", id)?)))
    }

    fn project_dir(&self, workspace_id: &str, project_id: &str) -> Result<PathBuf> {
        Ok(self
            .root
            .join("workspaces")
            .join(segment("workspace id", workspace_id)?)
            .join("projects")
            .join(segment("project id", project_id)?))
    }

    fn workspace_doc(&self, path: &TaskPath) -> Result<PathBuf> {
        let parts = path.parts()?;
        Ok(self
            .project_dir(parts.workspace_id, parts.project_id)?
            .join("tasks")
            .join(format!("{}.yaml", parts.task_id)))
    }

    fn list(&self, dir: &Path) -> Result<Vec<String>> {
        if !self.fs.exists(dir) {
            return Ok(Vec::new());
        }
        self.fs
            .list_dir(dir)
            .map_err(|e| Error::store(format!("list {}", dir.display()), e))
    }

    fn read_doc(&self, path: &Path) -> Result<TaskFields> {
        let contents = self
            .fs
            .read_to_string(path)
            .map_err(|e| Error::store(format!("read {}", path.display()), e))?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    fn write_doc(&self, path: &Path, fields: &TaskFields) -> Result<()> {
        let yaml = serde_yaml::to_string(fields)?;
        self.fs
            .write(path, &yaml)
            .map_err(|e| Error::store(format!("write {}", path.display()), e))
    }

    /// Reads every `.yaml` task document in `dir`, skipping unreadable ones.
    ///
    /// The file name is the task's id; a document claiming another id is
    /// corrected so later writes can find it.
    fn read_task_dir(&self, dir: &Path) -> Result<Vec<TaskFields>> {
        let mut tasks = Vec::new();
        for name in self.list(dir)? {
            let Some(stem) = name.strip_suffix(".yaml") else {
                continue;
            };
            let path = dir.join(&name);
            match self.read_doc(&path) {
                Ok(mut fields) => {
                    if fields.id != stem {
                        tracing::warn!(path = %path.display(), id = %fields.id, "task id does not match file name");
                        fields.id = stem.to_string();
                    }
                    tasks.push(fields);
                }
                Err(e) => tracing::warn!(path = %path.display(), "skipping task document: {e}"),
            }
        }
        Ok(tasks)
    }

    // --- queries ---

    /// The owner's personal tasks, ascending by `start`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an owner that is not a plain
    /// name, or an error if the owner's task directory cannot be listed.
    pub fn load_personal(&self, owner: &str) -> Result<Vec<TaskFields>> {
        let mut tasks = self.read_task_dir(&self.personal_dir(owner)?)?;
        tasks.sort_by(|a, b| a.start.cmp(&b.start));
        Ok(tasks)
    }

    /// Every workspace task listing `identity` as an assignee.
    ///
    /// # Errors
    ///
    /// Returns an error if a workspace or project directory cannot be listed.
    pub fn load_assigned(&self, identity: &str) -> Result<Vec<WorkspaceTaskRecord>> {
        let mut records = Vec::new();
        let workspaces = self.root.join("workspaces");
        for workspace_id in self.list(&workspaces)? {
            let projects = workspaces.join(&workspace_id).join("projects");
            for project_id in self.list(&projects)? {
                let dir = projects.join(&project_id).join("tasks");
                for fields in self.read_task_dir(&dir)? {
                    if !fields.assignees.iter().any(|a| a == identity) {
                        continue;
                    }
                    let path = TaskPath::new(&workspace_id, &project_id, &fields.id);
                    records.push(WorkspaceTaskRecord {
                        fields,
                        origin: WorkspaceOrigin {
                            workspace_id: workspace_id.clone(),
                            project_id: project_id.clone(),
                            path,
                        },
                    });
                }
            }
        }
        Ok(records)
    }

    /// Reads a project's metadata document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing or malformed.
    pub fn load_project(&self, workspace_id: &str, project_id: &str) -> Result<ProjectMeta> {
        let path = self.project_dir(workspace_id, project_id)?.join("project.yaml");
        let contents = self
            .fs
            .read_to_string(&path)
            .map_err(|e| Error::store(format!("read project {workspace_id}/{project_id}"), e))?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    // --- workspace administration ---

    /// Writes a project's metadata document, creating the project.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn create_project(
        &self,
        workspace_id: &str,
        project_id: &str,
        meta: &ProjectMeta,
    ) -> Result<()> {
        let path = self.project_dir(workspace_id, project_id)?.join("project.yaml");
        let yaml = serde_yaml::to_string(meta)?;
        self.fs
            .write(&path, &yaml)
            .map_err(|e| Error::store(format!("create project {workspace_id}/{project_id}"), e))?;
        tracing::debug!(workspace_id, project_id, "project created");
        Ok(())
    }

    /// Creates a task inside a workspace project and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the project does not exist or the write fails.
    pub fn create_workspace_task(
        &self,
        workspace_id: &str,
        project_id: &str,
        draft: TaskDraft,
    ) -> Result<TaskPath> {
        let project = self.project_dir(workspace_id, project_id)?;
        if !self.fs.exists(&project.join("project.yaml")) {
            return Err(Error::InvalidArgument(format!(
                "unknown project {workspace_id}/{project_id}"
            )));
        }
        let fields = draft.into_fields(self.ids.generate_id());
        let path = TaskPath::new(workspace_id, project_id, &fields.id);
        self.write_doc(&self.workspace_doc(&path)?, &fields)?;
        tracing::debug!(path = %path, "workspace task created");
        self.publish_assigned();
        Ok(path)
    }

    // --- writes ---

    /// Creates a personal task and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn create_personal(&self, owner: &str, draft: TaskDraft) -> Result<String> {
        let fields = draft.into_fields(self.ids.generate_id());
        self.write_doc(&self.personal_doc(owner, &fields.id)?, &fields)?;
        self.publish_personal(owner);
        Ok(fields.id)
    }

    /// Applies `patch` to a personal task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `owner` or `id` is not a plain
    /// name, or [`Error::TaskNotFound`] if the task does not exist.
    pub fn update_personal(&self, owner: &str, id: &str, patch: &TaskPatch) -> Result<()> {
        let path = self.personal_doc(owner, id)?;
        if !self.fs.exists(&path) {
            return Err(Error::TaskNotFound(id.to_string()));
        }
        let mut fields = self.read_doc(&path)?;
        patch.apply(&mut fields);
        self.write_doc(&path, &fields)?;
        self.publish_personal(owner);
        Ok(())
    }

    /// Deletes a personal task.
    ///
    /// # Errors
    ///
    /// Same as [`update_personal`](Self::update_personal).
    pub fn delete_personal(&self, owner: &str, id: &str) -> Result<()> {
        let path = self.personal_doc(owner, id)?;
        if !self.fs.exists(&path) {
            return Err(Error::TaskNotFound(id.to_string()));
        }
        self.fs.remove(&path).map_err(|e| Error::store(format!("delete task {id}"), e))?;
        self.publish_personal(owner);
        Ok(())
    }

    /// Applies `patch` to the workspace task at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] or [`Error::TaskNotFound`] if `path`
    /// does not name a stored task.
    pub fn update_workspace(&self, path: &TaskPath, patch: &TaskPatch) -> Result<()> {
        let doc = self.workspace_doc(path)?;
        if !self.fs.exists(&doc) {
            return Err(Error::TaskNotFound(path.to_string()));
        }
        let mut fields = self.read_doc(&doc)?;
        patch.apply(&mut fields);
        self.write_doc(&doc, &fields)?;
        self.publish_assigned();
        Ok(())
    }

    /// Deletes the workspace task at `path`.
    ///
    /// # Errors
    ///
    /// Same as [`update_workspace`](Self::update_workspace).
    pub fn delete_workspace(&self, path: &TaskPath) -> Result<()> {
        let doc = self.workspace_doc(path)?;
        if !self.fs.exists(&doc) {
            return Err(Error::TaskNotFound(path.to_string()));
        }
        self.fs.remove(&doc).map_err(|e| Error::store(format!("delete task {path}"), e))?;
        self.publish_assigned();
        Ok(())
    }

    // --- feeds ---

    fn personal_event(&self, owner: &str) -> FeedEvent<TaskFields> {
        match self.load_personal(owner) {
            Ok(tasks) => FeedEvent::Snapshot(tasks),
            Err(e) => FeedEvent::Failed(e.to_string()),
        }
    }

    fn assigned_event(&self, identity: &str) -> FeedEvent<WorkspaceTaskRecord> {
        match self.load_assigned(identity) {
            Ok(records) => FeedEvent::Snapshot(records),
            Err(e) => FeedEvent::Failed(e.to_string()),
        }
    }

    fn publish_personal(&self, owner: &str) {
        let feeds = self.feeds();
        if let Some(tx) = feeds.personal.get(owner) {
            tx.send_replace(self.personal_event(owner));
        }
    }

    fn publish_assigned(&self) {
        let feeds = self.feeds();
        for (identity, tx) in &feeds.assigned {
            tx.send_replace(self.assigned_event(identity));
        }
    }
}

fn segment<'a>(kind: &str, value: &'a str) -> Result<&'a str> {
    if is_plain_segment(value) {
        Ok(value)
    } else {
        Err(Error::InvalidArgument(format!("{kind} {value:?} is not a plain name")))
    }
}

fn port_err(e: Error) -> PortError {
    Box::new(e)
}

impl PersonalTaskStore for FileTaskStore {
    fn subscribe(&self, owner: &str) -> std::result::Result<TaskFeed<TaskFields>, PortError> {
        let snapshot = self.load_personal(owner).map_err(port_err)?;
        let mut feeds = self.feeds();
        let tx = feeds
            .personal
            .entry(owner.to_string())
            .or_insert_with(|| watch::channel(FeedEvent::default()).0);
        tx.send_replace(FeedEvent::Snapshot(snapshot));
        Ok(tx.subscribe())
    }

    fn create<'a>(&'a self, owner: &'a str, draft: TaskDraft) -> PortFuture<'a, String> {
        Box::pin(std::future::ready(self.create_personal(owner, draft).map_err(port_err)))
    }

    fn update<'a>(
        &'a self,
        owner: &'a str,
        id: &'a str,
        patch: &'a TaskPatch,
    ) -> PortFuture<'a, ()> {
        Box::pin(std::future::ready(self.update_personal(owner, id, patch).map_err(port_err)))
    }

    fn delete<'a>(&'a self, owner: &'a str, id: &'a str) -> PortFuture<'a, ()> {
        Box::pin(std::future::ready(self.delete_personal(owner, id).map_err(port_err)))
    }
}

impl WorkspaceTaskStore for FileTaskStore {
    fn subscribe_assigned(
        &self,
        identity: &str,
    ) -> std::result::Result<TaskFeed<WorkspaceTaskRecord>, PortError> {
        let snapshot = self.load_assigned(identity).map_err(port_err)?;
        let mut feeds = self.feeds();
        let tx = feeds
            .assigned
            .entry(identity.to_string())
            .or_insert_with(|| watch::channel(FeedEvent::default()).0);
        tx.send_replace(FeedEvent::Snapshot(snapshot));
        Ok(tx.subscribe())
    }

    fn update_at<'a>(&'a self, path: &'a TaskPath, patch: &'a TaskPatch) -> PortFuture<'a, ()> {
        Box::pin(std::future::ready(self.update_workspace(path, patch).map_err(port_err)))
    }

    fn delete_at<'a>(&'a self, path: &'a TaskPath) -> PortFuture<'a, ()> {
        Box::pin(std::future::ready(self.delete_workspace(path).map_err(port_err)))
    }
}

impl ProjectDirectory for FileTaskStore {
    fn project_meta<'a>(
        &'a self,
        workspace_id: &'a str,
        project_id: &'a str,
    ) -> PortFuture<'a, ProjectMeta> {
        Box::pin(std::future::ready(self.load_project(workspace_id, project_id).map_err(port_err)))
    }
}
