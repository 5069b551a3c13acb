//! In-memory personal and workspace task stores.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::error::PortError;
use crate::ports::projects::{ProjectDirectory, ProjectMeta};
use crate::ports::tasks::{
    FeedEvent, PersonalTaskStore, PortFuture, TaskFeed, WorkspaceTaskStore,
};
use crate::task::{TaskDraft, TaskFields, TaskPatch, TaskPath, WorkspaceTaskRecord};

/// A call received by [`MemoryTaskStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `PersonalTaskStore::create`.
    Create {
        /// Namespace owner.
        owner: String,
        /// Draft title.
        title: String,
    },
    /// `PersonalTaskStore::update`.
    Update {
        /// Namespace owner.
        owner: String,
        /// Task id.
        id: String,
        /// Patch sent.
        patch: TaskPatch,
    },
    /// `PersonalTaskStore::delete`.
    Delete {
        /// Namespace owner.
        owner: String,
        /// Task id.
        id: String,
    },
    /// `WorkspaceTaskStore::update_at`.
    UpdateAt {
        /// Target path.
        path: TaskPath,
        /// Patch sent.
        patch: TaskPatch,
    },
    /// `WorkspaceTaskStore::delete_at`.
    DeleteAt {
        /// Target path.
        path: TaskPath,
    },
    /// `ProjectDirectory::project_meta`.
    ProjectMeta {
        /// Workspace looked up.
        workspace_id: String,
        /// Project looked up.
        project_id: String,
    },
}

#[derive(Default)]
struct State {
    personal: HashMap<String, Vec<TaskFields>>,
    workspace: Vec<WorkspaceTaskRecord>,
    projects: HashMap<(String, String), ProjectMeta>,
    calls: Vec<StoreCall>,
    personal_feeds: HashMap<String, watch::Sender<FeedEvent<TaskFields>>>,
    workspace_feeds: HashMap<String, watch::Sender<FeedEvent<WorkspaceTaskRecord>>>,
    next_id: u64,
    fail_writes: bool,
    refuse_workspace_subscriptions: bool,
}

impl State {
    fn personal_snapshot(&self, owner: &str) -> Vec<TaskFields> {
        let mut tasks = self.personal.get(owner).cloned().unwrap_or_default();
        tasks.sort_by(|a, b| a.start.cmp(&b.start));
        tasks
    }

    fn assigned_snapshot(&self, identity: &str) -> Vec<WorkspaceTaskRecord> {
        self.workspace
            .iter()
            .filter(|r| r.fields.assignees.iter().any(|a| a == identity))
            .cloned()
            .collect()
    }

    fn publish_personal(&self, owner: &str) {
        if let Some(tx) = self.personal_feeds.get(owner) {
            tx.send_replace(FeedEvent::Snapshot(self.personal_snapshot(owner)));
        }
    }

    fn publish_workspace(&self) {
        for (identity, tx) in &self.workspace_feeds {
            tx.send_replace(FeedEvent::Snapshot(self.assigned_snapshot(identity)));
        }
    }

    fn check_writable(&self) -> Result<(), PortError> {
        if self.fail_writes {
            return Err("store rejected the write".into());
        }
        Ok(())
    }
}

/// Personal store, workspace store and project directory held in memory.
///
/// Subscriptions are live: every successful write republishes the affected
/// snapshots. Every port call is logged and can be read back with
/// [`MemoryTaskStore::calls`].
#[derive(Default)]
pub struct MemoryTaskStore {
    state: Mutex<State>,
}

impl MemoryTaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the owner's personal tasks and republishes.
    pub fn seed_personal(&self, owner: &str, tasks: Vec<TaskFields>) {
        let mut state = self.state();
        state.personal.insert(owner.to_string(), tasks);
        state.publish_personal(owner);
    }

    /// Replaces all workspace tasks and republishes.
    pub fn seed_workspace(&self, records: Vec<WorkspaceTaskRecord>) {
        let mut state = self.state();
        state.workspace = records;
        state.publish_workspace();
    }

    /// Registers project metadata.
    pub fn seed_project(&self, workspace_id: &str, project_id: &str, meta: ProjectMeta) {
        self.state().projects.insert((workspace_id.to_string(), project_id.to_string()), meta);
    }

    /// Breaks every open workspace subscription with `reason`.
    pub fn break_workspace_feeds(&self, reason: &str) {
        for tx in self.state().workspace_feeds.values() {
            tx.send_replace(FeedEvent::Failed(reason.to_string()));
        }
    }

    /// Makes every subsequent create, update and delete fail.
    pub fn fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Makes `subscribe_assigned` refuse to open a subscription.
    pub fn refuse_workspace_subscriptions(&self, refuse: bool) {
        self.state().refuse_workspace_subscriptions = refuse;
    }

    /// The calls received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state().calls.clone()
    }

    /// The owner's stored personal tasks.
    #[must_use]
    pub fn personal_tasks(&self, owner: &str) -> Vec<TaskFields> {
        self.state().personal_snapshot(owner)
    }

    /// A stored workspace task by path.
    #[must_use]
    pub fn workspace_task(&self, path: &TaskPath) -> Option<WorkspaceTaskRecord> {
        self.state().workspace.iter().find(|r| &r.origin.path == path).cloned()
    }
}

impl MemoryTaskStore {
    fn create_now(&self, owner: &str, draft: TaskDraft) -> Result<String, PortError> {
        let mut state = self.state();
        state.calls.push(StoreCall::Create { owner: owner.to_string(), title: draft.title.clone() });
        state.check_writable()?;
        state.next_id += 1;
        let id = format!("mem-{}", state.next_id);
        state.personal.entry(owner.to_string()).or_default().push(draft.into_fields(id.clone()));
        state.publish_personal(owner);
        Ok(id)
    }

    fn update_now(&self, owner: &str, id: &str, patch: &TaskPatch) -> Result<(), PortError> {
        let mut state = self.state();
        state.calls.push(StoreCall::Update {
            owner: owner.to_string(),
            id: id.to_string(),
            patch: patch.clone(),
        });
        state.check_writable()?;
        let task = state
            .personal
            .get_mut(owner)
            .and_then(|tasks| tasks.iter_mut().find(|t| t.id == id))
            .ok_or_else(|| format!("no personal task {id} for {owner}"))?;
        patch.apply(task);
        state.publish_personal(owner);
        Ok(())
    }

    fn delete_now(&self, owner: &str, id: &str) -> Result<(), PortError> {
        let mut state = self.state();
        state.calls.push(StoreCall::Delete { owner: owner.to_string(), id: id.to_string() });
        state.check_writable()?;
        let tasks = state.personal.entry(owner.to_string()).or_default();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(format!("no personal task {id} for {owner}").into());
        }
        state.publish_personal(owner);
        Ok(())
    }

    fn update_at_now(&self, path: &TaskPath, patch: &TaskPatch) -> Result<(), PortError> {
        let mut state = self.state();
        state.calls.push(StoreCall::UpdateAt { path: path.clone(), patch: patch.clone() });
        state.check_writable()?;
        let record = state
            .workspace
            .iter_mut()
            .find(|r| &r.origin.path == path)
            .ok_or_else(|| format!("no workspace task at {path}"))?;
        patch.apply(&mut record.fields);
        state.publish_workspace();
        Ok(())
    }

    fn delete_at_now(&self, path: &TaskPath) -> Result<(), PortError> {
        let mut state = self.state();
        state.calls.push(StoreCall::DeleteAt { path: path.clone() });
        state.check_writable()?;
        let before = state.workspace.len();
        state.workspace.retain(|r| &r.origin.path != path);
        if state.workspace.len() == before {
            return Err(format!("no workspace task at {path}").into());
        }
        state.publish_workspace();
        Ok(())
    }

    fn project_meta_now(
        &self,
        workspace_id: &str,
        project_id: &str,
    ) -> Result<ProjectMeta, PortError> {
        let mut state = self.state();
        state.calls.push(StoreCall::ProjectMeta {
            workspace_id: workspace_id.to_string(),
            project_id: project_id.to_string(),
        });
        state
            .projects
            .get(&(workspace_id.to_string(), project_id.to_string()))
            .cloned()
            .ok_or_else(|| format!("unknown project {workspace_id}/{project_id}").into())
    }
}

impl PersonalTaskStore for MemoryTaskStore {
    fn subscribe(&self, owner: &str) -> Result<TaskFeed<TaskFields>, PortError> {
        let mut state = self.state();
        let snapshot = FeedEvent::Snapshot(state.personal_snapshot(owner));
        let tx = state
            .personal_feeds
            .entry(owner.to_string())
            .or_insert_with(|| watch::channel(FeedEvent::default()).0);
        tx.send_replace(snapshot);
        Ok(tx.subscribe())
    }

    fn create<'a>(&'a self, owner: &'a str, draft: TaskDraft) -> PortFuture<'a, String> {
        Box::pin(async move { self.create_now(owner, draft) })
    }

    fn update<'a>(
        &'a self,
        owner: &'a str,
        id: &'a str,
        patch: &'a TaskPatch,
    ) -> PortFuture<'a, ()> {
        Box::pin(async move { self.update_now(owner, id, patch) })
    }

    fn delete<'a>(&'a self, owner: &'a str, id: &'a str) -> PortFuture<'a, ()> {
        Box::pin(async move { self.delete_now(owner, id) })
    }
}

impl WorkspaceTaskStore for MemoryTaskStore {
    fn subscribe_assigned(
        &self,
        identity: &str,
    ) -> Result<TaskFeed<WorkspaceTaskRecord>, PortError> {
        let mut state = self.state();
        if state.refuse_workspace_subscriptions {
            return Err("assigned-task query requires a missing index".into());
        }
        let snapshot = FeedEvent::Snapshot(state.assigned_snapshot(identity));
        let tx = state
            .workspace_feeds
            .entry(identity.to_string())
            .or_insert_with(|| watch::channel(FeedEvent::default()).0);
        tx.send_replace(snapshot);
        Ok(tx.subscribe())
    }

    fn update_at<'a>(&'a self, path: &'a TaskPath, patch: &'a TaskPatch) -> PortFuture<'a, ()> {
        Box::pin(async move { self.update_at_now(path, patch) })
    }

    fn delete_at<'a>(&'a self, path: &'a TaskPath) -> PortFuture<'a, ()> {
        Box::pin(async move { self.delete_at_now(path) })
    }
}

impl ProjectDirectory for MemoryTaskStore {
    fn project_meta<'a>(
        &'a self,
        workspace_id: &'a str,
        project_id: &'a str,
    ) -> PortFuture<'a, ProjectMeta> {
        Box::pin(async move { self.project_meta_now(workspace_id, project_id) })
    }
}
