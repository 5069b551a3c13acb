//! Task aggregator: one filterable view over personal and workspace tasks.
//!
//! The aggregator holds the latest snapshot of each source and re-derives
//! every view from them on demand. It never edits a task itself: mutations
//! are routed to the store that owns the task, and the change comes back
//! through that store's feed.
//!
//! ```text
//! personal feed ──┐
//!                 ├─► merge ─► filter ─► today / upcoming / by category
//! workspace feed ─┘
//! ```

mod route;
pub mod views;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};

use crate::error::{Error, Result};
use crate::ports::clock::Clock;
use crate::ports::notify::{Notification, Notifier};
use crate::ports::projects::{ProjectDirectory, ProjectMeta};
use crate::ports::tasks::{FeedEvent, PersonalTaskStore, TaskFeed, WorkspaceTaskStore};
use crate::task::{Category, FilterSet, Task, TaskDraft, TaskFields, TaskPatch, WorkspaceTaskRecord};

pub use route::{Route, UnknownIdPolicy};

/// Number of tasks returned by [`TaskAggregator::upcoming_tasks`] callers
/// that have no preference.
pub const DEFAULT_UPCOMING_LIMIT: usize = 5;

/// Which source a feed emission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The personal calendar.
    Personal,
    /// Workspace projects.
    Workspace,
}

/// Builder for [`TaskAggregator`].
pub struct TaskAggregatorBuilder {
    identity: String,
    clock: Arc<dyn Clock>,
    personal: Arc<dyn PersonalTaskStore>,
    workspace: Option<Arc<dyn WorkspaceTaskStore>>,
    projects: Option<Arc<dyn ProjectDirectory>>,
    notifier: Option<Arc<dyn Notifier>>,
    local_offset: FixedOffset,
    unknown_id_policy: UnknownIdPolicy,
    filters: FilterSet,
}

impl TaskAggregatorBuilder {
    /// Adds the workspace task source.
    #[must_use]
    pub fn workspace(mut self, store: Arc<dyn WorkspaceTaskStore>) -> Self {
        self.workspace = Some(store);
        self
    }

    /// Adds the project metadata lookup.
    #[must_use]
    pub fn projects(mut self, directory: Arc<dyn ProjectDirectory>) -> Self {
        self.projects = Some(directory);
        self
    }

    /// Adds the notification sink used when tasks are created.
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Sets the UTC offset that defines the local calendar day.
    #[must_use]
    pub fn local_offset(mut self, offset: FixedOffset) -> Self {
        self.local_offset = offset;
        self
    }

    /// Sets the routing policy for ids missing from the view.
    #[must_use]
    pub fn unknown_id_policy(mut self, policy: UnknownIdPolicy) -> Self {
        self.unknown_id_policy = policy;
        self
    }

    /// Sets the initial filter state.
    #[must_use]
    pub fn filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    /// Opens the subscriptions and takes their first snapshots.
    ///
    /// A source whose subscription cannot be opened is treated as empty.
    #[must_use]
    pub fn build(self) -> TaskAggregator {
        let personal_feed = match self.personal.subscribe(&self.identity) {
            Ok(feed) => Some(feed),
            Err(e) => {
                tracing::warn!(identity = %self.identity, "personal tasks unavailable: {e}");
                None
            }
        };
        let workspace_feed = self.workspace.as_ref().and_then(|store| {
            match store.subscribe_assigned(&self.identity) {
                Ok(feed) => Some(feed),
                Err(e) => {
                    tracing::warn!(identity = %self.identity, "workspace tasks unavailable: {e}");
                    None
                }
            }
        });

        let mut aggregator = TaskAggregator {
            identity: self.identity,
            clock: self.clock,
            personal: self.personal,
            workspace: self.workspace,
            projects: self.projects,
            notifier: self.notifier,
            local_offset: self.local_offset,
            unknown_id_policy: self.unknown_id_policy,
            filters: self.filters,
            personal_feed,
            workspace_feed,
            personal_tasks: Vec::new(),
            workspace_tasks: Vec::new(),
            project_cache: HashMap::new(),
        };
        if let Some(event) = aggregator.personal_feed.as_mut().map(|f| f.borrow_and_update().clone()) {
            aggregator.apply_personal(event);
        }
        if let Some(event) =
            aggregator.workspace_feed.as_mut().map(|f| f.borrow_and_update().clone())
        {
            aggregator.apply_workspace(event);
        }
        aggregator
    }
}

/// Merged, filterable view over the current identity's tasks.
///
/// Each instance owns its filter set and project cache, so several can run
/// side by side against different stores.
pub struct TaskAggregator {
    identity: String,
    clock: Arc<dyn Clock>,
    personal: Arc<dyn PersonalTaskStore>,
    workspace: Option<Arc<dyn WorkspaceTaskStore>>,
    projects: Option<Arc<dyn ProjectDirectory>>,
    notifier: Option<Arc<dyn Notifier>>,
    local_offset: FixedOffset,
    unknown_id_policy: UnknownIdPolicy,
    filters: FilterSet,
    personal_feed: Option<TaskFeed<TaskFields>>,
    workspace_feed: Option<TaskFeed<WorkspaceTaskRecord>>,
    personal_tasks: Vec<Task>,
    workspace_tasks: Vec<Task>,
    project_cache: HashMap<String, ProjectMeta>,
}

impl TaskAggregator {
    /// Starts building an aggregator for `identity` over its personal store.
    #[must_use]
    pub fn builder(
        identity: impl Into<String>,
        clock: Arc<dyn Clock>,
        personal: Arc<dyn PersonalTaskStore>,
    ) -> TaskAggregatorBuilder {
        TaskAggregatorBuilder {
            identity: identity.into(),
            clock,
            personal,
            workspace: None,
            projects: None,
            notifier: None,
            local_offset: Utc.fix(),
            unknown_id_policy: UnknownIdPolicy::default(),
            filters: FilterSet::default(),
        }
    }

    /// The identity whose tasks are shown.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    // --- feeds ---

    /// Replaces the personal snapshot.
    ///
    /// A failed feed empties the personal source; the workspace source is
    /// left alone.
    pub fn apply_personal(&mut self, event: FeedEvent<TaskFields>) {
        self.personal_tasks = match event {
            FeedEvent::Snapshot(records) => {
                tracing::debug!(count = records.len(), "personal snapshot");
                records.into_iter().map(Task::Personal).collect()
            }
            FeedEvent::Failed(reason) => {
                tracing::warn!("personal feed failed, showing no personal tasks: {reason}");
                Vec::new()
            }
        };
    }

    /// Replaces the workspace snapshot.
    ///
    /// Records that do not list the current identity as an assignee are
    /// dropped. A failed feed empties the workspace source only.
    pub fn apply_workspace(&mut self, event: FeedEvent<WorkspaceTaskRecord>) {
        self.workspace_tasks = match event {
            FeedEvent::Snapshot(records) => {
                let total = records.len();
                let tasks: Vec<Task> = records
                    .into_iter()
                    .filter(|r| r.fields.assignees.iter().any(|a| *a == self.identity))
                    .map(Task::from)
                    .collect();
                tracing::debug!(count = tasks.len(), dropped = total - tasks.len(), "workspace snapshot");
                tasks
            }
            FeedEvent::Failed(reason) => {
                tracing::warn!("workspace feed failed, showing no workspace tasks: {reason}");
                Vec::new()
            }
        };
    }

    /// Applies whatever snapshots are waiting on either feed without blocking.
    ///
    /// Returns `true` if anything was applied.
    pub fn refresh(&mut self) -> bool {
        let mut changed = false;
        if let Some(event) = take_pending(&mut self.personal_feed) {
            self.apply_personal(event);
            changed = true;
        }
        if let Some(event) = take_pending(&mut self.workspace_feed) {
            self.apply_workspace(event);
            changed = true;
        }
        changed
    }

    /// Waits for the next emission on either feed and applies it.
    ///
    /// Returns `None` once both feeds are closed (or were never opened).
    pub async fn next_change(&mut self) -> Option<Source> {
        loop {
            if self.personal_feed.is_none() && self.workspace_feed.is_none() {
                return None;
            }
            let emission = {
                let Self { personal_feed, workspace_feed, .. } = &mut *self;
                tokio::select! {
                    event = feed_changed(personal_feed) => Emission::Personal(event),
                    event = feed_changed(workspace_feed) => Emission::Workspace(event),
                }
            };
            match emission {
                Emission::Personal(None) => self.personal_feed = None,
                Emission::Workspace(None) => self.workspace_feed = None,
                Emission::Personal(Some(event)) => {
                    self.apply_personal(event);
                    return Some(Source::Personal);
                }
                Emission::Workspace(Some(event)) => {
                    self.apply_workspace(event);
                    return Some(Source::Workspace);
                }
            }
        }
    }

    // --- views ---

    /// Personal tasks followed by workspace tasks, each in source order.
    #[must_use]
    pub fn merge(&self) -> Vec<Task> {
        self.personal_tasks.iter().chain(&self.workspace_tasks).cloned().collect()
    }

    /// [`merge`](Self::merge) restricted to visible categories.
    #[must_use]
    pub fn filtered_tasks(&self) -> Vec<Task> {
        self.personal_tasks
            .iter()
            .chain(&self.workspace_tasks)
            .filter(|t| self.filters.admits(t))
            .cloned()
            .collect()
    }

    /// Visible tasks starting on the current local day, ascending by start.
    #[must_use]
    pub fn today_tasks(&self) -> Vec<Task> {
        views::today(&self.filtered_tasks(), self.clock.now(), self.local_offset)
    }

    /// The next `limit` visible tasks starting after now, ascending.
    #[must_use]
    pub fn upcoming_tasks(&self, limit: usize) -> Vec<Task> {
        views::upcoming(&self.filtered_tasks(), self.clock.now(), self.local_offset, limit)
    }

    /// Visible tasks grouped by effective category.
    #[must_use]
    pub fn by_category(&self) -> BTreeMap<Category, Vec<Task>> {
        let mut groups: BTreeMap<Category, Vec<Task>> = BTreeMap::new();
        for task in self.filtered_tasks() {
            groups.entry(task.effective_category()).or_default().push(task);
        }
        groups
    }

    /// Share of visible tasks that are complete, or `None` with no tasks.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn completion_rate(&self) -> Option<f64> {
        let tasks = self.filtered_tasks();
        if tasks.is_empty() {
            return None;
        }
        let done = tasks.iter().filter(|t| t.is_complete()).count();
        Some(done as f64 / tasks.len() as f64)
    }

    /// Looks a task up by id in the merged view.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Task> {
        self.personal_tasks.iter().chain(&self.workspace_tasks).find(|t| t.id() == id)
    }

    // --- filters ---

    /// The current filter state.
    #[must_use]
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Flips visibility of `category` and returns the new value.
    pub fn toggle_filter(&mut self, category: &str) -> bool {
        let visible = self.filters.toggle(category);
        tracing::debug!(category, visible, "filter toggled");
        visible
    }

    // --- project metadata ---

    /// Cached metadata for `project_id`, if resolved.
    #[must_use]
    pub fn project_meta(&self, project_id: &str) -> Option<&ProjectMeta> {
        self.project_cache.get(project_id)
    }

    /// Fetches metadata for every project referenced by a workspace task and
    /// not cached yet. Lookups that fail are logged and retried next time.
    pub async fn resolve_projects(&mut self) {
        let Some(directory) = self.projects.clone() else {
            return;
        };
        let mut wanted: Vec<(String, String)> = Vec::new();
        for origin in self.workspace_tasks.iter().filter_map(Task::origin) {
            if !self.project_cache.contains_key(&origin.project_id)
                && !wanted.iter().any(|(_, p)| *p == origin.project_id)
            {
                wanted.push((origin.workspace_id.clone(), origin.project_id.clone()));
            }
        }
        for (workspace_id, project_id) in wanted {
            match directory.project_meta(&workspace_id, &project_id).await {
                Ok(meta) => {
                    self.project_cache.insert(project_id, meta);
                }
                Err(e) => {
                    tracing::warn!(%workspace_id, %project_id, "project lookup failed: {e}");
                }
            }
        }
    }

    // --- mutations ---

    /// Creates a personal task and notifies the creator.
    ///
    /// The category color is stamped onto the draft when it has none.
    /// Returns the new id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the personal store rejects the create. A
    /// failed notification is logged, not returned.
    pub async fn add_task(&self, mut draft: TaskDraft) -> Result<String> {
        if draft.color.is_none() {
            let category = draft.category.unwrap_or(Category::Work);
            draft.color = Some(category.color().to_string());
        }
        let title = draft.title.clone();
        let id = self
            .personal
            .create(&self.identity, draft)
            .await
            .map_err(|e| Error::store("create task", e))?;
        tracing::debug!(id = %id, "task created");

        if let Some(notifier) = &self.notifier {
            let notification = Notification::task_created(&id, &title, self.clock.now());
            if let Err(e) = notifier.notify(&self.identity, &notification).await {
                tracing::warn!(id = %id, "task created but notification failed: {e}");
            }
        }
        Ok(id)
    }

    /// Decides where a mutation of `id` goes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInView`] for an unknown id under
    /// [`UnknownIdPolicy::Reject`].
    pub fn route(&self, id: &str) -> Result<Route> {
        match self.find(id) {
            Some(task) => Ok(task.path().map_or(Route::Personal, |path| Route::Workspace(path.clone()))),
            None => match self.unknown_id_policy {
                UnknownIdPolicy::AssumePersonal => {
                    tracing::warn!(id, "task not in view, assuming it is personal");
                    Ok(Route::PersonalFallback)
                }
                UnknownIdPolicy::Reject => Err(Error::NotInView(id.to_string())),
            },
        }
    }

    /// Applies `patch` to task `id` in the store that owns it.
    ///
    /// Returns the route taken.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the store rejects the write, or
    /// [`Error::NotInView`] under [`UnknownIdPolicy::Reject`].
    pub async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Route> {
        let route = self.route(id)?;
        tracing::debug!(id, route = %route, "update task");
        match &route {
            Route::Workspace(path) => {
                self.workspace_store()?
                    .update_at(path, patch)
                    .await
                    .map_err(|e| Error::store(format!("update task {id}"), e))?;
            }
            Route::Personal | Route::PersonalFallback => {
                self.personal
                    .update(&self.identity, id, patch)
                    .await
                    .map_err(|e| Error::store(format!("update task {id}"), e))?;
            }
        }
        Ok(route)
    }

    /// Deletes task `id` from the store that owns it.
    ///
    /// Returns the route taken.
    ///
    /// # Errors
    ///
    /// Same as [`update_task`](Self::update_task).
    pub async fn delete_task(&self, id: &str) -> Result<Route> {
        let route = self.route(id)?;
        tracing::debug!(id, route = %route, "delete task");
        match &route {
            Route::Workspace(path) => {
                self.workspace_store()?
                    .delete_at(path)
                    .await
                    .map_err(|e| Error::store(format!("delete task {id}"), e))?;
            }
            Route::Personal | Route::PersonalFallback => {
                self.personal
                    .delete(&self.identity, id)
                    .await
                    .map_err(|e| Error::store(format!("delete task {id}"), e))?;
            }
        }
        Ok(route)
    }

    /// Sets progress to 100 and status to done. Safe to repeat.
    ///
    /// # Errors
    ///
    /// Same as [`update_task`](Self::update_task).
    pub async fn mark_complete(&self, id: &str) -> Result<Route> {
        self.update_task(id, &TaskPatch::complete()).await
    }

    fn workspace_store(&self) -> Result<&Arc<dyn WorkspaceTaskStore>> {
        // A workspace task can only be in view if the workspace source exists.
        self.workspace.as_ref().ok_or_else(|| {
            Error::InvalidArgument("workspace task routed without a workspace store".to_string())
        })
    }
}

/// One wake-up of [`TaskAggregator::next_change`]: the new event, or `None`
/// when that feed closed.
enum Emission {
    Personal(Option<FeedEvent<TaskFields>>),
    Workspace(Option<FeedEvent<WorkspaceTaskRecord>>),
}

/// Takes the feed's latest value if it has not been seen yet.
///
/// A closed feed is dropped after its final unseen value is taken; its last
/// snapshot stays applied.
fn take_pending<T: Clone>(feed: &mut Option<TaskFeed<T>>) -> Option<FeedEvent<T>> {
    let rx = feed.as_mut()?;
    let closed = rx.has_changed().is_err();
    let latest = rx.borrow_and_update();
    let event = if latest.has_changed() { Some((*latest).clone()) } else { None };
    drop(latest);
    if closed {
        *feed = None;
    }
    event
}

/// Resolves with the feed's new value, or `None` once it closes.
/// Never resolves for an absent feed.
async fn feed_changed<T: Clone>(feed: &mut Option<TaskFeed<T>>) -> Option<FeedEvent<T>> {
    match feed {
        Some(rx) => match rx.changed().await {
            Ok(()) => Some(rx.borrow_and_update().clone()),
            Err(_) => None,
        },
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{FixedClock, MemoryTaskStore, RecordingNotifier, StoreCall};
    use crate::task::{Status, TaskPath, WorkspaceOrigin};
    use chrono::TimeZone;
    use tokio::sync::watch;

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::at(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()))
    }

    fn personal(id: &str, start: &str, category: Option<Category>) -> TaskFields {
        let mut fields = TaskFields::new(id, format!("personal {id}"));
        fields.start = Some(start.to_string());
        fields.category = category;
        fields
    }

    fn assigned(id: &str, start: &str, assignee: &str) -> WorkspaceTaskRecord {
        let mut fields = TaskFields::new(id, format!("workspace {id}"));
        fields.start = Some(start.to_string());
        fields.category = Some(Category::Project);
        fields.status = Some(Status::Todo);
        fields.assignees = vec![assignee.to_string()];
        WorkspaceTaskRecord {
            fields,
            origin: WorkspaceOrigin {
                workspace_id: "acme".into(),
                project_id: "site".into(),
                path: TaskPath::new("acme", "site", id),
            },
        }
    }

    fn aggregator(store: &Arc<MemoryTaskStore>) -> TaskAggregator {
        TaskAggregator::builder("alice", clock(), store.clone())
            .workspace(store.clone())
            .projects(store.clone())
            .build()
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(Task::id).collect()
    }

    #[test]
    fn merge_keeps_every_task_and_tags_source() {
        let store = Arc::new(MemoryTaskStore::new());
        store.seed_personal(
            "alice",
            vec![personal("p1", "2024-01-01T09:00", None), personal("p2", "2024-01-03T09:00", None)],
        );
        store.seed_workspace(vec![assigned("w1", "2024-01-02T09:00", "alice")]);

        let agg = aggregator(&store);
        let merged = agg.merge();

        assert_eq!(merged.len(), 3);
        assert_eq!(ids(&merged), vec!["p1", "p2", "w1"]);
        assert!(!merged[0].is_workspace_task());
        assert!(merged[2].is_workspace_task());
    }

    #[test]
    fn workspace_records_for_other_identities_are_dropped() {
        let store = Arc::new(MemoryTaskStore::new());
        let mut agg = aggregator(&store);
        agg.apply_workspace(FeedEvent::Snapshot(vec![
            assigned("mine", "2024-01-02T09:00", "alice"),
            assigned("theirs", "2024-01-02T09:00", "bob"),
        ]));
        assert_eq!(ids(&agg.merge()), vec!["mine"]);
    }

    #[test]
    fn uncategorized_tasks_follow_work_filter() {
        let store = Arc::new(MemoryTaskStore::new());
        store.seed_personal(
            "alice",
            vec![
                personal("plain", "2024-01-01T09:00", None),
                personal("meet", "2024-01-01T10:00", Some(Category::Meeting)),
            ],
        );
        let mut agg = aggregator(&store);

        agg.toggle_filter("meeting");
        assert_eq!(ids(&agg.filtered_tasks()), vec!["plain"]);

        agg.toggle_filter("work");
        assert!(agg.filtered_tasks().is_empty());

        agg.toggle_filter("meeting");
        assert_eq!(ids(&agg.filtered_tasks()), vec!["meet"]);
    }

    #[test]
    fn malformed_start_kept_in_filtered_but_not_dated_views() {
        let store = Arc::new(MemoryTaskStore::new());
        let mut broken = TaskFields::new("broken", "no start");
        broken.category = Some(Category::Deadline);
        store.seed_personal("alice", vec![broken, personal("ok", "2024-01-01T18:00", None)]);
        let agg = aggregator(&store);

        assert_eq!(agg.filtered_tasks().len(), 2);
        assert_eq!(ids(&agg.today_tasks()), vec!["ok"]);
        assert_eq!(ids(&agg.upcoming_tasks(DEFAULT_UPCOMING_LIMIT)), vec!["ok"]);
    }

    #[test]
    fn refused_workspace_subscription_leaves_personal_view_working() {
        let store = Arc::new(MemoryTaskStore::new());
        store.refuse_workspace_subscriptions(true);
        store.seed_personal("alice", vec![personal("p1", "2024-01-01T15:00", None)]);

        let agg = aggregator(&store);
        assert_eq!(ids(&agg.merge()), vec!["p1"]);
        assert_eq!(ids(&agg.today_tasks()), vec!["p1"]);
        assert_eq!(ids(&agg.upcoming_tasks(5)), vec!["p1"]);
    }

    #[test]
    fn broken_workspace_feed_empties_only_workspace() {
        let store = Arc::new(MemoryTaskStore::new());
        store.seed_personal("alice", vec![personal("p1", "2024-01-01T15:00", None)]);
        store.seed_workspace(vec![assigned("w1", "2024-01-01T16:00", "alice")]);
        let mut agg = aggregator(&store);
        assert_eq!(agg.merge().len(), 2);

        store.break_workspace_feeds("index missing");
        assert!(agg.refresh());
        assert_eq!(ids(&agg.merge()), vec!["p1"]);
    }

    #[test]
    fn refresh_is_a_no_op_without_news() {
        let store = Arc::new(MemoryTaskStore::new());
        let mut agg = aggregator(&store);
        assert!(!agg.refresh());
    }

    #[tokio::test]
    async fn next_change_reports_source() {
        let store = Arc::new(MemoryTaskStore::new());
        let mut agg = aggregator(&store);

        store.seed_workspace(vec![assigned("w1", "2024-01-05T09:00", "alice")]);
        assert_eq!(agg.next_change().await, Some(Source::Workspace));
        assert_eq!(ids(&agg.merge()), vec!["w1"]);
    }

    #[tokio::test]
    async fn next_change_applies_each_source_to_the_view() {
        let store = Arc::new(MemoryTaskStore::new());
        let mut agg = aggregator(&store);

        store.seed_personal("alice", vec![personal("p1", "2024-01-01T15:00", None)]);
        assert_eq!(agg.next_change().await, Some(Source::Personal));
        assert_eq!(ids(&agg.merge()), vec!["p1"]);

        store.seed_workspace(vec![assigned("w1", "2024-01-01T16:00", "alice")]);
        assert_eq!(agg.next_change().await, Some(Source::Workspace));
        assert_eq!(ids(&agg.merge()), vec!["p1", "w1"]);
        assert_eq!(ids(&agg.today_tasks()), vec!["p1", "w1"]);
        assert!(!agg.refresh());
    }

    #[test]
    fn closed_feed_keeps_its_final_snapshot() {
        let store = Arc::new(MemoryTaskStore::new());
        let mut agg = TaskAggregator::builder("alice", clock(), store.clone()).build();
        let (tx, rx) = watch::channel(FeedEvent::Snapshot(Vec::new()));
        agg.personal_feed = Some(rx);

        tx.send_replace(FeedEvent::Snapshot(vec![personal("p1", "2024-01-01T15:00", None)]));
        drop(tx);

        assert!(agg.refresh());
        assert_eq!(ids(&agg.merge()), vec!["p1"]);
        assert!(agg.personal_feed.is_none());
    }

    #[tokio::test]
    async fn next_change_applies_final_value_before_close() {
        let store = Arc::new(MemoryTaskStore::new());
        let mut agg = TaskAggregator::builder("alice", clock(), store.clone()).build();
        let (tx, rx) = watch::channel(FeedEvent::Snapshot(Vec::new()));
        agg.personal_feed = Some(rx);

        tx.send_replace(FeedEvent::Snapshot(vec![personal("p1", "2024-01-01T15:00", None)]));
        drop(tx);

        assert_eq!(agg.next_change().await, Some(Source::Personal));
        assert_eq!(ids(&agg.merge()), vec!["p1"]);
        assert_eq!(agg.next_change().await, None);
        assert_eq!(ids(&agg.merge()), vec!["p1"]);
    }

    #[tokio::test]
    async fn next_change_without_feeds_returns_none() {
        let store = Arc::new(MemoryTaskStore::new());
        let mut agg = TaskAggregator::builder("alice", clock(), store.clone()).build();
        agg.personal_feed = None;
        assert_eq!(agg.next_change().await, None);
    }

    #[tokio::test]
    async fn update_routes_workspace_task_to_its_path() {
        let store = Arc::new(MemoryTaskStore::new());
        store.seed_workspace(vec![assigned("w1", "2024-01-02T09:00", "alice")]);
        let agg = aggregator(&store);

        let patch = TaskPatch { status: Some(Status::Review), ..TaskPatch::default() };
        let route = agg.update_task("w1", &patch).await.unwrap();

        let path = TaskPath::new("acme", "site", "w1");
        assert_eq!(route, Route::Workspace(path.clone()));
        assert_eq!(store.calls(), vec![StoreCall::UpdateAt { path, patch }]);
    }

    #[tokio::test]
    async fn update_routes_personal_task_by_id() {
        let store = Arc::new(MemoryTaskStore::new());
        store.seed_personal("alice", vec![personal("p1", "2024-01-02T09:00", None)]);
        let agg = aggregator(&store);

        let patch = TaskPatch { title: Some("renamed".into()), ..TaskPatch::default() };
        let route = agg.update_task("p1", &patch).await.unwrap();

        assert_eq!(route, Route::Personal);
        assert_eq!(
            store.calls(),
            vec![StoreCall::Update { owner: "alice".into(), id: "p1".into(), patch }]
        );
    }

    #[tokio::test]
    async fn unknown_id_falls_back_to_personal_store() {
        let store = Arc::new(MemoryTaskStore::new());
        let agg = aggregator(&store);

        let patch = TaskPatch::complete();
        let err = agg.update_task("ghost", &patch).await.unwrap_err();

        assert!(matches!(err, Error::Store { .. }));
        assert_eq!(
            store.calls(),
            vec![StoreCall::Update { owner: "alice".into(), id: "ghost".into(), patch }]
        );
    }

    #[tokio::test]
    async fn unknown_id_rejected_under_strict_policy() {
        let store = Arc::new(MemoryTaskStore::new());
        let agg = TaskAggregator::builder("alice", clock(), store.clone())
            .unknown_id_policy(UnknownIdPolicy::Reject)
            .build();

        let err = agg.delete_task("ghost").await.unwrap_err();
        assert!(matches!(err, Error::NotInView(ref id) if id == "ghost"));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn mark_complete_twice_is_idempotent() {
        let store = Arc::new(MemoryTaskStore::new());
        store.seed_personal("alice", vec![personal("p1", "2024-01-02T09:00", None)]);
        let mut agg = aggregator(&store);

        agg.mark_complete("p1").await.unwrap();
        agg.refresh();
        agg.mark_complete("p1").await.unwrap();
        agg.refresh();

        let task = agg.find("p1").unwrap();
        assert_eq!(task.fields().progress, Some(100));
        assert_eq!(task.fields().status, Some(Status::Done));
        assert!(task.is_complete());
    }

    #[tokio::test]
    async fn add_task_stamps_color_and_notifies_creator() {
        let store = Arc::new(MemoryTaskStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let mut agg = TaskAggregator::builder("alice", clock(), store.clone())
            .notifier(notifier.clone())
            .build();

        let draft = TaskDraft {
            title: "Board review".into(),
            start: Some("2024-01-01T16:00".into()),
            category: Some(Category::Meeting),
            ..TaskDraft::default()
        };
        let id = agg.add_task(draft).await.unwrap();
        agg.refresh();

        let task = agg.find(&id).unwrap();
        assert_eq!(task.fields().color.as_deref(), Some(Category::Meeting.color()));
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "alice");
        assert_eq!(sent[0].1.task_id.as_deref(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn add_task_survives_notification_failure() {
        let store = Arc::new(MemoryTaskStore::new());
        let agg = TaskAggregator::builder("alice", clock(), store.clone())
            .notifier(Arc::new(RecordingNotifier::failing()))
            .build();

        let draft = TaskDraft { title: "Call bank".into(), ..TaskDraft::default() };
        assert!(agg.add_task(draft).await.is_ok());
        assert_eq!(store.personal_tasks("alice").len(), 1);
    }

    #[tokio::test]
    async fn store_failure_propagates_without_touching_view() {
        let store = Arc::new(MemoryTaskStore::new());
        store.seed_personal("alice", vec![personal("p1", "2024-01-02T09:00", None)]);
        let mut agg = aggregator(&store);
        store.fail_writes(true);

        assert!(matches!(agg.delete_task("p1").await, Err(Error::Store { .. })));
        agg.refresh();
        assert_eq!(ids(&agg.merge()), vec!["p1"]);
    }

    #[tokio::test]
    async fn resolve_projects_caches_metadata_once() {
        let store = Arc::new(MemoryTaskStore::new());
        store.seed_project(
            "acme",
            "site",
            ProjectMeta { name: "Website".into(), color: Some("#222".into()), emoji: None },
        );
        store.seed_workspace(vec![
            assigned("w1", "2024-01-02T09:00", "alice"),
            assigned("w2", "2024-01-03T09:00", "alice"),
        ]);
        let mut agg = aggregator(&store);

        agg.resolve_projects().await;
        agg.resolve_projects().await;

        assert_eq!(agg.project_meta("site").map(|m| m.name.as_str()), Some("Website"));
        let lookups =
            store.calls().into_iter().filter(|c| matches!(c, StoreCall::ProjectMeta { .. })).count();
        assert_eq!(lookups, 1);
    }

    #[test]
    fn by_category_and_completion_rate() {
        let store = Arc::new(MemoryTaskStore::new());
        let mut done = personal("p2", "2024-01-02T09:00", Some(Category::Deadline));
        done.progress = Some(100);
        store.seed_personal("alice", vec![personal("p1", "2024-01-01T09:00", None), done]);
        let agg = aggregator(&store);

        let groups = agg.by_category();
        assert_eq!(ids(&groups[&Category::Work]), vec!["p1"]);
        assert_eq!(ids(&groups[&Category::Deadline]), vec!["p2"]);
        assert_eq!(agg.completion_rate(), Some(0.5));
    }

    #[test]
    fn independent_instances_keep_their_own_filters() {
        let store = Arc::new(MemoryTaskStore::new());
        let mut first = aggregator(&store);
        let second = aggregator(&store);
        first.toggle_filter("work");
        assert!(!first.filters().is_visible("work"));
        assert!(second.filters().is_visible("work"));
    }
}
