//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the aggregation core and an
//! external system (time, ids, files, task stores, projects, notifications).
//! Implementations live in `src/adapters/` and `src/store/`.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod notify;
pub mod projects;
pub mod tasks;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use id_gen::IdGenerator;
pub use notify::{Notification, Notifier};
pub use projects::{ProjectDirectory, ProjectMeta};
pub use tasks::{FeedEvent, PersonalTaskStore, PortFuture, TaskFeed, WorkspaceTaskStore};
