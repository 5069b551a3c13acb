//! Task types shared by the stores, the aggregator and the CLI.
//!
//! Records are what the sources store; [`Task`] is the merged view the
//! aggregator hands out, tagged with the source it came from.

mod category;
mod filter;
mod path;
mod record;
mod status;
#[allow(clippy::module_inception)]
mod task;
pub mod when;

pub use category::Category;
pub use filter::FilterSet;
pub use path::{is_plain_segment, TaskPath, TaskPathParts};
pub use record::{TaskDraft, TaskFields, TaskPatch, WorkspaceOrigin, WorkspaceTaskRecord};
pub use status::Status;
pub use task::Task;
