//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use crate::aggregator::DEFAULT_UPCOMING_LIMIT;
use crate::task::{Category, Status};

/// Top-level CLI parser for `planboard`.
#[derive(Debug, Parser)]
#[command(name = "planboard", version, about = "Personal and workspace tasks in one view")]
pub struct Cli {
    /// Toggle a category off before rendering. Repeatable.
    #[arg(long = "hide", value_name = "CATEGORY", global = true)]
    pub hide: Vec<String>,

    /// Print views as JSON instead of a table.
    #[arg(long, global = true)]
    pub json: bool,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every visible task.
    List,
    /// Show visible tasks starting today.
    Today,
    /// Show the next visible tasks after now.
    Upcoming {
        /// How many tasks to show.
        #[arg(long, default_value_t = DEFAULT_UPCOMING_LIMIT)]
        limit: usize,
    },
    /// Create a personal task.
    Add(AddArgs),
    /// Change fields of a task.
    Update(UpdateArgs),
    /// Mark a task complete.
    Done {
        /// Task id.
        id: String,
    },
    /// Delete a task.
    Delete {
        /// Task id.
        id: String,
    },
    /// Create a workspace project.
    Project(ProjectArgs),
    /// Create a workspace task assigned to one or more identities.
    Assign(AssignArgs),
}

/// Arguments for `planboard add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Task title.
    pub title: String,
    /// Start, e.g. `2024-05-01T09:30` or `2024-05-01`.
    #[arg(long)]
    pub start: Option<String>,
    /// End time.
    #[arg(long)]
    pub end: Option<String>,
    /// Category (work, meeting, deadline, personal, project).
    #[arg(long)]
    pub category: Option<Category>,
    /// Explicit color; defaults to the category color.
    #[arg(long)]
    pub color: Option<String>,
    /// Notes.
    #[arg(long)]
    pub description: Option<String>,
}

/// Arguments for `planboard update`.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Task id.
    pub id: String,
    /// New title.
    #[arg(long)]
    pub title: Option<String>,
    /// New start.
    #[arg(long)]
    pub start: Option<String>,
    /// New end.
    #[arg(long)]
    pub end: Option<String>,
    /// New category.
    #[arg(long)]
    pub category: Option<Category>,
    /// New color.
    #[arg(long)]
    pub color: Option<String>,
    /// New status (todo, doing, review, done).
    #[arg(long)]
    pub status: Option<Status>,
    /// New progress, 0 to 100.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub progress: Option<u8>,
    /// New notes.
    #[arg(long)]
    pub description: Option<String>,
}

/// Arguments for `planboard project`.
#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Workspace id.
    pub workspace: String,
    /// Project id.
    pub project: String,
    /// Display name.
    #[arg(long)]
    pub name: String,
    /// Accent color.
    #[arg(long)]
    pub color: Option<String>,
    /// Icon emoji.
    #[arg(long)]
    pub emoji: Option<String>,
}

/// Arguments for `planboard assign`.
#[derive(Debug, Args)]
pub struct AssignArgs {
    /// Workspace id.
    pub workspace: String,
    /// Project id.
    pub project: String,
    /// Task title.
    pub title: String,
    /// Assignee identity. Repeatable; defaults to the current identity.
    #[arg(long = "to", value_name = "IDENTITY")]
    pub to: Vec<String>,
    /// Start time.
    #[arg(long)]
    pub start: Option<String>,
    /// End time.
    #[arg(long)]
    pub end: Option<String>,
    /// Category; workspace tasks default to `project`.
    #[arg(long)]
    pub category: Option<Category>,
    /// Initial status.
    #[arg(long)]
    pub status: Option<Status>,
}
