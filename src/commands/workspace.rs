//! `planboard project` and `assign` commands.

use crate::cli::{AssignArgs, ProjectArgs};
use crate::context::ServiceContext;
use crate::ports::ProjectMeta;
use crate::task::{Category, Status, TaskDraft};

/// Creates a workspace project.
///
/// # Errors
///
/// Returns an error string if the project document cannot be written.
pub fn project(ctx: &ServiceContext, args: &ProjectArgs) -> Result<String, String> {
    let meta = ProjectMeta {
        name: args.name.clone(),
        color: args.color.clone(),
        emoji: args.emoji.clone(),
    };
    ctx.store
        .create_project(&args.workspace, &args.project, &meta)
        .map_err(|e| e.to_string())?;
    Ok(format!("Created project {}/{}\n", args.workspace, args.project))
}

/// Creates a workspace task in an existing project.
///
/// # Errors
///
/// Returns an error string if the project does not exist or the write fails.
pub fn assign(ctx: &ServiceContext, args: &AssignArgs) -> Result<String, String> {
    let assignees =
        if args.to.is_empty() { vec![ctx.config.identity.clone()] } else { args.to.clone() };
    let category = args.category.unwrap_or(Category::Project);
    let draft = TaskDraft {
        title: args.title.clone(),
        start: args.start.clone(),
        end: args.end.clone(),
        category: Some(category),
        color: Some(category.color().to_string()),
        status: Some(args.status.unwrap_or(Status::Todo)),
        assignees,
        ..TaskDraft::default()
    };
    let path = ctx
        .store
        .create_workspace_task(&args.workspace, &args.project, draft)
        .map_err(|e| e.to_string())?;
    Ok(format!("Created {path}\n"))
}
