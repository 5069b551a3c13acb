//! `planboard add`, `update`, `done` and `delete` commands.

use crate::aggregator::Route;
use crate::cli::{AddArgs, UpdateArgs};
use crate::context::ServiceContext;
use crate::task::{TaskDraft, TaskPatch};

/// Creates a personal task.
///
/// # Errors
///
/// Returns an error string if the store rejects the task.
pub async fn add(ctx: &ServiceContext, args: &AddArgs) -> Result<String, String> {
    let agg = ctx.aggregator();
    let draft = TaskDraft {
        title: args.title.clone(),
        start: args.start.clone(),
        end: args.end.clone(),
        category: args.category,
        color: args.color.clone(),
        description: args.description.clone(),
        ..TaskDraft::default()
    };
    let id = agg.add_task(draft).await.map_err(|e| e.to_string())?;
    Ok(format!("Created {id}\n"))
}

/// Applies the given field changes to a task.
///
/// # Errors
///
/// Returns an error string if no field was given or the write fails.
pub async fn update(ctx: &ServiceContext, args: &UpdateArgs) -> Result<String, String> {
    let patch = TaskPatch {
        title: args.title.clone(),
        start: args.start.clone(),
        end: args.end.clone(),
        category: args.category,
        color: args.color.clone(),
        status: args.status,
        progress: args.progress,
        description: args.description.clone(),
    };
    if patch.is_empty() {
        return Err("Nothing to update: pass at least one field flag".to_string());
    }
    let agg = ctx.aggregator();
    let route = agg.update_task(&args.id, &patch).await.map_err(|e| e.to_string())?;
    Ok(outcome("Updated", &args.id, &route))
}

/// Marks a task complete.
///
/// # Errors
///
/// Returns an error string if the write fails.
pub async fn done(ctx: &ServiceContext, id: &str) -> Result<String, String> {
    let agg = ctx.aggregator();
    let route = agg.mark_complete(id).await.map_err(|e| e.to_string())?;
    Ok(outcome("Completed", id, &route))
}

/// Deletes a task.
///
/// # Errors
///
/// Returns an error string if the delete fails.
pub async fn delete(ctx: &ServiceContext, id: &str) -> Result<String, String> {
    let agg = ctx.aggregator();
    let route = agg.delete_task(id).await.map_err(|e| e.to_string())?;
    Ok(outcome("Deleted", id, &route))
}

fn outcome(verb: &str, id: &str, route: &Route) -> String {
    format!("{verb} {id} in the {route}\n")
}
