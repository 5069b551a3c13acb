//! `planboard list`, `today` and `upcoming` commands.

use std::fmt::Write as _;

use crate::aggregator::TaskAggregator;
use crate::context::ServiceContext;
use crate::task::Task;

const HEADERS: [&str; 6] = ["ID", "START", "TITLE", "CATEGORY", "STATUS", "SOURCE"];

/// Every visible task, with a completion summary.
///
/// # Errors
///
/// Returns an error string if JSON encoding fails.
pub async fn list(ctx: &ServiceContext, hide: &[String], json: bool) -> Result<String, String> {
    let agg = open(ctx, hide).await;
    let tasks = agg.filtered_tasks();
    let mut out = render(&agg, &tasks, json)?;
    if !json {
        if let Some(rate) = agg.completion_rate() {
            let _ = writeln!(out, "{:.0}% complete.", rate * 100.0);
        }
    }
    Ok(out)
}

/// Visible tasks starting on the local day.
///
/// # Errors
///
/// Returns an error string if JSON encoding fails.
pub async fn today(ctx: &ServiceContext, hide: &[String], json: bool) -> Result<String, String> {
    let agg = open(ctx, hide).await;
    render(&agg, &agg.today_tasks(), json)
}

/// The next `limit` visible tasks after now.
///
/// # Errors
///
/// Returns an error string if JSON encoding fails.
pub async fn upcoming(
    ctx: &ServiceContext,
    hide: &[String],
    limit: usize,
    json: bool,
) -> Result<String, String> {
    let agg = open(ctx, hide).await;
    render(&agg, &agg.upcoming_tasks(limit), json)
}

/// Opens the aggregator, hides the requested categories and resolves
/// project names for display.
async fn open(ctx: &ServiceContext, hide: &[String]) -> TaskAggregator {
    let mut agg = ctx.aggregator();
    hide_categories(&mut agg, hide);
    agg.resolve_projects().await;
    agg
}

fn hide_categories(agg: &mut TaskAggregator, hide: &[String]) {
    for category in hide {
        let category = category.trim().to_ascii_lowercase();
        if agg.filters().is_visible(&category) {
            agg.toggle_filter(&category);
        }
    }
}

/// Renders tasks as a table, or as JSON when `json` is set.
///
/// # Errors
///
/// Returns an error string if JSON encoding fails.
pub fn render(agg: &TaskAggregator, tasks: &[Task], json: bool) -> Result<String, String> {
    if json {
        let mut out = serde_json::to_string_pretty(tasks)
            .map_err(|e| format!("Failed to encode tasks: {e}"))?;
        out.push('\n');
        return Ok(out);
    }
    if tasks.is_empty() {
        return Ok("No tasks.\n".to_string());
    }

    let rows: Vec<[String; 6]> = tasks
        .iter()
        .map(|task| {
            let fields = task.fields();
            let status = if task.is_complete() {
                "done".to_string()
            } else {
                fields.status.map_or_else(|| "-".to_string(), |s| s.to_string())
            };
            [
                fields.id.clone(),
                fields.start.clone().unwrap_or_else(|| "-".to_string()),
                fields.title.clone(),
                task.effective_category().to_string(),
                status,
                source_label(agg, task),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(String::from), &widths);
    push_row(&mut out, &widths.map(|w| "-".repeat(w)), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    let _ = writeln!(out, "\n{} task(s).", rows.len());
    Ok(out)
}

fn push_row(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let line: Vec<String> =
        cells.iter().zip(widths).map(|(cell, &width)| format!("{cell:<width$}")).collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

/// `personal`, or the project name (with emoji when set) for workspace tasks.
fn source_label(agg: &TaskAggregator, task: &Task) -> String {
    let Some(origin) = task.origin() else {
        return "personal".to_string();
    };
    match agg.project_meta(&origin.project_id) {
        Some(meta) => match &meta.emoji {
            Some(emoji) => format!("{emoji} {}", meta.name),
            None => meta.name.clone(),
        },
        None => format!("{}/{}", origin.workspace_id, origin.project_id),
    }
}
