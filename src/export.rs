//! CSV export of task listings.
//!
//! Rows are quoted per RFC 4180: a field containing a comma, double quote,
//! or line break is wrapped in double quotes with embedded quotes doubled.

use crate::task::domain::Task;
use chrono::SecondsFormat;

/// Column header row of a task export.
pub const CSV_HEADER: &str =
    "id,projectId,datasetId,dataItemId,title,status,priority,assignedToId,createdAt";

/// Renders tasks as a CSV document, one row per task under [`CSV_HEADER`].
///
/// The `assignedToId` column is empty for unassigned tasks, and timestamps
/// are rendered as UTC RFC 3339 with millisecond precision.
#[must_use]
pub fn render_tasks_csv(tasks: &[Task]) -> String {
    let mut output = String::from(CSV_HEADER);
    for task in tasks {
        output.push('\n');
        output.push_str(&render_row(task));
    }
    output
}

fn render_row(task: &Task) -> String {
    let assigned_to = task
        .assignee()
        .map(|assignee| assignee.to_string())
        .unwrap_or_default();
    let fields = [
        task.id().to_string(),
        task.project_id().to_string(),
        task.dataset_id().to_string(),
        task.data_item_id().to_string(),
        task.title().as_str().to_owned(),
        task.status().to_string(),
        task.priority().to_string(),
        assigned_to,
        task.created_at()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    ];
    let escaped: Vec<String> = fields.iter().map(|field| csv_escape(field)).collect();
    escaped.join(",")
}

/// Escapes one CSV field, leaving it unchanged unless quoting is needed.
fn csv_escape(field: &str) -> String {
    if !field.contains([',', '"', '\n', '\r']) {
        return field.to_owned();
    }

    let mut escaped = String::with_capacity(field.len() + 2);
    escaped.push('"');
    for ch in field.chars() {
        if ch == '"' {
            escaped.push_str("\"\"");
        } else {
            escaped.push(ch);
        }
    }
    escaped.push('"');
    escaped
}
