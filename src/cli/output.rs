use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::priority::Priority;
use crate::model::project::Project;
use crate::model::record::{Record, RecordId};
use crate::model::task::Task;
use crate::ops::collection::{ChangeHook, OrderedCollection};
use crate::ops::queries::QueryResults;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TreeNodeJson {
    pub id: RecordId,
    pub text: String,
    pub indent: i32,
    pub order: i32,
    pub collapsed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNodeJson>,
}

#[derive(Serialize)]
pub struct ProjectJson {
    pub id: RecordId,
    pub name: String,
    pub color: String,
    pub indent: i32,
    pub order: i32,
    pub outstanding: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<RecordId>,
    pub hidden: bool,
}

#[derive(Serialize)]
pub struct QueryJson {
    #[serde(rename = "type")]
    pub type_name: String,
    pub query: String,
    pub tasks: Vec<RecordId>,
}

#[derive(Serialize)]
pub struct StartPageJson {
    pub queries: Vec<QueryJson>,
    pub merged: Vec<TreeNodeJson>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Nest a collection by its hierarchy, roots first
pub fn tree_to_json<T: Record, H: ChangeHook<T>>(
    collection: &OrderedCollection<T, H>,
) -> Vec<TreeNodeJson> {
    let h = collection.hierarchy();
    (0..collection.len())
        .filter(|&idx| h.parent(idx).is_none())
        .map(|idx| node_to_json(collection, idx))
        .collect()
}

fn node_to_json<T: Record, H: ChangeHook<T>>(
    collection: &OrderedCollection<T, H>,
    idx: usize,
) -> TreeNodeJson {
    let record = &collection.records()[idx];
    TreeNodeJson {
        id: record.id(),
        text: record.text().to_string(),
        indent: record.indent(),
        order: record.item_order(),
        collapsed: record.is_collapsed(),
        children: collection
            .hierarchy()
            .direct_children(idx)
            .map(|c| node_to_json(collection, c))
            .collect(),
    }
}

pub fn project_to_json<H: ChangeHook<Project>>(
    projects: &OrderedCollection<Project, H>,
    project: &Project,
) -> ProjectJson {
    ProjectJson {
        id: project.id(),
        name: project.display_name().to_string(),
        color: project.color_hex(),
        indent: project.indent(),
        order: project.item_order(),
        outstanding: project.cache_count,
        parent: projects.parent(project.id()).map(|p| p.id()),
        hidden: projects.is_hidden(project.id()),
    }
}

pub fn start_page_to_json(results: &mut QueryResults) -> StartPageJson {
    let queries = results
        .results()
        .iter()
        .map(|r| QueryJson {
            type_name: r.type_name.clone(),
            query: r.query.clone(),
            tasks: r.tasks.orders(),
        })
        .collect();
    StartPageJson {
        queries,
        merged: tree_to_json(results.aggregate()),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// One line per record, nested two spaces per level.
///
/// Unless `show_hidden` is set, records under a collapsed ancestor are left
/// out and the collapsed record notes how many it hides.
pub fn format_tree<T, H, F>(
    collection: &OrderedCollection<T, H>,
    show_hidden: bool,
    label: F,
) -> Vec<String>
where
    T: Record,
    H: ChangeHook<T>,
    F: Fn(&T) -> String,
{
    let h = collection.hierarchy();
    let records = collection.records();
    let mut lines = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        let hidden = h.ancestors(idx).any(|a| records[a].is_collapsed());
        if hidden && !show_hidden {
            continue;
        }
        let depth = h.ancestors(idx).count();
        let mut line = format!("{}{}", "  ".repeat(depth), label(record));
        if record.is_collapsed() && h.is_parent(idx) && !show_hidden {
            line.push_str(&format!(" [+{}]", h.children(idx).len()));
        }
        lines.push(line);
    }
    lines
}

/// Format a task as a one-line summary
pub fn format_task_line(task: &Task, tz_offset_hours: i32, now: DateTime<Utc>) -> String {
    let check = if !task.shows_checkbox() {
        ""
    } else if task.checked {
        "[x] "
    } else {
        "[ ] "
    };
    let priority = if task.priority > Priority::LOWEST {
        format!(" !{}", task.priority)
    } else {
        String::new()
    };
    let due = task
        .due_label(tz_offset_hours, now)
        .map(|label| format!(" ({})", label.text))
        .unwrap_or_default();
    format!(
        "{}{} {}{}{}",
        check,
        task.id(),
        task.content_for_display(),
        priority,
        due
    )
}

/// Format a project as a one-line summary
pub fn format_project_line(project: &Project) -> String {
    let outstanding = if project.cache_count > 0 {
        format!(" ({})", project.cache_count)
    } else {
        String::new()
    };
    format!(
        "{} {} {}{}",
        project.id(),
        project.display_name(),
        project.color_hex(),
        outstanding
    )
}

/// Per-query headers followed by the merged task tree
pub fn format_start_page(
    results: &mut QueryResults,
    tz_offset_hours: i32,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut lines = Vec::new();
    for result in results.results() {
        lines.push(format!(
            "{} \"{}\": {} task(s)",
            result.type_name,
            result.query,
            result.tasks.len()
        ));
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.extend(format_tree(results.aggregate(), true, |t| {
        format_task_line(t, tz_offset_hours, now)
    }));
    lines
}
