use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tisk::io::cache::FileSnapshotCache;
use tisk::io::snapshots::CacheManager;
use tisk::model::{Priority, Project, Record, RecordId, Task};
use tisk::ops::hierarchy::Hierarchy;
use tisk::ops::project_ops::ProjectCollection;
use tisk::ops::queries::QueryResults;
use tisk::ops::task_ops::TaskCollection;

/// Helper: read a fixture file as text
fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Could not read fixture {}: {}", name, e))
}

fn ids<T: Record>(records: &[T]) -> Vec<RecordId> {
    records.iter().map(|r| r.id()).collect()
}

/// Serialize, parse again, and check nothing moved or changed.
fn assert_records_round_trip<T>(records: &[T])
where
    T: Record + PartialEq + serde::Serialize + serde::de::DeserializeOwned,
{
    let text = serde_json::to_string(records).unwrap();
    let back: Vec<T> = serde_json::from_str(&text).unwrap();
    assert_eq!(back.as_slice(), records);
    assert_eq!(Hierarchy::build(&back), Hierarchy::build(records));
}

// ============================================================================
// Tasks
// ============================================================================

fn load_tasks() -> TaskCollection {
    let tasks: Vec<Task> = serde_json::from_str(&fixture("project_tasks.json")).unwrap();
    let mut collection = TaskCollection::default();
    collection.import_array(tasks);
    collection
}

#[test]
fn tasks_parse_mixed_flag_shapes() {
    let tasks = load_tasks();
    assert_eq!(tasks.len(), 8);
    assert!(tasks.get(102).unwrap().checked);
    assert!(tasks.get(103).unwrap().meta.collapsed);
    assert!(!tasks.get(103).unwrap().checked);
    assert_eq!(tasks.get(103).unwrap().due_date, None);
    assert_eq!(tasks.get(101).unwrap().priority, Priority::HIGHEST);
    assert_eq!(tasks.get(108).unwrap().priority, Priority::HIGHEST);
    assert_eq!(tasks.get(108).unwrap().indent(), 1);
}

#[test]
fn tasks_derive_outline() {
    let tasks = load_tasks();
    assert_eq!(tasks.descendant_ids(101), vec![102, 103, 104, 105]);
    assert_eq!(tasks.descendant_ids(103), vec![104, 105]);
    assert_eq!(tasks.parent(104).map(|t| t.id()), Some(103));
    assert_eq!(tasks.parent(107).map(|t| t.id()), Some(106));
    assert!(tasks.parent(108).is_none());

    let visible: Vec<RecordId> = tasks.visible().map(|t| t.id()).collect();
    assert_eq!(visible, vec![101, 102, 103, 106, 107, 108]);
}

#[test]
fn tasks_round_trip_through_json() {
    let tasks = load_tasks();
    assert_records_round_trip(tasks.records());

    // flags always leave as 0/1
    let out = serde_json::to_value(tasks.get(103).unwrap()).unwrap();
    assert_eq!(out["collapsed"], 1);
    assert_eq!(out["checked"], 0);
    assert!(out.get("due_date").is_none());
}

#[test]
fn tasks_display_helpers() {
    let tasks = load_tasks();
    assert_eq!(tasks.get(102).unwrap().content_for_display(), "Collect W-2 forms");
    assert!(!tasks.get(106).unwrap().shows_checkbox());
    assert!(tasks.get(107).unwrap().is_recurring());
    assert!(tasks.get(107).unwrap().has_time_specified());
}

#[test]
fn delete_then_renumber_keeps_outline() {
    let mut tasks = load_tasks();
    tasks.delete(103);
    tasks.update_orders();
    assert_eq!(tasks.orders(), vec![101, 102, 106, 107, 108]);
    let numbers: Vec<i32> = tasks.records().iter().map(|t| t.item_order()).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    assert_records_round_trip(tasks.records());
}

// ============================================================================
// Projects
// ============================================================================

#[test]
fn projects_parse_legacy_fields() {
    let projects: Vec<Project> = serde_json::from_str(&fixture("projects.json")).unwrap();
    assert_eq!(projects[0].color_index(), 8);
    assert_eq!(projects[1].color, "4");
    assert_eq!(projects[1].color_hex(), "#A8C9E5");
    assert_eq!(projects[2].color_index(), 10);
    assert_eq!(projects[3].color_index(), 10);
    assert_eq!(projects[3].display_name(), "Work");
    assert_eq!(projects[4].name, "Unknown");
    assert_eq!(projects[4].color, "#BDE876");
    assert_eq!(projects[4].cache_count, 0);
    assert_records_round_trip(&projects);
}

#[test]
fn projects_survive_file_snapshot() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = FileSnapshotCache::open(dir.path()).unwrap();
    let cache = CacheManager::new(Arc::new(store));

    let incoming: Vec<Project> = serde_json::from_str(&fixture("projects.json")).unwrap();
    let mut projects = ProjectCollection::seeded(cache.clone(), Vec::new());
    projects.import_array(incoming.clone());
    assert_eq!(projects.hook().writes(), 1);

    let reopened = ProjectCollection::from_cache(cache);
    assert_eq!(reopened.records(), incoming.as_slice());
    assert_eq!(ids(reopened.children(7)), vec![8, 9]);
    assert!(reopened.is_hidden(9));
    assert_eq!(reopened.parent(11).map(|p| p.id()), Some(10));
}

// ============================================================================
// Start page
// ============================================================================

#[test]
fn start_page_merges_all_queries() {
    let mut results: QueryResults = serde_json::from_str(&fixture("start_page.json")).unwrap();
    assert_eq!(results.results().len(), 4);
    assert_eq!(results.find("2012-03-23T09:00:00").unwrap().tasks.len(), 2);
    assert!(results.find("2012-03-24T09:00:00").unwrap().tasks.is_empty());

    let merged = results.aggregate();
    assert_eq!(merged.orders(), vec![201, 202, 203, 201]);
    assert_eq!(merged.parent(203).map(|t| t.id()), Some(202));
}

#[test]
fn start_page_round_trips_with_array_data() {
    let results: QueryResults = serde_json::from_str(&fixture("start_page.json")).unwrap();
    let text = serde_json::to_string(&results).unwrap();
    let mut back: QueryResults = serde_json::from_str(&text).unwrap();

    // string-encoded data comes back out as a plain array
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(value[1]["data"].is_array());

    for (a, b) in results.results().iter().zip(back.results()) {
        assert_eq!(a.query, b.query);
        assert_eq!(a.type_name, b.type_name);
        assert_eq!(a.tasks.records(), b.tasks.records());
    }
    assert_eq!(back.aggregate().len(), 4);
}
