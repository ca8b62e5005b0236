//! Saved-query results and the merged view across them.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use super::task_ops::TaskCollection;
use crate::model::query::QueryType;
use crate::model::task::Task;

/// Tasks matching one query string
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// The wire `type` field, kept even when it isn't a known `QueryType`
    pub type_name: String,
    pub query_type: Option<QueryType>,
    pub query: String,
    pub tasks: TaskCollection,
}

impl QueryResult {
    pub fn new(type_name: &str, query: &str, tasks: Vec<Task>) -> Self {
        let query_type = QueryType::parse_type(type_name);
        if query_type.is_none() {
            warn!(type_name, "unknown query type");
        }
        let mut collection = TaskCollection::default();
        collection.import_array(tasks);
        QueryResult {
            type_name: type_name.to_string(),
            query_type,
            query: query.to_string(),
            tasks: collection,
        }
    }
}

/// `data` arrives either as an array or as a string holding one
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskData {
    Tasks(Vec<Task>),
    Encoded(String),
}

#[derive(Deserialize)]
struct QueryResultIn {
    #[serde(rename = "type", default)]
    type_name: String,
    #[serde(default)]
    query: String,
    #[serde(default)]
    data: Option<TaskData>,
}

#[derive(Serialize)]
struct QueryResultOut<'a> {
    #[serde(rename = "type")]
    type_name: &'a str,
    query: &'a str,
    data: &'a [Task],
}

impl<'de> Deserialize<'de> for QueryResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = QueryResultIn::deserialize(deserializer)?;
        let tasks = match raw.data {
            Some(TaskData::Tasks(tasks)) => tasks,
            Some(TaskData::Encoded(text)) if !text.is_empty() => {
                serde_json::from_str(&text).unwrap_or_else(|e| {
                    warn!(query = %raw.query, error = %e, "unreadable query data");
                    Vec::new()
                })
            }
            _ => Vec::new(),
        };
        Ok(QueryResult::new(&raw.type_name, &raw.query, tasks))
    }
}

impl Serialize for QueryResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        QueryResultOut {
            type_name: &self.type_name,
            query: &self.query,
            data: self.tasks.records(),
        }
        .serialize(serializer)
    }
}

/// Results of several queries plus a merged view over all of them.
///
/// The merged view is a plain concatenation in query order: a task matching
/// two queries appears twice. It is built on first access and kept as the
/// same collection across refreshes, so holders of it see new results
/// without re-fetching it.
#[derive(Debug, Clone, Default)]
pub struct QueryResults {
    results: Vec<QueryResult>,
    aggregate: Option<TaskCollection>,
}

impl QueryResults {
    pub fn new(results: Vec<QueryResult>) -> Self {
        QueryResults {
            results,
            aggregate: None,
        }
    }

    pub fn results(&self) -> &[QueryResult] {
        &self.results
    }

    pub fn find(&self, query: &str) -> Option<&QueryResult> {
        self.results.iter().find(|r| r.query == query)
    }

    pub fn find_mut(&mut self, query: &str) -> Option<&mut QueryResult> {
        self.results.iter_mut().find(|r| r.query == query)
    }

    /// Whether the merged view has been built yet
    pub fn has_aggregate(&self) -> bool {
        self.aggregate.is_some()
    }

    /// The merged view, built from the current results on first call.
    pub fn aggregate(&mut self) -> &mut TaskCollection {
        let results = &self.results;
        self.aggregate.get_or_insert_with(|| {
            let mut merged = TaskCollection::default();
            append_queries(&mut merged, results);
            merged
        })
    }

    /// Swap in fresh results and refill the existing merged view from them.
    pub fn import_new_queries(&mut self, results: Vec<QueryResult>) {
        self.results = results;
        let merged = self.aggregate.get_or_insert_with(TaskCollection::default);
        merged.clear_array();
        append_queries(merged, &self.results);
    }
}

fn append_queries(merged: &mut TaskCollection, results: &[QueryResult]) {
    for result in results {
        debug!(query = %result.query, count = result.tasks.len(), "merging query result");
        merged.append_array(result.tasks.records().iter().cloned());
    }
}

impl Serialize for QueryResults {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.results.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for QueryResults {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(QueryResults::new(Vec::deserialize(deserializer)?))
    }
}

// ---------------------------------------------------------------------------
// Start page
// ---------------------------------------------------------------------------

const QUERY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Queries shown on the start page when the user's setting yields none
const FALLBACK_START_PAGE: &str = "od, tod, tom";

/// Expand the user's comma-separated start-page setting into the queries
/// to run.
///
/// `tod`, `tom` and `N days` become one dated query per day, `priority N`
/// becomes `pN`. Pages that aren't task lists (`_info_page`, `_blank`,
/// `_project…`) contribute nothing; everything else passes through. When
/// nothing is left, overdue/today/tomorrow is used.
pub fn start_page_queries(start_page: &str, now: NaiveDateTime) -> Vec<String> {
    let queries = expand_start_page(start_page, now);
    if queries.is_empty() {
        return expand_start_page(FALLBACK_START_PAGE, now);
    }
    queries
}

fn expand_start_page(start_page: &str, now: NaiveDateTime) -> Vec<String> {
    let mut queries = Vec::new();
    for term in start_page.split(',').map(str::trim) {
        if term.is_empty() {
            continue;
        }
        if let Some(level) = term.strip_prefix("priority ") {
            queries.push(format!("p{}", level.trim()));
        } else if term == "tod" {
            queries.push(day_query(now, 0));
        } else if term == "tom" {
            queries.push(day_query(now, 1));
        } else if let Some(days) = term.strip_suffix(" days") {
            match days.trim().parse::<i64>() {
                Ok(n) => queries.extend((0..n).map(|i| day_query(now, i))),
                Err(_) => warn!(term, "unreadable day count in start page"),
            }
        } else if term == "_info_page" || term == "_blank" || term.starts_with("_project") {
            debug!(term, "start page is not a task list");
        } else {
            queries.push(term.to_string());
        }
    }
    queries
}

fn day_query(now: NaiveDateTime, offset_days: i64) -> String {
    (now + Duration::days(offset_days))
        .format(QUERY_DATE_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::{Record, RecordId, RecordMeta};
    use pretty_assertions::assert_eq;

    fn task(id: RecordId, indent: i32) -> Task {
        Task::new(RecordMeta::new(id, false, indent, 1), 1, format!("t{}", id))
    }

    fn ids(c: &TaskCollection) -> Vec<RecordId> {
        c.records().iter().map(|t| t.id()).collect()
    }

    #[test]
    fn aggregate_concatenates_in_query_order() {
        let mut results = QueryResults::new(vec![
            QueryResult::new("date", "today", vec![task(1, 1), task(2, 2)]),
            QueryResult::new("overdue", "overdue", vec![task(3, 1), task(1, 1)]),
        ]);
        assert!(!results.has_aggregate());
        assert_eq!(ids(results.aggregate()), vec![1, 2, 3, 1]);
        assert!(results.has_aggregate());
        assert!(results.aggregate().is_parent(1));
    }

    #[test]
    fn aggregate_is_cached_until_new_results() {
        let mut results =
            QueryResults::new(vec![QueryResult::new("date", "today", vec![task(1, 1)])]);
        results.aggregate().update_orders();
        // editing a query's own tasks does not touch the cached view
        results
            .find_mut("today")
            .unwrap()
            .tasks
            .append_array(vec![task(9, 1)]);
        assert_eq!(ids(results.aggregate()), vec![1]);

        results.import_new_queries(vec![
            QueryResult::new("priority", "p1", vec![task(4, 1)]),
            QueryResult::new("date", "tomorrow", vec![task(5, 1), task(6, 2)]),
        ]);
        assert_eq!(ids(results.aggregate()), vec![4, 5, 6]);
        assert_eq!(results.results().len(), 2);
        assert!(results.find("today").is_none());
    }

    #[test]
    fn import_before_first_access_builds_view() {
        let mut results = QueryResults::default();
        results.import_new_queries(vec![QueryResult::new("date", "today", vec![task(1, 1)])]);
        assert_eq!(ids(results.aggregate()), vec![1]);
    }

    #[test]
    fn unknown_query_type_is_kept_as_text() {
        let r = QueryResult::new("label", "@errand", vec![]);
        assert_eq!(r.query_type, None);
        assert_eq!(r.type_name, "label");
    }

    #[test]
    fn deserializes_array_and_encoded_data() {
        let json = r#"[
            {"type":"date","query":"today","data":[{"id":1,"indent":1,"content":"a"}]},
            {"type":"overdue","query":"overdue","data":"[{\"id\":2,\"indent\":1,\"content\":\"b\"}]"},
            {"type":"priority","query":"p1","data":""},
            {"type":"priority","query":"p2"}
        ]"#;
        let mut results: QueryResults = serde_json::from_str(json).unwrap();
        assert_eq!(results.results().len(), 4);
        assert_eq!(results.results()[0].query_type, Some(QueryType::Date));
        assert_eq!(ids(results.aggregate()), vec![1, 2]);
    }

    #[test]
    fn serializes_as_array_of_results() {
        let results = QueryResults::new(vec![QueryResult::new("date", "today", vec![task(1, 1)])]);
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json[0]["type"], "date");
        assert_eq!(json[0]["query"], "today");
        assert_eq!(json[0]["data"][0]["id"], 1);

        let back: QueryResults = serde_json::from_value(json).unwrap();
        assert_eq!(back.results()[0].tasks.records(), results.results()[0].tasks.records());
    }

    fn at(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, QUERY_DATE_FORMAT).unwrap()
    }

    #[test]
    fn start_page_terms_expand() {
        let now = at("2012-03-23T09:30:00");
        assert_eq!(
            start_page_queries("tod, tom, priority 4, od", now),
            vec!["2012-03-23T09:30:00", "2012-03-24T09:30:00", "p4", "od"]
        );
        assert_eq!(
            start_page_queries("3 days", now),
            vec!["2012-03-23T09:30:00", "2012-03-24T09:30:00", "2012-03-25T09:30:00"]
        );
    }

    #[test]
    fn non_list_start_page_falls_back() {
        let now = at("2012-12-31T23:00:00");
        let expected = vec!["od", "2012-12-31T23:00:00", "2013-01-01T23:00:00"];
        assert_eq!(start_page_queries("_info_page", now), expected);
        assert_eq!(start_page_queries("_project_882871", now), expected);
        assert_eq!(start_page_queries("", now), expected);
        assert_eq!(start_page_queries("x days", now), expected);
    }
}
