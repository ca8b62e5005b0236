use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::cache::{CacheError, SnapshotCache};
use crate::model::config::CacheConfig;
use crate::model::project::Project;
use crate::ops::queries::QueryResults;

/// Key of the saved project list
pub const PROJECTS_KEY: &str = "projects";
/// Key of the saved start-page query results
pub const START_PAGE_KEY: &str = "startPageTasks";

const PROJECTS_KIND: &str = "projects";
const QUERIES_KIND: &str = "queryResults";

/// Ages too large for a `Duration` mean "never expires".
fn max_age(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

/// Typed access to the snapshots the client keeps
#[derive(Clone)]
pub struct CacheManager {
    cache: Arc<dyn SnapshotCache>,
    projects_max_age: Duration,
    queries_max_age: Duration,
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("projects_max_age", &self.projects_max_age)
            .field("queries_max_age", &self.queries_max_age)
            .finish_non_exhaustive()
    }
}

impl CacheManager {
    pub fn new(cache: Arc<dyn SnapshotCache>) -> Self {
        Self::with_config(cache, &CacheConfig::default())
    }

    pub fn with_config(cache: Arc<dyn SnapshotCache>, config: &CacheConfig) -> Self {
        CacheManager {
            cache,
            projects_max_age: max_age(config.projects_max_age_secs),
            queries_max_age: max_age(config.queries_max_age_secs),
        }
    }

    pub fn store(&self) -> &Arc<dyn SnapshotCache> {
        &self.cache
    }

    /// Saved project list, if present and fresh.
    pub fn projects(&self) -> Result<Option<Vec<Project>>, CacheError> {
        self.read_typed(PROJECTS_KEY, PROJECTS_KIND, Some(self.projects_max_age))
    }

    /// Saved project list regardless of age.
    pub fn projects_any_age(&self) -> Result<Option<Vec<Project>>, CacheError> {
        self.read_typed(PROJECTS_KEY, PROJECTS_KIND, None)
    }

    pub fn set_projects(&self, projects: &[Project]) -> Result<(), CacheError> {
        self.write_typed(PROJECTS_KEY, PROJECTS_KIND, projects)
    }

    /// Saved start-page query results, if present and fresh.
    pub fn start_page_queries(&self) -> Result<Option<QueryResults>, CacheError> {
        self.read_typed(START_PAGE_KEY, QUERIES_KIND, Some(self.queries_max_age))
    }

    /// Saved start-page query results regardless of age.
    pub fn start_page_queries_any_age(&self) -> Result<Option<QueryResults>, CacheError> {
        self.read_typed(START_PAGE_KEY, QUERIES_KIND, None)
    }

    pub fn set_start_page_queries(&self, results: &QueryResults) -> Result<(), CacheError> {
        self.write_typed(START_PAGE_KEY, QUERIES_KIND, results)
    }

    /// Drop every snapshot this manager knows about.
    pub fn clear_all(&self) -> Result<(), CacheError> {
        self.cache.remove(START_PAGE_KEY)?;
        self.cache.remove(PROJECTS_KEY)?;
        Ok(())
    }

    fn write_typed<T: Serialize + ?Sized>(
        &self,
        key: &str,
        kind: &str,
        value: &T,
    ) -> Result<(), CacheError> {
        let content = serde_json::to_value(value)?;
        self.cache.write(key, kind, content)
    }

    /// A snapshot that no longer decodes is treated as absent.
    fn read_typed<T: DeserializeOwned>(
        &self,
        key: &str,
        kind: &str,
        max_age: Option<Duration>,
    ) -> Result<Option<T>, CacheError> {
        let Some(content) = self.cache.read(key, kind, max_age)? else {
            return Ok(None);
        };
        match serde_json::from_value(content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "discarding undecodable snapshot");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::cache::{CacheEntry, MemorySnapshotCache};
    use crate::model::record::{Record, RecordMeta};
    use crate::model::task::Task;
    use crate::ops::queries::QueryResult;
    use chrono::Utc;
    use serde_json::json;

    fn project(id: i64) -> Project {
        Project::new(RecordMeta::new(id, false, 1, id as i32), format!("p{}", id), "1")
    }

    #[test]
    fn projects_round_trip() {
        let mem = Arc::new(MemorySnapshotCache::new());
        let cache = CacheManager::new(mem.clone());
        cache.set_projects(&[project(1), project(2)]).unwrap();
        let back = cache.projects().unwrap().unwrap();
        assert_eq!(back, vec![project(1), project(2)]);
        assert_eq!(mem.keys(), vec![PROJECTS_KEY.to_string()]);
    }

    #[test]
    fn queries_round_trip() {
        let cache = CacheManager::new(Arc::new(MemorySnapshotCache::new()));
        let task = Task::new(RecordMeta::new(5, false, 1, 1), 1, "x");
        let results = QueryResults::new(vec![QueryResult::new("overdue", "overdue", vec![task])]);
        cache.set_start_page_queries(&results).unwrap();
        let mut back = cache.start_page_queries().unwrap().unwrap();
        assert_eq!(back.aggregate().orders(), vec![5]);
    }

    #[test]
    fn huge_max_age_never_expires() {
        let from_file: CacheConfig =
            toml::from_str("projects_max_age_secs = 10000000000000000").unwrap();
        let widest = CacheConfig {
            projects_max_age_secs: u64::MAX,
            ..CacheConfig::default()
        };
        for config in [from_file, widest] {
            let mem = Arc::new(MemorySnapshotCache::new());
            let cache = CacheManager::with_config(mem.clone(), &config);
            let mut entry =
                CacheEntry::new("projects", serde_json::to_value(vec![project(1)]).unwrap());
            entry.saved_at = Utc::now() - Duration::days(400);
            mem.put_entry(PROJECTS_KEY, entry).unwrap();
            assert_eq!(cache.projects().unwrap(), Some(vec![project(1)]));
        }
    }

    #[test]
    fn stale_projects_need_any_age() {
        let mem = Arc::new(MemorySnapshotCache::new());
        let cache = CacheManager::new(mem.clone());
        let mut entry =
            CacheEntry::new("projects", serde_json::to_value(vec![project(1)]).unwrap());
        entry.saved_at = Utc::now() - Duration::days(2);
        mem.put_entry(PROJECTS_KEY, entry).unwrap();
        assert!(cache.projects().unwrap().is_none());
        let stale = cache.projects_any_age().unwrap().unwrap();
        assert_eq!(stale[0].id(), 1);
    }

    #[test]
    fn configured_ages_apply() {
        let mem = Arc::new(MemorySnapshotCache::new());
        let config = CacheConfig {
            queries_max_age_secs: 60,
            ..Default::default()
        };
        let cache = CacheManager::with_config(mem.clone(), &config);
        let mut entry = CacheEntry::new("queryResults", json!([]));
        entry.saved_at = Utc::now() - Duration::minutes(5);
        mem.put_entry(START_PAGE_KEY, entry).unwrap();
        assert!(cache.start_page_queries().unwrap().is_none());
    }

    #[test]
    fn undecodable_snapshot_is_absent() {
        let mem = Arc::new(MemorySnapshotCache::new());
        let cache = CacheManager::new(mem.clone());
        mem.write(PROJECTS_KEY, "projects", json!({"not": "a list"}))
            .unwrap();
        assert!(cache.projects().unwrap().is_none());
    }

    #[test]
    fn clear_all_removes_both() {
        let mem = Arc::new(MemorySnapshotCache::new());
        let cache = CacheManager::new(mem.clone());
        cache.set_projects(&[project(1)]).unwrap();
        cache.set_start_page_queries(&QueryResults::default()).unwrap();
        cache.clear_all().unwrap();
        assert!(mem.keys().is_empty());
    }
}
