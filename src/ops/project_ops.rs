use tracing::{debug, warn};

use super::collection::{ChangeHook, OrderedCollection};
use crate::io::snapshots::CacheManager;
use crate::model::project::Project;
use crate::model::record::RecordId;

/// Writes the whole project list to the snapshot cache after every change.
///
/// A hook without a cache (the `Default`) does nothing, which is what an
/// offline view over a file wants.
#[derive(Debug, Clone, Default)]
pub struct ProjectSnapshotHook {
    cache: Option<CacheManager>,
    writes: usize,
}

impl ProjectSnapshotHook {
    pub fn new(cache: CacheManager) -> Self {
        ProjectSnapshotHook {
            cache: Some(cache),
            writes: 0,
        }
    }

    pub fn cache(&self) -> Option<&CacheManager> {
        self.cache.as_ref()
    }

    /// Snapshots successfully written so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn save(&mut self, projects: &[Project]) {
        let Some(cache) = &self.cache else {
            return;
        };
        match cache.set_projects(projects) {
            Ok(()) => {
                self.writes += 1;
                debug!(count = projects.len(), "saved project snapshot");
            }
            Err(e) => warn!(error = %e, "could not save project snapshot"),
        }
    }
}

impl ChangeHook<Project> for ProjectSnapshotHook {
    fn after_change(&mut self, records: &[Project]) {
        self.save(records);
    }
}

/// The user's project list, mirrored to the snapshot cache
pub type ProjectCollection = OrderedCollection<Project, ProjectSnapshotHook>;

impl ProjectCollection {
    /// Project list backed by `cache`, seeded from its snapshot when one is
    /// present and fresh. Seeding does not write the snapshot back.
    pub fn from_cache(cache: CacheManager) -> Self {
        let snapshot = match cache.projects() {
            Ok(projects) => projects,
            Err(e) => {
                warn!(error = %e, "could not read project snapshot");
                None
            }
        };
        Self::seeded(cache, snapshot.unwrap_or_default())
    }

    /// Project list backed by `cache`, starting from `projects` without
    /// writing them.
    pub fn seeded(cache: CacheManager, projects: Vec<Project>) -> Self {
        let mut collection = ProjectCollection::new(ProjectSnapshotHook::default());
        if !projects.is_empty() {
            collection.import_array(projects);
        }
        *collection.hook_mut() = ProjectSnapshotHook::new(cache);
        collection
    }

    /// Write the current list to the cache outside the usual change flow
    /// (cache-count edits don't go through the hook).
    pub fn save_to_cache(&mut self) {
        let projects = self.records().to_vec();
        self.hook_mut().save(&projects);
    }

    /// Add `delta` to a project's outstanding-task count, flooring at zero.
    /// Returns false for an unknown id.
    pub fn adjust_cache_count(&mut self, id: RecordId, delta: i64) -> bool {
        self.modify(id, |project| {
            if delta >= 0 {
                project.increment_cache_count(delta as usize);
            } else {
                project.decrement_cache_count(delta.unsigned_abs() as usize);
            }
        })
    }
}
