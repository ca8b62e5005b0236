//! Client workflows: call the remote service, then apply the result to the
//! local collections.
//!
//! Local state only changes after the call it depends on succeeded. Order
//! pushes are the exception: the local reorder has already happened when the
//! push goes out, and a failed push is reported without undoing it.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::collection::InsertPosition;
use super::project_ops::ProjectCollection;
use super::queries::QueryResults;
use super::task_ops::TaskCollection;
use crate::api::{ApiResult, ItemUpdate, ProjectUpdate, TodoApi};
use crate::io::snapshots::CacheManager;
use crate::model::color::DEFAULT_COLOR_INDEX;
use crate::model::priority::Priority;
use crate::model::record::{INDENT_MIN, Record, RecordId};

/// A task about to be created
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub content: String,
    pub date_string: Option<String>,
    pub priority: Priority,
}

impl NewTask {
    pub fn new(content: impl Into<String>) -> Self {
        NewTask {
            content: content.into(),
            ..Default::default()
        }
    }
}

/// What a completion toggle ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Recurring task moved on to its next date
    Rescheduled,
    /// Top-level task completed into history and dropped from the list
    Archived,
    /// Nested task checked off in place
    Checked,
    /// Checked task reopened
    Unchecked,
}

/// Local state of a signed-in client, kept in step with the server
pub struct Client<A: TodoApi> {
    api: A,
    cache: CacheManager,
    projects: ProjectCollection,
    tasks: IndexMap<RecordId, TaskCollection>,
    start_page: Option<QueryResults>,
}

impl<A: TodoApi> Client<A> {
    /// Start from whatever the snapshot cache still holds.
    pub fn new(api: A, cache: CacheManager) -> Self {
        let projects = ProjectCollection::from_cache(cache.clone());
        let start_page = cache.start_page_queries().unwrap_or_else(|e| {
            warn!(error = %e, "could not read start page snapshot");
            None
        });
        Client {
            api,
            cache,
            projects,
            tasks: IndexMap::new(),
            start_page,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    pub fn projects(&self) -> &ProjectCollection {
        &self.projects
    }

    pub fn tasks(&self, project_id: RecordId) -> Option<&TaskCollection> {
        self.tasks.get(&project_id)
    }

    pub fn start_page(&self) -> Option<&QueryResults> {
        self.start_page.as_ref()
    }

    pub fn start_page_mut(&mut self) -> Option<&mut QueryResults> {
        self.start_page.as_mut()
    }

    fn task_list(&mut self, project_id: RecordId) -> &mut TaskCollection {
        self.tasks.entry(project_id).or_default()
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn load_projects(&mut self) -> ApiResult<()> {
        let projects = self.api.get_projects()?;
        info!(count = projects.len(), "loaded projects");
        self.projects.import_array(projects);
        Ok(())
    }

    /// Create a project next to `near` (or at the end) and push the new
    /// order. The new project copies the color and indent of `near`.
    pub fn add_project(
        &mut self,
        name: &str,
        near: Option<RecordId>,
        before: bool,
    ) -> ApiResult<RecordId> {
        let anchor = near.and_then(|id| self.projects.get(id));
        let color = anchor.map_or(DEFAULT_COLOR_INDEX, |p| p.color_index());
        let indent = anchor.map_or(INDENT_MIN, |p| p.indent());
        let order = anchor.map_or(0, |p| p.item_order());

        let project = self.api.add_project(name, color, indent, order)?;
        let id = project.id();
        info!(id, name, "added project");
        self.projects.add(project, InsertPosition::near(near, before));
        self.projects.update_orders();
        self.api.update_project_orders(&self.projects.orders())?;
        Ok(id)
    }

    pub fn update_project(&mut self, id: RecordId, update: &ProjectUpdate) -> ApiResult<()> {
        let project = self.api.update_project(id, update)?;
        self.projects.update(project);
        Ok(())
    }

    /// Indent (`delta > 0`) or outdent a project by one or more levels.
    pub fn indent_project(&mut self, id: RecordId, delta: i32) -> ApiResult<()> {
        let Some(project) = self.projects.get(id) else {
            debug!(id, "indent of unknown project ignored");
            return Ok(());
        };
        let mut meta = project.meta().clone();
        meta.set_indent(meta.indent().saturating_add(delta));
        let update = ProjectUpdate {
            indent: Some(meta.indent()),
            ..Default::default()
        };
        self.update_project(id, &update)
    }

    /// Delete a project along with its sub-projects and their task lists.
    pub fn delete_project(&mut self, id: RecordId) -> ApiResult<()> {
        self.api.delete_project(id)?;
        let mut doomed = vec![id];
        doomed.extend(self.projects.descendant_ids(id));
        self.projects.delete(id);
        for project_id in doomed {
            self.tasks.shift_remove(&project_id);
        }
        info!(id, "deleted project");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub fn load_tasks(&mut self, project_id: RecordId) -> ApiResult<()> {
        let tasks = self.api.get_uncompleted_items(project_id)?;
        info!(project_id, count = tasks.len(), "loaded tasks");
        self.task_list(project_id).import_array(tasks);
        Ok(())
    }

    /// Create a task next to `near` and push the project's new order.
    ///
    /// Without an anchor the task goes after the last one. The server can't
    /// create a task at an indent, so an anchored task gets a follow-up edit
    /// setting the indent it takes from its anchor.
    pub fn add_task(
        &mut self,
        project_id: RecordId,
        new: &NewTask,
        near: Option<RecordId>,
        before: bool,
    ) -> ApiResult<RecordId> {
        let (near, before) = match near {
            Some(id) => (Some(id), before),
            None => (self.tasks(project_id).and_then(|t| t.last()).map(|t| t.id()), false),
        };

        let mut task = self.api.add_item(
            project_id,
            &new.content,
            new.date_string.as_deref(),
            new.priority,
        )?;
        if near.is_some() {
            let indent = self.task_list(project_id).indent_for_insert(near, before);
            let update = ItemUpdate {
                indent: Some(indent),
                ..Default::default()
            };
            task = self.api.update_item(task.id(), &update)?;
        }

        let id = task.id();
        info!(project_id, id, "added task");
        let tasks = self.task_list(project_id);
        tasks.add(task, InsertPosition::near(near, before));
        tasks.update_orders();
        let orders = tasks.orders();

        self.projects.adjust_cache_count(project_id, 1);
        self.projects.save_to_cache();
        self.api.update_orders(project_id, &orders)?;
        Ok(id)
    }

    pub fn update_task(
        &mut self,
        project_id: RecordId,
        id: RecordId,
        update: &ItemUpdate,
    ) -> ApiResult<()> {
        let task = self.api.update_item(id, update)?;
        self.task_list(project_id).update(task);
        Ok(())
    }

    pub fn indent_task(&mut self, project_id: RecordId, id: RecordId, delta: i32) -> ApiResult<()> {
        let Some(task) = self.tasks(project_id).and_then(|t| t.get(id)) else {
            debug!(project_id, id, "indent of unknown task ignored");
            return Ok(());
        };
        let mut meta = task.meta().clone();
        meta.set_indent(meta.indent().saturating_add(delta));
        let update = ItemUpdate {
            indent: Some(meta.indent()),
            ..Default::default()
        };
        self.update_task(project_id, id, &update)
    }

    /// Delete a task. Its nested tasks leave the local list with it.
    pub fn delete_task(&mut self, project_id: RecordId, id: RecordId) -> ApiResult<()> {
        self.api.delete_items(&[id])?;
        self.task_list(project_id).delete(id);
        Ok(())
    }

    /// Flip a task's completion, acting on the task and everything nested
    /// under it. Returns `None` for an unknown task.
    pub fn toggle_completion(
        &mut self,
        project_id: RecordId,
        id: RecordId,
    ) -> ApiResult<Option<Completion>> {
        let Some(tasks) = self.tasks.get(&project_id) else {
            return Ok(None);
        };
        let Some(task) = tasks.get(id) else {
            debug!(project_id, id, "toggle of unknown task ignored");
            return Ok(None);
        };
        let targets = tasks.completion_targets(id);
        let checked = task.checked;
        let recurring = task.is_recurring();
        let top_level = tasks.parent(id).is_none();

        if checked {
            self.uncomplete(project_id, &targets)?;
            return Ok(Some(Completion::Unchecked));
        }

        if recurring {
            let updated = self.api.update_recurring_date(&targets)?;
            self.task_list(project_id).update_many(updated);
            info!(project_id, id, "rescheduled recurring task");
            return Ok(Some(Completion::Rescheduled));
        }

        self.api.complete_items(&targets, top_level)?;
        let tasks = self.task_list(project_id);
        let outcome = if top_level {
            tasks.delete(id);
            Completion::Archived
        } else {
            tasks.complete_items(&targets);
            Completion::Checked
        };
        self.projects
            .adjust_cache_count(project_id, -(targets.len() as i64));
        self.projects.save_to_cache();
        info!(project_id, id, count = targets.len(), ?outcome, "completed tasks");
        Ok(Some(outcome))
    }

    fn uncomplete(&mut self, project_id: RecordId, targets: &[RecordId]) -> ApiResult<()> {
        self.api.uncomplete_items(targets)?;
        let tasks = self.task_list(project_id);
        tasks.uncomplete_items(targets);
        let orders = tasks.orders();

        self.projects
            .adjust_cache_count(project_id, targets.len() as i64);
        self.projects.save_to_cache();
        info!(project_id, count = targets.len(), "reopened tasks");

        // the server moves reopened tasks to the end of their parent
        self.api.update_orders(project_id, &orders)
    }

    // -----------------------------------------------------------------------
    // Start page
    // -----------------------------------------------------------------------

    /// Run the start-page queries and fold the results into the current
    /// view, keeping its merged task list alive across refreshes.
    pub fn refresh_start_page(&mut self, queries: &[String]) -> ApiResult<()> {
        let results = self.api.query(queries)?;
        info!(queries = queries.len(), results = results.len(), "refreshed start page");
        let view = match self.start_page.take() {
            None => QueryResults::new(results),
            Some(mut existing) => {
                existing.import_new_queries(results);
                existing
            }
        };
        if let Err(e) = self.cache.set_start_page_queries(&view) {
            warn!(error = %e, "could not save start page snapshot");
        }
        self.start_page = Some(view);
        Ok(())
    }
}
