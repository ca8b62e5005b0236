//! Contract with the remote task service.
//!
//! Only the shape lives here. The workflows in `ops::sync` are written
//! against `TodoApi`, and whatever speaks the actual protocol implements it.

use crate::model::priority::Priority;
use crate::model::project::Project;
use crate::model::record::RecordId;
use crate::model::task::Task;
use crate::ops::queries::QueryResult;

/// Error type for remote calls
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("could not reach the server: {0}")]
    Connection(String),
    #[error("server rejected the request: {0}")]
    Rejected(String),
    #[error("not logged in")]
    Unauthorized,
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Partial edit of a task. `None` leaves a field as it is on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemUpdate {
    pub content: Option<String>,
    pub date_string: Option<String>,
    pub priority: Option<Priority>,
    pub indent: Option<i32>,
    pub item_order: Option<i32>,
    pub collapsed: Option<bool>,
}

impl ItemUpdate {
    /// The edit that makes the server's copy match `task`.
    pub fn from_task(task: &Task) -> Self {
        ItemUpdate {
            content: Some(task.content.clone()),
            date_string: Some(task.date_string.clone()),
            priority: Some(task.priority),
            indent: Some(task.meta.indent()),
            item_order: Some(task.meta.item_order),
            collapsed: Some(task.meta.collapsed),
        }
    }
}

/// Partial edit of a project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub color: Option<usize>,
    pub indent: Option<i32>,
}

/// Remote endpoints the client uses.
///
/// Calls that return a record hand back the server's copy, which is what
/// the local collections store.
pub trait TodoApi {
    // -- projects --

    fn get_projects(&mut self) -> ApiResult<Vec<Project>>;

    fn add_project(&mut self, name: &str, color: usize, indent: i32, order: i32)
    -> ApiResult<Project>;

    fn update_project(&mut self, id: RecordId, update: &ProjectUpdate) -> ApiResult<Project>;

    /// Push the full project order as a list of ids.
    fn update_project_orders(&mut self, orders: &[RecordId]) -> ApiResult<()>;

    fn delete_project(&mut self, id: RecordId) -> ApiResult<()>;

    // -- items --

    fn get_uncompleted_items(&mut self, project_id: RecordId) -> ApiResult<Vec<Task>>;

    fn add_item(
        &mut self,
        project_id: RecordId,
        content: &str,
        date_string: Option<&str>,
        priority: Priority,
    ) -> ApiResult<Task>;

    fn update_item(&mut self, id: RecordId, update: &ItemUpdate) -> ApiResult<Task>;

    /// Push one project's task order as a list of ids.
    fn update_orders(&mut self, project_id: RecordId, orders: &[RecordId]) -> ApiResult<()>;

    /// Move recurring tasks on to their next date. Returns the updated tasks.
    fn update_recurring_date(&mut self, ids: &[RecordId]) -> ApiResult<Vec<Task>>;

    fn delete_items(&mut self, ids: &[RecordId]) -> ApiResult<()>;

    /// Complete tasks. `in_history` moves them to history instead of
    /// checking them off.
    fn complete_items(&mut self, ids: &[RecordId], in_history: bool) -> ApiResult<()>;

    fn uncomplete_items(&mut self, ids: &[RecordId]) -> ApiResult<()>;

    // -- queries --

    fn query(&mut self, queries: &[String]) -> ApiResult<Vec<QueryResult>>;
}
