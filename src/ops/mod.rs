pub mod collection;
pub mod hierarchy;
pub mod project_ops;
pub mod queries;
pub mod sync;
pub mod task_ops;
