pub mod color;
pub mod config;
pub mod due_date;
pub mod priority;
pub mod project;
pub mod query;
pub mod record;
pub mod task;
pub(crate) mod wire;

pub use config::*;
pub use due_date::{DueLabel, Urgency};
pub use priority::Priority;
pub use project::*;
pub use query::*;
pub use record::*;
pub use task::*;
