use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of saved query the service understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Date,
    Overdue,
    Priority,
}

impl QueryType {
    /// Parse the wire `type` field
    pub fn parse_type(s: &str) -> Option<Self> {
        match s {
            "date" => Some(QueryType::Date),
            "overdue" => Some(QueryType::Overdue),
            "priority" => Some(QueryType::Priority),
            _ => None,
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryType::Date => write!(f, "date"),
            QueryType::Overdue => write!(f, "overdue"),
            QueryType::Priority => write!(f, "priority"),
        }
    }
}
