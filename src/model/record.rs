use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Debug;

use super::wire;

/// Identity assigned by the remote service
pub type RecordId = i64;

/// Lowest (top-level) indent
pub const INDENT_MIN: i32 = 1;

/// Fields shared by every ordered record (tasks and projects)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Stable identity within a collection
    #[serde(default)]
    pub id: RecordId,
    /// Display-only visibility flag for the record's children
    #[serde(default, deserialize_with = "wire::flag", serialize_with = "wire::flag_out")]
    pub collapsed: bool,
    /// Nesting level, 1 = top level. Always >= `INDENT_MIN`.
    #[serde(default = "default_indent", deserialize_with = "clamped_indent")]
    indent: i32,
    /// Position among the collection's records as last numbered
    #[serde(default)]
    pub item_order: i32,
}

fn default_indent() -> i32 {
    INDENT_MIN
}

fn clamped_indent<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i32>::deserialize(deserializer)?.unwrap_or(INDENT_MIN);
    Ok(raw.max(INDENT_MIN))
}

impl RecordMeta {
    pub fn new(id: RecordId, collapsed: bool, indent: i32, item_order: i32) -> Self {
        let mut meta = RecordMeta {
            id,
            collapsed,
            indent: INDENT_MIN,
            item_order,
        };
        meta.set_indent(indent);
        meta
    }

    pub fn indent(&self) -> i32 {
        self.indent
    }

    /// Set the indent, raising anything below `INDENT_MIN` to it.
    pub fn set_indent(&mut self, indent: i32) {
        self.indent = indent.max(INDENT_MIN);
    }

    pub fn increase_indent(&mut self) {
        self.set_indent(self.indent.saturating_add(1));
    }

    pub fn decrease_indent(&mut self) {
        self.set_indent(self.indent - 1);
    }

    /// True for anything nested below the top level
    pub fn has_indent(&self) -> bool {
        self.indent > INDENT_MIN
    }
}

/// A record that can live in an ordered collection.
///
/// Only the shared `RecordMeta` matters to ordering and hierarchy; the rest
/// of the record is payload.
pub trait Record: Clone + Debug {
    fn meta(&self) -> &RecordMeta;
    fn meta_mut(&mut self) -> &mut RecordMeta;

    /// Main user-facing text (task content, project name)
    fn text(&self) -> &str;

    fn id(&self) -> RecordId {
        self.meta().id
    }

    fn indent(&self) -> i32 {
        self.meta().indent()
    }

    fn item_order(&self) -> i32 {
        self.meta().item_order
    }

    fn is_collapsed(&self) -> bool {
        self.meta().collapsed
    }
}
