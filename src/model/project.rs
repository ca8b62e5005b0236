use serde::{Deserialize, Serialize};

use super::color;
use super::record::{Record, RecordId, RecordMeta};
use super::wire;

/// A project: a named, colored container of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(flatten)]
    pub meta: RecordMeta,
    #[serde(default)]
    pub user_id: RecordId,
    #[serde(default = "default_name", deserialize_with = "wire::string_or_null")]
    pub name: String,
    /// `#RRGGBB` or a legacy palette index, kept as sent
    #[serde(default = "default_color", deserialize_with = "wire::string_or_number")]
    pub color: String,
    /// Locally maintained count of outstanding tasks
    #[serde(default)]
    pub cache_count: i64,
}

fn default_name() -> String {
    "Unknown".to_string()
}

fn default_color() -> String {
    color::DEFAULT_COLOR.to_string()
}

impl Project {
    pub fn new(meta: RecordMeta, name: impl Into<String>, color: impl Into<String>) -> Self {
        Project {
            meta,
            user_id: 0,
            name: name.into(),
            color: color.into(),
            cache_count: 0,
        }
    }

    /// Name without the leading `*` some accounts use to group projects
    pub fn display_name(&self) -> &str {
        match self.name.strip_prefix('*') {
            Some(rest) => rest.trim(),
            None => &self.name,
        }
    }

    pub fn color_index(&self) -> usize {
        color::resolve_index(&self.color)
    }

    pub fn color_hex(&self) -> String {
        color::resolve_hex(&self.color)
    }

    pub fn increment_cache_count(&mut self, n: usize) {
        self.cache_count = self.cache_count.saturating_add(n as i64);
    }

    /// Lower the outstanding-task count, never below zero.
    pub fn decrement_cache_count(&mut self, n: usize) {
        self.cache_count = (self.cache_count - n as i64).max(0);
    }
}

impl Record for Project {
    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn text(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_for_missing_fields() {
        let p: Project = serde_json::from_str(r#"{"id":3}"#).unwrap();
        assert_eq!(p.name, "Unknown");
        assert_eq!(p.color, "#BDE876");
        assert_eq!(p.cache_count, 0);
        assert_eq!(p.indent(), 1);
    }

    #[test]
    fn legacy_numeric_color() {
        let p: Project =
            serde_json::from_str(r#"{"id":3,"name":"Work","color":1,"indent":1}"#).unwrap();
        assert_eq!(p.color, "1");
        assert_eq!(p.color_index(), 1);
        assert_eq!(p.color_hex(), "#FF8581");
    }

    #[test]
    fn hex_color() {
        let p: Project =
            serde_json::from_str(r##"{"id":3,"name":"Work","color":"#ff8581"}"##).unwrap();
        assert_eq!(p.color_index(), 1);
        assert_eq!(p.color_hex(), "#ff8581");
    }

    #[test]
    fn display_name_strips_group_marker() {
        let p = Project::new(RecordMeta::new(1, false, 1, 1), "* Personal", "0");
        assert_eq!(p.display_name(), "Personal");
        assert_eq!(p.text(), "* Personal");
    }

    #[test]
    fn cache_count_floors_at_zero() {
        let mut p = Project::new(RecordMeta::new(1, false, 1, 1), "Work", "0");
        p.increment_cache_count(2);
        assert_eq!(p.cache_count, 2);
        p.decrement_cache_count(5);
        assert_eq!(p.cache_count, 0);
    }

    #[test]
    fn serializes_wire_shape() {
        let p = Project::new(RecordMeta::new(5, true, 2, 4), "Home", "#FFC472");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["id"], 5);
        assert_eq!(json["collapsed"], 1);
        assert_eq!(json["indent"], 2);
        assert_eq!(json["item_order"], 4);
        assert_eq!(json["name"], "Home");
        assert_eq!(json["color"], "#FFC472");
        assert_eq!(json["cache_count"], 0);
    }
}
