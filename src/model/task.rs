use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::due_date::{self, DueLabel};
use super::priority::Priority;
use super::record::{Record, RecordId, RecordMeta};
use super::wire;

/// Inline formatting tokens: `%(b)bold%`, `%(hl)highlight%`, ...
static FORMAT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\([a-zA-Z]+\)([^%]+)%").expect("valid regex"));

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(flatten)]
    pub meta: RecordMeta,
    #[serde(default)]
    pub user_id: RecordId,
    #[serde(default)]
    pub project_id: RecordId,
    /// Raw content, including any formatting tokens
    #[serde(default, deserialize_with = "wire::string_or_null")]
    pub content: String,
    /// Archived into the completed-items history
    #[serde(default, deserialize_with = "wire::flag", serialize_with = "wire::flag_out")]
    pub in_history: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "wire::flag", serialize_with = "wire::flag_out")]
    pub checked: bool,
    /// Free-form date text as the user typed it (`every monday`, `tom @ 3pm`)
    #[serde(default, deserialize_with = "wire::string_or_null")]
    pub date_string: String,
    /// Resolved due date as sent by the service
    #[serde(
        default,
        deserialize_with = "wire::non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<String>,
}

impl Task {
    pub fn new(meta: RecordMeta, project_id: RecordId, content: impl Into<String>) -> Self {
        Task {
            meta,
            user_id: 0,
            project_id,
            content: content.into(),
            in_history: false,
            priority: Priority::default(),
            checked: false,
            date_string: String::new(),
            due_date: None,
        }
    }

    /// Content with the "not a checkbox" marker and formatting stripped.
    pub fn content_for_display(&self) -> String {
        let mut text = self.content.trim();
        if let Some(rest) = text.strip_prefix('*') {
            text = rest.trim();
        }
        if text.contains("%(") {
            FORMAT_TOKEN.replace_all(text, "$1").trim().to_string()
        } else {
            text.to_string()
        }
    }

    /// Content starting with `*` is a heading, not a checkable item
    pub fn shows_checkbox(&self) -> bool {
        !self.content.starts_with('*')
    }

    pub fn is_recurring(&self) -> bool {
        self.date_string.starts_with("ev")
    }

    pub fn has_time_specified(&self) -> bool {
        self.date_string.contains('@') || self.date_string.contains(" at ")
    }

    pub fn has_due_date(&self) -> bool {
        self.due_date.is_some()
    }

    /// The due date as an instant.
    ///
    /// Dates without a time are pinned to the end of the day by the service
    /// and are taken as-is. Dates with a time get the user's offset applied.
    pub fn due_at(&self, tz_offset_hours: i32) -> Option<DateTime<Utc>> {
        let parsed = due_date::parse_due_date(self.due_date.as_deref()?)?;
        if self.has_time_specified() {
            Some(parsed + chrono::Duration::hours(tz_offset_hours as i64))
        } else {
            Some(parsed)
        }
    }

    /// Short label for the due date as seen at `now`, if there is one.
    pub fn due_label(&self, tz_offset_hours: i32, now: DateTime<Utc>) -> Option<DueLabel> {
        let due = self.due_at(tz_offset_hours)?;
        Some(DueLabel::new(
            due.naive_utc(),
            self.has_time_specified(),
            due_date::to_user_time(now, tz_offset_hours),
        ))
    }
}

impl Record for Task {
    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn text(&self) -> &str {
        &self.content
    }
}
