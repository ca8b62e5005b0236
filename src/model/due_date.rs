use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Utc};
use serde::Serialize;

/// How close a due date is, used to pick a highlight for the label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Overdue,
    Today,
    Tomorrow,
    Soon,
    Later,
}

/// Days until due at which a date stops counting as "soon"
const SOON_MAX_DAYS: i64 = 7;

/// Short user-facing rendering of a due date relative to "now"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueLabel {
    pub text: String,
    pub urgency: Urgency,
}

impl DueLabel {
    /// Label `due` as seen from `now`. Both are wall-clock times in the
    /// user's timezone; only their calendar dates are compared.
    pub fn new(due: NaiveDateTime, has_time: bool, now: NaiveDateTime) -> Self {
        let days = (due.date() - now.date()).num_days();

        let (mut text, urgency) = if days <= -2 {
            (due.format("%b %-d").to_string(), Urgency::Overdue)
        } else if days == -1 {
            ("Yes".to_string(), Urgency::Overdue)
        } else if days == 0 {
            ("Tod".to_string(), Urgency::Today)
        } else if days == 1 {
            ("Tom".to_string(), Urgency::Tomorrow)
        } else if days < SOON_MAX_DAYS {
            (due.format("%a").to_string(), Urgency::Soon)
        } else if due.year() != now.year() {
            (due.format("%b %-d %Y").to_string(), Urgency::Later)
        } else {
            (due.format("%b %-d").to_string(), Urgency::Later)
        };

        if has_time {
            text.push_str(" @ ");
            text.push_str(&due.format("%-I%p").to_string());
        }

        DueLabel { text, urgency }
    }
}

/// Parse a due date in any of the shapes the service has used.
///
/// Returns `None` for anything unrecognised rather than failing the whole
/// record.
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%a %d %b %Y %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

/// Shift a UTC instant into the user's wall-clock time.
pub fn to_user_time(instant: DateTime<Utc>, tz_offset_hours: i32) -> NaiveDateTime {
    instant.naive_utc() + Duration::hours(tz_offset_hours as i64)
}
