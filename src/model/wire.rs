//! Serde adapters for the loosely-typed fields the remote service emits.
//!
//! The service is not consistent about flags (`0`/`1` in some responses,
//! `true`/`false` in others) or about nulls, so every record field that has
//! been seen in both shapes goes through one of these.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serializer};
use std::fmt;

/// Accept `0`/`1`, `true`/`false`, `"0"`/`"1"` or null (false).
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a boolean or 0/1")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v == 1)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v == 1)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            Ok(matches!(v, "1" | "true"))
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }

        fn visit_none<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

/// Flags go back out as `0`/`1`, the shape the service documents.
pub fn flag_out<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

/// Null or missing strings become empty.
pub fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Null and empty strings both mean "absent".
pub fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

/// Accept either a string or a bare integer, keeping the text form.
///
/// Project colors arrive as `"#FF8581"` from newer responses and as `1` or
/// `"1"` (a palette index) from older ones.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string or an integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(TextVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Deserialize, Serialize)]
    struct Probe {
        #[serde(default, deserialize_with = "flag", serialize_with = "flag_out")]
        on: bool,
        #[serde(default, deserialize_with = "string_or_number")]
        color: String,
        #[serde(default, deserialize_with = "non_empty")]
        due: Option<String>,
    }

    #[test]
    fn flag_accepts_every_shape() {
        for (raw, expected) in [
            (r#"{"on":1}"#, true),
            (r#"{"on":0}"#, false),
            (r#"{"on":true}"#, true),
            (r#"{"on":false}"#, false),
            (r#"{"on":"1"}"#, true),
            (r#"{"on":null}"#, false),
            (r#"{}"#, false),
        ] {
            let probe: Probe = serde_json::from_str(raw).unwrap();
            assert_eq!(probe.on, expected, "input {}", raw);
        }
    }

    #[test]
    fn flag_serializes_as_integer() {
        let probe = Probe {
            on: true,
            color: String::new(),
            due: None,
        };
        let json = serde_json::to_value(&probe).unwrap();
        assert_eq!(json["on"], 1);
    }

    #[test]
    fn color_accepts_number_or_string() {
        let probe: Probe = serde_json::from_str(r#"{"color":3}"#).unwrap();
        assert_eq!(probe.color, "3");
        let probe: Probe = serde_json::from_str(r##"{"color":"#FF8581"}"##).unwrap();
        assert_eq!(probe.color, "#FF8581");
    }

    #[test]
    fn empty_due_is_absent() {
        let probe: Probe = serde_json::from_str(r#"{"due":""}"#).unwrap();
        assert!(probe.due.is_none());
        let probe: Probe = serde_json::from_str(r#"{"due":null}"#).unwrap();
        assert!(probe.due.is_none());
    }
}
