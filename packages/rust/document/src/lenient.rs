//! Tolerant deserializers for hand-edited scalar fields.
//!
//! The content document is edited by hand as often as by the editor, so a
//! field holding `1` instead of `true`, or `null` instead of a list, is read
//! as its obvious meaning rather than rejecting the whole document. Only
//! values with no sensible reading (an object where text is expected) still
//! fail.

use serde::de::{self, Deserialize, Deserializer, Unexpected};
use serde_json::Value;

use crate::model::split_list;

/// Text of a scalar value. `null` reads as `""`.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

/// `null` as the type's default, anything else as usual.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any scalar as text; `null` as `""`.
pub(crate) fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    scalar_text(&value).ok_or_else(|| de::Error::invalid_type(unexpected(&value), &"text"))
}

/// Any scalar as text; `null` as unset.
pub(crate) fn opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => scalar_text(&value)
            .map(Some)
            .ok_or_else(|| de::Error::invalid_type(unexpected(&value), &"text")),
    }
}

/// Booleans, `0`/`1` style numbers and `"true"`/`"false"` style strings.
pub(crate) fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Null => Some(false),
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" | "" => Some(false),
            _ => None,
        },
        Value::Array(_) | Value::Object(_) => None,
    };
    parsed.ok_or_else(|| de::Error::invalid_type(unexpected(&value), &"a boolean"))
}

/// A list of text. `null` is empty, a bare string is split on commas,
/// `null` items are dropped and other scalars become text.
pub(crate) fn string_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(split_list(s)),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| {
                scalar_text(item)
                    .ok_or_else(|| de::Error::invalid_type(unexpected(item), &"text"))
            })
            .collect(),
        Value::Bool(_) | Value::Number(_) => Ok(scalar_text(&value).into_iter().collect()),
        Value::Object(_) => Err(de::Error::invalid_type(unexpected(&value), &"a list")),
    }
}

/// A positive count. Anything that is not a non-negative integer reads as
/// unset.
pub(crate) fn opt_count<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let count = match &value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    if count.is_none() && !value.is_null() {
        tracing::debug!(%value, "ignoring non-integer count");
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sample {
        #[serde(deserialize_with = "string")]
        text: String,
        #[serde(deserialize_with = "opt_string")]
        option: Option<String>,
        #[serde(deserialize_with = "flag")]
        flag: bool,
        #[serde(deserialize_with = "string_list")]
        list: Vec<String>,
        #[serde(deserialize_with = "opt_count")]
        count: Option<u32>,
    }

    fn sample(value: serde_json::Value) -> Sample {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn scalars_read_as_text() {
        let s = sample(json!({"text": 2024, "option": false}));
        assert_eq!(s.text, "2024");
        assert_eq!(s.option.as_deref(), Some("false"));

        let s = sample(json!({"text": null, "option": null}));
        assert_eq!(s.text, "");
        assert_eq!(s.option, None);
    }

    #[test]
    fn flags_accept_numbers_and_words() {
        assert!(sample(json!({"flag": 1})).flag);
        assert!(sample(json!({"flag": "True"})).flag);
        assert!(!sample(json!({"flag": 0})).flag);
        assert!(!sample(json!({"flag": "false"})).flag);
        assert!(!sample(json!({"flag": null})).flag);
        assert!(serde_json::from_value::<Sample>(json!({"flag": "maybe"})).is_err());
    }

    #[test]
    fn lists_tolerate_null_and_bare_strings() {
        assert!(sample(json!({"list": null})).list.is_empty());
        assert_eq!(sample(json!({"list": "rust, cli"})).list, ["rust", "cli"]);
        assert_eq!(sample(json!({"list": ["a", null, 3]})).list, ["a", "3"]);
    }

    #[test]
    fn counts_ignore_anything_but_non_negative_integers() {
        assert_eq!(sample(json!({"count": 12})).count, Some(12));
        assert_eq!(sample(json!({"count": "8"})).count, Some(8));
        assert_eq!(sample(json!({"count": -3})).count, None);
        assert_eq!(sample(json!({"count": 2.5})).count, None);
        assert_eq!(sample(json!({"count": "ten"})).count, None);
    }

    #[test]
    fn structured_values_in_text_fields_still_fail() {
        assert!(serde_json::from_value::<Sample>(json!({"text": {"en": "x"}})).is_err());
        assert!(serde_json::from_value::<Sample>(json!({"list": {"a": 1}})).is_err());
    }
}
