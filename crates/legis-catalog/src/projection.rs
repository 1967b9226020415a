//! Field access helpers for projecting raw records into suggestions.
//!
//! Projections perform no validation beyond what they need: an id field
//! must be present, display fields degrade to empty text.

use chrono::{Datelike, NaiveDate};
use serde_json::{Map, Value as JsonValue};

use legis_core::{Error, Result};

use crate::path::json_kind;

fn as_object<'a>(record: &'a JsonValue) -> Result<&'a Map<String, JsonValue>> {
    record.as_object().ok_or_else(|| {
        Error::Shape(format!(
            "expected object record, found {}",
            json_kind(record)
        ))
    })
}

/// Scalar id rendered as a string. Numbers keep their JSON decimal form.
pub fn id_field(record: &JsonValue, key: &str) -> Result<String> {
    match as_object(record)?.get(key) {
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(JsonValue::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(Error::Shape(format!(
            "id field `{}` is {}, expected string or number",
            key,
            json_kind(other)
        ))),
        None => Err(Error::Shape(format!("missing id field `{}`", key))),
    }
}

/// Display text of a field; missing or non-scalar values render empty.
pub fn text_field(record: &JsonValue, key: &str) -> String {
    match record.get(key) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(JsonValue::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Nested object member, required.
pub fn nested<'a>(record: &'a JsonValue, key: &str) -> Result<&'a JsonValue> {
    match as_object(record)?.get(key) {
        Some(value @ JsonValue::Object(_)) => Ok(value),
        Some(other) => Err(Error::Shape(format!(
            "field `{}` is {}, expected object",
            key,
            json_kind(other)
        ))),
        None => Err(Error::Shape(format!("missing object field `{}`", key))),
    }
}

/// Calendar date from the leading `YYYY-MM-DD` of a date or date-time field.
pub fn date_field(record: &JsonValue, key: &str) -> Result<NaiveDate> {
    let raw = record
        .get(key)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::Shape(format!("missing date field `{}`", key)))?;
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| Error::Shape(format!("field `{}` is not a date ({}): {}", key, raw, e)))
}

pub fn year_field(record: &JsonValue, key: &str) -> Result<i32> {
    date_field(record, key).map(|d| d.year())
}

/// Date formatted the pt-BR way (`dd/mm/yyyy`).
pub fn br_date_field(record: &JsonValue, key: &str) -> Result<String> {
    date_field(record, key).map(|d| d.format("%d/%m/%Y").to_string())
}
