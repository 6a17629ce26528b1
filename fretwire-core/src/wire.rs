//! Defensive readers for untrusted JSON payload fields.
//!
//! The status endpoints answer with heterogeneous shapes, and a corrupt
//! payload must never crash the client: `null`, missing, or
//! wrongly-typed numeric fields read as 0, negative values clamp to 0,
//! unknown fields are ignored.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Coerce an optional JSON value into a non-negative integer.
pub(crate) fn coerce_u64(field: Option<&Value>) -> u64 {
    let Some(Value::Number(n)) = field else {
        return 0;
    };
    if let Some(v) = n.as_u64() {
        v
    } else if let Some(v) = n.as_i64() {
        v.max(0) as u64
    } else if let Some(v) = n.as_f64() {
        if v.is_finite() && v > 0.0 { v as u64 } else { 0 }
    } else {
        0
    }
}

pub(crate) fn u64_field(value: &Value, key: &str) -> u64 {
    coerce_u64(value.get(key))
}

pub(crate) fn f32_field(value: &Value, key: &str) -> Option<f32> {
    let n = value.get(key)?.as_f64()?;
    if !n.is_finite() {
        return None;
    }
    Some(n.max(0.0) as f32)
}

pub(crate) fn f64_field(value: &Value, key: &str) -> Option<f64> {
    let n = value.get(key)?.as_f64()?;
    if !n.is_finite() {
        return None;
    }
    Some(n.max(0.0))
}

pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

pub(crate) fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

pub(crate) fn datetime_field(
    value: &Value,
    key: &str,
) -> Option<DateTime<Utc>> {
    let raw = str_field(value, key)?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
