//! Lenient deserializers for backend JSON.
//!
//! The backend stores several numeric fields as strings, sometimes returns
//! `null` where a value is expected, and may populate reference arrays with
//! whole documents instead of ids.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::resort::{GeoPoint, OpenTotal, RecordId};

/// Text field that tolerates numbers, booleans and `null`.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Unsigned count given as a number, a numeric string, or `null`.
pub fn count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    count_from_value(&Value::deserialize(deserializer)?).map_err(D::Error::custom)
}

/// Like [`count`] but with a zero default, for `{open, total}` halves.
pub fn count_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(count(deserializer)?.unwrap_or(0))
}

pub(super) fn count_from_value(value: &Value) -> Result<Option<u32>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return u32::try_from(v)
                    .map(Some)
                    .map_err(|_| format!("count out of range: {v}"));
            }
            match n.as_f64() {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                // Checked non-negative and in range just above.
                Some(f) if f >= 0.0 && f <= f64::from(u32::MAX) => Ok(Some(f.round() as u32)),
                _ => Err(format!("invalid count: {n}")),
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<u32>()
                .map(Some)
                .map_err(|_| format!("invalid count: {s:?}"))
        }
        other => Err(format!("invalid count: {other}")),
    }
}

/// Boolean that also accepts `"true"`/`"false"`, `0`/`1` and `null`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        Value::String(s) => match s.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            other => Err(D::Error::custom(format!("invalid flag: {other:?}"))),
        },
        other => Err(D::Error::custom(format!("invalid flag: {other}"))),
    }
}

/// `{open, total}` pair, `null` meaning zero/zero.
pub fn tally<'de, D>(deserializer: D) -> Result<OpenTotal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<OpenTotal>::deserialize(deserializer)?.unwrap_or_default())
}

/// Optional decimal given as number or numeric string.
pub fn amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid amount: {s:?}"))),
        other => Err(D::Error::custom(format!("invalid amount: {other}"))),
    }
}

/// Ski pass references: plain ids or populated `{_id, ...}` documents.
pub fn pass_refs<'de, D>(deserializer: D) -> Result<Vec<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => return Err(D::Error::custom(format!("invalid ski pass list: {other}"))),
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(id) => Ok(RecordId::from(id)),
            Value::Object(map) => match map.get("_id") {
                Some(Value::String(id)) => Ok(RecordId::from(id.as_str())),
                _ => Err(D::Error::custom("ski pass document without _id")),
            },
            other => Err(D::Error::custom(format!("invalid ski pass reference: {other}"))),
        })
        .collect()
}

/// GeoJSON point; anything malformed is treated as "no location".
pub fn location<'de, D>(deserializer: D) -> Result<Option<GeoPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| GeoPoint::from_geojson(&v)))
}

/// Opaque nested JSON, with `null` collapsed to `None`.
pub fn nested<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.filter(|v| !v.is_null()))
}
