use std::collections::BTreeMap;

use serde_json::{Map, Value};
use uuid::Uuid;

use gidata_core::GiDataError;

fn values_object(frame: &Value) -> Option<&Map<String, Value>> {
    frame
        .get("Values")
        .and_then(Value::as_object)
        .or_else(|| {
            frame
                .get("Data")
                .and_then(|d| d.get("Values"))
                .and_then(Value::as_object)
        })
        .or_else(|| frame.as_object())
}

/// A tick value: a number, `{"Value": n}`, or an array whose last number wins.
#[must_use]
pub fn scalar(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::Object(o) => o.get("Value").and_then(scalar),
        Value::Array(items) => items.iter().rev().find_map(scalar),
        _ => None,
    }
}

/// Values carried by one frame, keyed by variable id.
///
/// Accepts `{"Values": {...}}`, `{"Data": {"Values": {...}}}` or a bare
/// id-to-value object. Keys that are not UUIDs and values that are not numeric
/// are ignored. Returns `None` for frames without values (acks, echoes).
#[must_use]
pub fn parse_values(frame: &Value) -> Option<BTreeMap<Uuid, f64>> {
    let values: BTreeMap<Uuid, f64> = values_object(frame)?
        .iter()
        .filter_map(|(k, v)| Some((Uuid::parse_str(k).ok()?, scalar(v)?)))
        .collect();
    (!values.is_empty()).then_some(values)
}

/// Parse a text or binary payload.
///
/// # Errors
/// Returns `Data` when the payload is not JSON.
pub fn parse_payload(bytes: &[u8]) -> Result<Option<BTreeMap<Uuid, f64>>, GiDataError> {
    let frame: Value = serde_json::from_slice(bytes)
        .map_err(|e| GiDataError::data(format!("undecodable tick payload: {e}")))?;
    Ok(parse_values(&frame))
}
