use serde_json::{Value, json};
use uuid::Uuid;

/// `POST /{domain}/data` response with one equidistant series.
#[must_use]
pub fn data_response(absolute_start: f64, delta: f64, values: &[Vec<Option<f64>>]) -> Value {
    let size = values.first().map_or(0, Vec::len);
    json!({
        "Success": true,
        "Data": {
            "TimeSeries": {
                "Type": "equidistant",
                "Format": "json",
                "Unit": "ms",
                "Start": 0,
                "AbsoluteStart": absolute_start,
                "Delta": delta,
                "End": 0,
                "Size": size,
                "Values": values,
            }
        }
    })
}

/// `n` samples of `value` for a single variable.
#[must_use]
pub fn constant(n: usize, value: f64) -> Vec<Option<f64>> {
    vec![Some(value); n]
}

/// `GET /{domain}/structure/sources` response.
#[must_use]
pub fn sources(items: &[(Uuid, &str)]) -> Value {
    let list: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(i, (id, name))| {
            json!({
                "Name": name,
                "Id": id.to_string(),
                "SampleRateHz": 100.0,
                "AbsoluteStart": 1_600_000_000_000.0,
                "LastTimeStamp": 1_650_000_000_000.0,
                "Index": i,
            })
        })
        .collect();
    json!({ "Success": true, "Data": list })
}

/// `GET /{domain}/structure/sources/{sid}/variables` response.
#[must_use]
pub fn stream_variables(items: &[(Uuid, &str, &str)]) -> Value {
    let list: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(i, (id, name, unit))| {
            json!({
                "Id": id.to_string(),
                "Name": name,
                "GQLId": format!("v{i}"),
                "Index": i,
                "Unit": unit,
                "DataFormat": "Float",
            })
        })
        .collect();
    json!({ "Success": true, "Data": list })
}

/// `GET /online/structure/variables` response.
#[must_use]
pub fn online_variables(items: &[(Uuid, &str, &str)]) -> Value {
    let list: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(i, (id, name, direction))| {
            json!({
                "Id": id.to_string(),
                "Name": name,
                "DataFormat": "Float",
                "Unit": "V",
                "Direction": direction,
                "Index": i,
                "Precision": 3,
            })
        })
        .collect();
    json!({ "Success": true, "Data": list })
}

/// `POST /online/data` read response; `values` are in request order.
#[must_use]
pub fn online_values(values: &[f64]) -> Value {
    let cols: Vec<Vec<f64>> = values.iter().map(|v| vec![*v]).collect();
    json!({
        "Success": true,
        "Data": { "Type": "online", "Values": cols }
    })
}

/// `GET /history/structure/sources/{sid}/measurements` response.
#[must_use]
pub fn measurements(ids: &[Uuid]) -> Value {
    let list: Vec<Value> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            json!({
                "Id": id.to_string(),
                "Name": format!("measurement {i}"),
                "AbsoluteStart": 1_600_000_000_000.0,
                "LastTimeStamp": 1_600_000_060_000.0,
                "Index": i,
                "SampleRateHz": 100.0,
            })
        })
        .collect();
    json!({ "Success": true, "Data": list })
}

/// Import session start response.
#[must_use]
pub fn import_started(session_id: &str) -> Value {
    json!({ "Success": true, "Data": { "SessionID": session_id } })
}
