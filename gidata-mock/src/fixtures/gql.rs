use serde_json::{Value, json};
use uuid::Uuid;

/// `variableMapping` response: `(column field, variable id, name, unit)`.
#[must_use]
pub fn variable_mapping(sid: Uuid, name: &str, columns: &[(&str, Uuid, &str, &str)]) -> Value {
    let cols: Vec<Value> = columns
        .iter()
        .map(|(field, id, var_name, unit)| {
            json!({
                "name": field,
                "variables": [{ "id": id.to_string(), "name": var_name, "unit": unit }],
            })
        })
        .collect();
    json!({
        "data": {
            "variableMapping": {
                "sid": sid.to_string(),
                "name": name,
                "columns": cols,
            }
        }
    })
}

/// `Raw` response; each row is `[ts_ms, nanos, v0, v1, ...]`.
#[must_use]
pub fn raw_rows(rows: &[Vec<Option<f64>>]) -> Value {
    json!({ "data": { "Raw": { "data": rows } } })
}

/// Evenly spaced raw rows starting at `start_ms`, one value column per entry of `values`.
///
/// Sub-millisecond parts of a timestamp go into the `nanos` cell.
#[must_use]
pub fn raw_series(start_ms: f64, step_ms: f64, n: usize, values: &[f64]) -> Vec<Vec<Option<f64>>> {
    (0..n)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let ts = start_ms + step_ms * i as f64;
            let mut row = vec![Some(ts.trunc()), Some((ts.fract() * 1e6).round())];
            row.extend(values.iter().map(|v| Some(*v)));
            row
        })
        .collect()
}

/// `exportCSV` response.
#[must_use]
pub fn export_csv(csv: &str) -> Value {
    json!({ "data": { "exportCSV": { "file": csv } } })
}

/// Response carrying a GraphQL `errors` array.
#[must_use]
pub fn errors(messages: &[&str]) -> Value {
    let list: Vec<Value> = messages
        .iter()
        .map(|m| json!({ "message": m, "path": ["Raw"] }))
        .collect();
    json!({ "data": null, "errors": list })
}
