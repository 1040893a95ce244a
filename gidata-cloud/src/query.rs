//! GraphQL documents are assembled as text. Every string argument goes
//! through [`quote`] so ids and aliases cannot break out of their literal.

use gidata_core::CsvSettings;

/// JSON string literal of `s`, which is also a valid GraphQL string literal.
#[must_use]
pub fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| String::from("\"\""))
}

#[allow(clippy::cast_possible_truncation)]
fn ms(v: f64) -> i64 {
    v.round() as i64
}

/// Structure query listing every column and variable of `sid`.
#[must_use]
pub fn variable_mapping(sid: &str) -> String {
    format!(
        "{{ variableMapping(sid: {}) {{ sid name columns {{ name variables {{ id name unit }} }} }} }}",
        quote(sid)
    )
}

/// Raw samples of `fields` of `sid` between `from_ms` and `to_ms`.
///
/// Rows come back as `[ts, nanos, fields...]`.
#[must_use]
pub fn raw(sid: &str, fields: &[String], from_ms: f64, to_ms: f64) -> String {
    let columns: Vec<String> = ["ts", "nanos"]
        .iter()
        .map(|c| quote(c))
        .chain(fields.iter().map(|f| quote(f)))
        .collect();
    format!(
        "{{ Raw(columns: [{}], sid: {}, from: {}, to: {}) {{ data }} }}",
        columns.join(", "),
        quote(sid),
        ms(from_ms),
        ms(to_ms)
    )
}

/// One `{name, alias}` entry of an `exportCSV` column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportColumn {
    /// GraphQL column name.
    pub name: String,
    /// Header written to the file.
    pub alias: String,
}

/// CSV export of `columns` of `sid`; the timestamp column is prepended.
#[must_use]
pub fn export_csv(
    sid: &str,
    columns: &[ExportColumn],
    from_ms: f64,
    to_ms: f64,
    csv: &CsvSettings,
) -> String {
    let specs: Vec<String> = std::iter::once(ExportColumn {
        name: "ts".to_string(),
        alias: csv.date_time_header.clone(),
    })
    .chain(columns.iter().cloned())
    .map(|c| format!("{{name: {}, alias: {}}}", quote(&c.name), quote(&c.alias)))
    .collect();
    format!(
        "{{ exportCSV(sid: {}, from: {}, to: {}, columns: [{}], separator: {}, decimalSeparator: {}, dateTimeFormat: {}) {{ file }} }}",
        quote(sid),
        ms(from_ms),
        ms(to_ms),
        specs.join(", "),
        quote(&csv.column_separator),
        quote(&csv.decimal_separator),
        quote(&csv.date_time_format)
    )
}

/// Column header used by the cloud CSV export.
#[must_use]
pub fn export_alias(name: &str, stream: &str, aggregation: &str, unit: &str) -> String {
    format!("{name}:{stream}:{aggregation} [{unit}]")
}
