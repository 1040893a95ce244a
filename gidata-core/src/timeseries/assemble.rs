use chrono::{DateTime, Utc};

use super::frame::{Column, TabularFrame};
use gidata_types::{GiDataError, TimeSeries};

const NANOS_PER_MS: i64 = 1_000_000;

fn out_of_range(ms: f64) -> GiDataError {
    GiDataError::data(format!("timestamp {ms} ms is outside the representable range"))
}

/// Epoch nanoseconds for `ms`, or `None` when it does not fit an `i64`.
#[allow(clippy::cast_possible_truncation)]
fn ms_to_nanos(ms: f64) -> Option<i64> {
    if !ms.is_finite() {
        return None;
    }
    let whole = ms.trunc();
    let frac_ns = ((ms - whole) * 1e6).round() as i64;
    // `as` saturates, so the checked ops below catch anything past i64
    (whole as i64)
        .checked_mul(NANOS_PER_MS)?
        .checked_add(frac_ns)
}

/// `base_ns` shifted by a fractional nanosecond offset.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn shifted(base_ns: i64, offset_ns: f64) -> Option<i64> {
    let offset_ns = offset_ns.round();
    if !offset_ns.is_finite() || offset_ns.abs() >= i64::MAX as f64 {
        return None;
    }
    base_ns.checked_add(offset_ns as i64)
}

/// Convert fractional epoch milliseconds to a UTC timestamp with nanosecond resolution.
///
/// The integral and fractional parts are scaled separately to keep precision
/// for present-day epochs.
///
/// # Errors
/// Returns `Data` for non-finite input or instants beyond the nanosecond
/// range (about 1677 to 2262 CE).
pub fn ms_to_datetime(ms: f64) -> Result<DateTime<Utc>, GiDataError> {
    ms_to_nanos(ms)
        .map(DateTime::from_timestamp_nanos)
        .ok_or_else(|| out_of_range(ms))
}

/// Turn an equidistant series into a frame whose columns follow `order`.
///
/// Row `i` sits at `AbsoluteStart + i * Delta` milliseconds.
///
/// # Errors
/// Returns `Data` when the number of value lists differs from `order.len()`,
/// when the lists have unequal lengths, or when a row's instant is out of range.
#[allow(clippy::cast_precision_loss)]
pub fn assemble_equidistant(
    order: &[String],
    ts: &TimeSeries,
) -> Result<TabularFrame, GiDataError> {
    if ts.values.len() != order.len() {
        return Err(GiDataError::data(format!(
            "expected {} value lists, got {}",
            order.len(),
            ts.values.len()
        )));
    }
    let rows = ts.values.first().map_or(0, Vec::len);
    if let Some(pos) = ts.values.iter().position(|v| v.len() != rows) {
        return Err(GiDataError::data(format!(
            "value list {pos} has {} samples, expected {rows}",
            ts.values[pos].len()
        )));
    }

    let start = ms_to_nanos(ts.absolute_start).ok_or_else(|| out_of_range(ts.absolute_start))?;
    let index = (0..rows)
        .map(|i| {
            let offset_ms = i as f64 * ts.delta;
            shifted(start, offset_ms * 1e6)
                .map(DateTime::from_timestamp_nanos)
                .ok_or_else(|| out_of_range(ts.absolute_start + offset_ms))
        })
        .collect::<Result<_, _>>()?;
    let columns = order
        .iter()
        .zip(&ts.values)
        .map(|(name, values)| Column::new(name.clone(), values.clone()))
        .collect();
    TabularFrame::new(index, columns)
}

/// Turn raw `[ts_ms, nanos, v1, v2, ...]` rows into a chronologically sorted frame.
///
/// # Errors
/// Returns `Data` when a row has the wrong arity, lacks its timestamp, or
/// names an instant out of range.
pub fn assemble_raw(
    order: &[String],
    rows: &[Vec<Option<f64>>],
) -> Result<TabularFrame, GiDataError> {
    let width = order.len() + 2;
    let mut index = Vec::with_capacity(rows.len());
    let mut columns: Vec<Column> = order
        .iter()
        .map(|n| Column::new(n.clone(), Vec::with_capacity(rows.len())))
        .collect();

    for (r, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(GiDataError::data(format!(
                "raw row {r} has {} cells, expected {width}",
                row.len()
            )));
        }
        let ts_ms =
            row[0].ok_or_else(|| GiDataError::data(format!("raw row {r} lacks a timestamp")))?;
        let nanos = row[1].unwrap_or(0.0);
        let at = ms_to_nanos(ts_ms.trunc())
            .and_then(|base| shifted(base, nanos))
            .ok_or_else(|| out_of_range(ts_ms))?;
        index.push(DateTime::from_timestamp_nanos(at));
        for (col, cell) in columns.iter_mut().zip(&row[2..]) {
            col.values.push(*cell);
        }
    }
    Ok(TabularFrame::new(index, columns)?.sorted())
}
