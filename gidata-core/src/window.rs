use std::collections::{HashMap, HashSet};

use crate::clock::Clock;
use gidata_types::{GiDataError, TimeWindow, VariableSelector};

/// Largest accepted magnitude of a window bound, in milliseconds.
pub const MAX_ABS_MS: f64 = 1e15;

/// Resolve relative bounds against `now_ms` into an absolute `(from, to)` pair.
///
/// - `end == 0` is now, `end < 0` is `now + end`, `end > 0` is absolute.
/// - `start <= 0` is `to + start`, `start > 0` is absolute.
/// - If the result is empty or inverted, `from` is clamped to `to - 1`.
#[must_use]
pub fn resolve_window(start_ms: f64, end_ms: f64, now_ms: f64) -> (f64, f64) {
    let to = if end_ms <= 0.0 { now_ms + end_ms } else { end_ms };
    let mut from = if start_ms <= 0.0 {
        to + start_ms
    } else {
        start_ms
    };
    if from >= to {
        from = to - 1.0;
    }
    (from, to)
}

/// Reject non-finite or out-of-range window bounds.
///
/// # Errors
/// Returns `InvalidArg` when a bound is NaN, infinite or larger than [`MAX_ABS_MS`].
pub fn validate_window(window: &TimeWindow) -> Result<(), GiDataError> {
    for (label, v) in [("start", window.start_ms), ("end", window.end_ms)] {
        if !v.is_finite() || v.abs() > MAX_ABS_MS {
            return Err(GiDataError::invalid_arg(format!(
                "window {label} is out of range: {v}"
            )));
        }
    }
    Ok(())
}

/// Validate then resolve `window` using `clock`.
///
/// # Errors
/// Returns `InvalidArg` for malformed bounds.
pub fn resolve_with(window: &TimeWindow, clock: &dyn Clock) -> Result<(f64, f64), GiDataError> {
    validate_window(window)?;
    Ok(resolve_window(window.start_ms, window.end_ms, clock.now_ms()))
}

/// Reject empty selector lists and colliding selectors.
///
/// Frames key columns by variable id, so the same variable may not appear
/// twice, neither within one source nor across sources.
///
/// # Errors
/// Returns `InvalidArg` describing the first offending selector.
pub fn validate_selectors(selectors: &[VariableSelector]) -> Result<(), GiDataError> {
    if selectors.is_empty() {
        return Err(GiDataError::invalid_arg("selector list cannot be empty"));
    }
    let mut pairs = HashSet::with_capacity(selectors.len());
    let mut owners = HashMap::with_capacity(selectors.len());
    for s in selectors {
        if !pairs.insert((&s.source, s.variable)) {
            return Err(GiDataError::invalid_arg(format!(
                "duplicate selector: source {} variable {}",
                s.source, s.variable
            )));
        }
        if let Some(prev) = owners.insert(s.variable, &s.source) {
            return Err(GiDataError::invalid_arg(format!(
                "variable {} selected from both {prev} and {}",
                s.variable, s.source
            )));
        }
    }
    Ok(())
}

/// Reject a zero point budget.
///
/// # Errors
/// Returns `InvalidArg` when `points == 0`.
pub fn validate_points(points: u32) -> Result<(), GiDataError> {
    if points == 0 {
        return Err(GiDataError::invalid_arg("points must be greater than zero"));
    }
    Ok(())
}

/// Validate a complete fetch request and resolve its window.
///
/// # Errors
/// Propagates the first validation failure.
pub fn prepare_fetch(
    selectors: &[VariableSelector],
    window: &TimeWindow,
    points: u32,
    clock: &dyn Clock,
) -> Result<(f64, f64), GiDataError> {
    validate_selectors(selectors)?;
    validate_points(points)?;
    resolve_with(window, clock)
}
