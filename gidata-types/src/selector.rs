//! Variable selectors and time windows.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a data source (stream, controller, measurement).
///
/// Backends use UUIDs, integers or plain strings interchangeably.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceId {
    /// UUID identifier.
    Uuid(Uuid),
    /// Integer identifier.
    Int(i64),
    /// Any other textual identifier.
    Name(String),
}

impl SourceId {
    /// Parse a textual id, preferring the UUID form when it is well-formed.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Uuid::parse_str(raw).map_or_else(|_| Self::Name(raw.to_string()), Self::Uuid)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(u) => write!(f, "{}", u.hyphenated()),
            Self::Int(i) => write!(f, "{i}"),
            Self::Name(s) => f.write_str(s),
        }
    }
}

impl From<Uuid> for SourceId {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<i64> for SourceId {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Which data a selector addresses within its source.
///
/// Serialized as the wire `Selector` string: `"latest"` or a measurement id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SelectionMode {
    /// The live buffer / most recent measurement.
    #[default]
    Latest,
    /// A specific recorded measurement.
    Measurement(String),
}

impl From<String> for SelectionMode {
    fn from(s: String) -> Self {
        if s.eq_ignore_ascii_case("latest") {
            Self::Latest
        } else {
            Self::Measurement(s)
        }
    }
}

impl From<SelectionMode> for String {
    fn from(m: SelectionMode) -> Self {
        match m {
            SelectionMode::Latest => "latest".to_string(),
            SelectionMode::Measurement(id) => id,
        }
    }
}

/// Identifies one variable of one source for a windowed fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableSelector {
    /// Source the variable belongs to.
    pub source: SourceId,
    /// Variable id.
    pub variable: Uuid,
    /// Buffer or measurement selection.
    pub mode: SelectionMode,
}

impl VariableSelector {
    /// Select `variable` of `source` from the live buffer.
    pub fn new(source: impl Into<SourceId>, variable: Uuid) -> Self {
        Self {
            source: source.into(),
            variable,
            mode: SelectionMode::Latest,
        }
    }

    /// Select from a specific measurement instead of the live buffer.
    #[must_use]
    pub fn in_measurement(mut self, measurement: impl Into<String>) -> Self {
        self.mode = SelectionMode::Measurement(measurement.into());
        self
    }

    /// Column key of this selector in an assembled frame.
    #[must_use]
    pub fn column_key(&self) -> String {
        self.variable.hyphenated().to_string()
    }
}

/// A time window in epoch milliseconds, possibly relative to "now".
///
/// - `end_ms <= 0` means `now + end_ms` (`0` is "now").
/// - `start_ms <= 0` means `resolved_end + start_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start bound in ms (absolute if positive, offset otherwise).
    pub start_ms: f64,
    /// End bound in ms (absolute if positive, offset from now otherwise).
    pub end_ms: f64,
}

impl TimeWindow {
    /// Construct a window from raw bounds.
    #[must_use]
    pub const fn new(start_ms: f64, end_ms: f64) -> Self {
        Self { start_ms, end_ms }
    }

    /// The last `ms` milliseconds up to now.
    #[must_use]
    pub fn last(ms: f64) -> Self {
        Self::new(-ms.abs(), 0.0)
    }

    /// Absolute window `[from_ms, to_ms)`.
    #[must_use]
    pub const fn absolute(from_ms: f64, to_ms: f64) -> Self {
        Self::new(from_ms, to_ms)
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::new(-20_000.0, 0.0)
    }
}
