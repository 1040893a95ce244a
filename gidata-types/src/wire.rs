//! JSON bodies exchanged with the time-series REST surface.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GiDataError;
use crate::selector::{SelectionMode, SourceId, VariableSelector};
use crate::settings::CsvSettings;

/// One entry of the `Variables` array of a data request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarSelector {
    /// Source id.
    #[serde(rename = "SID")]
    pub sid: SourceId,
    /// Variable id.
    #[serde(rename = "VID")]
    pub vid: Uuid,
    /// `"latest"` or a measurement id.
    #[serde(rename = "Selector", default)]
    pub selector: SelectionMode,
}

impl From<&VariableSelector> for VarSelector {
    fn from(s: &VariableSelector) -> Self {
        Self {
            sid: s.source.clone(),
            vid: s.variable,
            selector: s.mode.clone(),
        }
    }
}

/// Body of `POST /{buffer|history}/data`.
///
/// `start`/`end` are absolute epoch milliseconds after window resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataRequest {
    /// Window start (ms).
    pub start: f64,
    /// Window end (ms).
    pub end: f64,
    /// Requested variables, in column order.
    pub variables: Vec<VarSelector>,
    /// Point budget.
    pub points: u32,
    /// Sampling type, always `equidistant`.
    #[serde(rename = "Type")]
    pub kind: String,
    /// `json`, `csv` or `udbf`.
    pub format: String,
    /// Decimal precision, `-1` for server default.
    pub precision: i32,
    /// Time zone used for formatted exports.
    pub time_zone: String,
    /// Offset applied to formatted timestamps.
    pub time_offset: i64,
    /// History only: ask the server to include the variable mapping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_var_mapping: Option<bool>,
    /// CSV layout for CSV exports.
    #[serde(rename = "CSVSettings", skip_serializing_if = "Option::is_none")]
    pub csv_settings: Option<CsvSettings>,
}

impl DataRequest {
    /// JSON data request for an already resolved window.
    #[must_use]
    pub fn new(from_ms: f64, to_ms: f64, selectors: &[VariableSelector], points: u32) -> Self {
        Self {
            start: from_ms,
            end: to_ms,
            variables: selectors.iter().map(VarSelector::from).collect(),
            points,
            kind: "equidistant".to_string(),
            format: "json".to_string(),
            precision: -1,
            time_zone: "UTC".to_string(),
            time_offset: 0,
            add_var_mapping: None,
            csv_settings: None,
        }
    }

    /// Set the `AddVarMapping` flag.
    #[must_use]
    pub const fn with_var_mapping(mut self) -> Self {
        self.add_var_mapping = Some(true);
        self
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = format.to_string();
        self
    }

    /// Attach a CSV layout.
    #[must_use]
    pub fn with_csv(mut self, csv: CsvSettings) -> Self {
        self.csv_settings = Some(csv);
        self
    }
}

/// Equidistant series as returned by the data endpoints.
///
/// Each inner `values` list holds one variable; all have equal length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeSeries {
    /// Sampling type.
    #[serde(rename = "Type", default)]
    pub kind: String,
    /// Payload format.
    #[serde(default)]
    pub format: String,
    /// Time unit of the bounds.
    #[serde(default)]
    pub unit: String,
    /// Relative start.
    #[serde(default)]
    pub start: f64,
    /// Epoch ms of the first sample.
    pub absolute_start: f64,
    /// Sample spacing in ms.
    pub delta: f64,
    /// Relative end.
    #[serde(default)]
    pub end: f64,
    /// Samples per variable.
    #[serde(default)]
    pub size: u64,
    /// Measurement the samples belong to.
    #[serde(default)]
    pub measurement_id: Option<SourceId>,
    /// Whether the measurement is still being written.
    #[serde(default)]
    pub updating: Option<bool>,
    /// One list of samples per variable, `null` for gaps.
    pub values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SeriesItem {
    #[serde(rename = "TimeSeries")]
    time_series: TimeSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum SeriesData {
    One(SeriesItem),
    Many(Vec<SeriesItem>),
}

/// Envelope of a successful data response; `Data` may be one item or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataResponse {
    /// Server success flag.
    #[serde(rename = "Success", default)]
    pub success: bool,
    #[serde(rename = "Data")]
    data: SeriesData,
}

impl DataResponse {
    /// All returned series, in server order.
    #[must_use]
    pub fn timeseries_list(&self) -> Vec<&TimeSeries> {
        match &self.data {
            SeriesData::One(item) => vec![&item.time_series],
            SeriesData::Many(items) => items.iter().map(|i| &i.time_series).collect(),
        }
    }

    /// Consume the envelope and return the first series.
    ///
    /// # Errors
    /// Returns `Data` if the response carries no series at all.
    pub fn into_first(self) -> Result<TimeSeries, GiDataError> {
        match self.data {
            SeriesData::One(item) => Ok(item.time_series),
            SeriesData::Many(items) => items
                .into_iter()
                .next()
                .map(|i| i.time_series)
                .ok_or_else(|| GiDataError::data("response contains no time series")),
        }
    }
}
