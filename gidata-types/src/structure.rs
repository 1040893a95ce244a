//! Structural metadata: sources, variables and measurements.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::selector::SourceId;

/// Descriptor of a buffer or history stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSource {
    /// Display name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Source id.
    #[serde(rename = "Id")]
    pub id: SourceId,
    /// Sample rate in Hz.
    #[serde(rename = "SampleRateHz", default)]
    pub sample_rate_hz: f64,
    /// Epoch ms of the oldest available sample.
    #[serde(rename = "AbsoluteStart", default)]
    pub first_ts: Option<f64>,
    /// Epoch ms of the newest available sample.
    #[serde(rename = "LastTimeStamp", default)]
    pub last_ts: Option<f64>,
    /// Position of the source on the device.
    #[serde(rename = "Index", default)]
    pub index: i64,
}

/// One variable of a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamVariable {
    /// Variable id.
    #[serde(rename = "Id")]
    pub id: String,
    /// Display name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Field alias on the GraphQL backend.
    #[serde(rename = "GQLId", default)]
    pub gql_id: Option<String>,
    /// Position within the stream.
    #[serde(rename = "Index", default)]
    pub index: i64,
    /// Physical unit.
    #[serde(rename = "Unit", default)]
    pub unit: String,
    /// Sample data type.
    #[serde(rename = "DataFormat", default)]
    pub data_type: String,
    /// Owning source; filled in by the client.
    #[serde(default = "unknown_sid")]
    pub sid: SourceId,
}

fn unknown_sid() -> SourceId {
    SourceId::Name(String::new())
}

/// A variable of the online (current value) surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineVariable {
    /// Variable id.
    #[serde(rename = "Id")]
    pub id: Uuid,
    /// Display name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Sample data type.
    #[serde(rename = "DataFormat", default)]
    pub data_type: String,
    /// Physical unit.
    #[serde(rename = "Unit", default)]
    pub unit: String,
    /// `I` (input) or `O` (output).
    #[serde(rename = "Direction", default)]
    pub direction: String,
    /// Overall position.
    #[serde(rename = "Index", default)]
    pub index: i64,
    /// Position among inputs.
    #[serde(rename = "IndexIn", default)]
    pub index_in: i64,
    /// Position among outputs.
    #[serde(rename = "IndexOut", default)]
    pub index_out: i64,
    /// Display precision.
    #[serde(rename = "Precision", default)]
    pub precision: i32,
    /// Lower range bound.
    #[serde(rename = "RangeMin", default)]
    pub range_min: Option<f64>,
    /// Upper range bound.
    #[serde(rename = "RangeMax", default)]
    pub range_max: Option<f64>,
}

impl OnlineVariable {
    /// True for variables that accept writes.
    #[must_use]
    pub fn is_output(&self) -> bool {
        self.direction.contains('O')
    }
}

/// A variable recorded in a history measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryVariable {
    /// Variable id.
    #[serde(rename = "Id")]
    pub id: String,
    /// Display name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Sample data type.
    #[serde(rename = "DataFormat", default)]
    pub data_format: String,
    /// `I` (input) or `O` (output).
    #[serde(rename = "Direction", default)]
    pub direction: String,
    /// Variable type.
    #[serde(rename = "Type", default)]
    pub kind: String,
    /// Overall position.
    #[serde(rename = "Index", default)]
    pub index: i64,
    /// Position among inputs.
    #[serde(rename = "IndexIn", default)]
    pub index_in: i64,
    /// Position among outputs.
    #[serde(rename = "IndexOut", default)]
    pub index_out: i64,
    /// Display precision.
    #[serde(rename = "Precision", default)]
    pub precision: i32,
    /// Upper range bound.
    #[serde(rename = "RangeMax", default)]
    pub range_max: Option<f64>,
    /// Lower range bound.
    #[serde(rename = "RangeMin", default)]
    pub range_min: Option<f64>,
    /// Physical unit.
    #[serde(rename = "Unit", default)]
    pub unit: String,
    /// Storage-internal id.
    #[serde(rename = "_id", default)]
    pub internal_id: Option<String>,
}

/// A recorded measurement of a history source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMeasurement {
    /// Measurement id.
    #[serde(rename = "Id")]
    pub id: SourceId,
    /// Display name.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Epoch ms of the first sample.
    #[serde(rename = "AbsoluteStart", default)]
    pub absolute_start: f64,
    /// Epoch ms of the last sample.
    #[serde(rename = "LastTimeStamp", default)]
    pub last_ts: f64,
    /// Recorded span in seconds.
    #[serde(rename = "AvailableTimeSec", default)]
    pub available_time_sec: f64,
    /// Configuration checksum at recording time.
    #[serde(rename = "CfgCheckSum", default)]
    pub cfg_checksum: String,
    /// Storage backend label.
    #[serde(rename = "DataStorage", default)]
    pub data_storage: String,
    /// Position within the source.
    #[serde(rename = "Index", default)]
    pub index: i64,
    /// Whether the measurement may be deleted.
    #[serde(rename = "IsRemovable", default)]
    pub is_removable: bool,
    /// Measurement kind.
    #[serde(rename = "Kind", default)]
    pub kind: String,
    /// Maximum span in seconds.
    #[serde(rename = "MaxTimeSec", default)]
    pub max_time_sec: f64,
    /// Sample rate in Hz.
    #[serde(rename = "SampleRateHz", default)]
    pub sample_rate_hz: f64,
    /// Owning source.
    #[serde(rename = "SourceId", default)]
    pub source_id: Option<SourceId>,
    /// Start date as formatted by the server.
    #[serde(rename = "StartDate", default)]
    pub start_date: String,
    /// Whether the measurement is still being written.
    #[serde(rename = "Updated", default)]
    pub updated: bool,
    /// Recorded variables.
    #[serde(rename = "Variables", default)]
    pub variables: Vec<HistoryVariable>,
    /// Storage-internal id.
    #[serde(rename = "_id", default)]
    pub internal_id: Option<String>,
}
