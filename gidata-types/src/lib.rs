//! Shared data transfer objects, configuration and errors for GI time-series clients.
#![warn(missing_docs)]

/// Capability labels for dispatch and error reporting.
pub mod capability;
/// Client and driver configuration.
pub mod config;
/// The unified error type.
pub mod error;
pub mod selector;
pub mod settings;
pub mod structure;
mod update;
pub mod wire;

pub use capability::Capability;
pub use config::{CloudConfig, Environment, GiDataConfig, KafkaConfig, WebSocketConfig};
pub use error::{GiDataError, GraphQlError, UpstreamError};
pub use selector::{SelectionMode, SourceId, TimeWindow, VariableSelector};
pub use settings::{
    CsvImportSettings, CsvSettings, Domain, ExportFormat, ExportRequest, KafkaSubscription,
    LogSettings, OnlineFunction, OnlineSubscription,
};
pub use structure::{HistoryMeasurement, HistoryVariable, OnlineVariable, StreamSource, StreamVariable};
pub use update::VariableUpdate;
pub use wire::{DataRequest, DataResponse, TimeSeries, VarSelector};
