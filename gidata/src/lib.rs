//! gidata gives one client over the data surfaces of Gantner Instruments
//! backends: on-premise devices (GI.bench, Q.core, Q.station) speaking JSON
//! REST, and GI.cloud with its GraphQL buffer API.
//!
//! Overview
//! - Picks the buffer-domain driver from the environment: GraphQL for
//!   `Cloud`, REST for `Local`. History is always served over REST.
//! - Exposes every role through one [`GiData`] value; a role the active
//!   backend lacks fails with `NotSupported` instead of being skipped.
//! - Creates the WebSocket and Kafka drivers on first streaming call and
//!   reuses them for the life of the client.
//! - Offers [`sync::BlockingGiData`] for synchronous callers.
//!
//! Fetching a buffer window:
//! ```rust,ignore
//! use gidata::{GiData, TimeWindow, VariableSelector};
//!
//! let gi = GiData::builder()
//!     .base_url("http://10.1.50.36:8090")
//!     .build()?;
//! let frame = gi
//!     .fetch_buffer(&[VariableSelector::new(sid, vid)], TimeWindow::last(10_000.0), 2048)
//!     .await?;
//! ```
//!
//! Live ticks:
//! ```rust,ignore
//! let mut ticks = gi.stream_online(&[vid], Default::default()).await?;
//! while let Ok(update) = ticks.recv().await {
//!     println!("{:?}", update.values);
//! }
//! ticks.cancel().await;
//! ```
//!
//! See `gidata/examples/` for runnable programs.
#![warn(missing_docs)]

pub(crate) mod core;
mod router;
pub mod sync;

pub use core::{GiData, GiDataBuilder};

pub use gidata_cloud::{CloudGqlDriver, FieldCache};
pub use gidata_http::{HttpTimeSeriesDriver, ReqwestTransport};
pub use gidata_stream::{KafkaDriver, TungsteniteConnector, WebSocketDriver};

// Re-export core types for convenience
pub use gidata_core::{
    Capability, Clock, CloudConfig, Column, CredentialManager, CsvImportSettings, CsvSettings,
    DataDriver, Domain, Environment, ExportFormat, ExportRequest, GiDataConfig, GiDataError,
    GraphQlError, HistoryMeasurement, HistoryVariable, HttpTransport, KafkaConfig,
    KafkaSubscription, LogSettings, OnlineFunction, OnlineSubscription, OnlineVariable,
    SelectionMode, SourceId, StaticCredentials, StreamHandle, StreamSource, StreamVariable,
    SystemClock, TabularFrame, TimeWindow, UpdateStream, UpstreamError, VariableSelector,
    VariableUpdate, WebSocketConfig,
};

#[cfg(feature = "dataframe")]
pub use gidata_core::timeseries::dataframe::ToDataFrame;
