//! gidata-core
//!
//! Core traits and utilities shared by the GI time-series drivers.
//!
//! - `driver`: the `DataDriver` trait and its role traits.
//! - `transport`: HTTP transport and credential interfaces.
//! - `socket`: duplex WebSocket interfaces.
//! - `consumer`: Kafka consumer interface.
//! - `window`: relative/absolute window resolution and request validation.
//! - `timeseries`: tabular frames, wire assembly, joins and downsampling.
//! - `stream`: stream handles and the uniform update stream.
//! - `import`: the create/upload/close import session protocol.
//!
//! Async runtime (Tokio)
//! ---------------------
//! Streaming APIs are coupled to Tokio: `stream::StreamHandle` wraps a
//! `tokio::task::JoinHandle<()>` and a `tokio::sync::oneshot::Sender<()>`, and
//! `stream::UpdateStream` is fed by a `tokio::sync::mpsc` channel.
#![warn(missing_docs)]

/// Injectable time source.
pub mod clock;
/// Kafka consumer interface.
pub mod consumer;
/// Role traits and the primary `DataDriver` interface.
pub mod driver;
/// Import session protocol shared by drivers that accept uploads.
pub mod import;
/// Duplex WebSocket interfaces.
pub mod socket;
/// Stream handles and update streams.
pub mod stream;
/// Frames, assembly from wire payloads, joins and downsampling.
pub mod timeseries;
/// HTTP transport and credential interfaces.
pub mod transport;
/// Window resolution and request validation.
pub mod window;

pub use clock::{Clock, SystemClock};
pub use driver::DataDriver;
pub use stream::{StreamHandle, UpdateStream};
pub use timeseries::{Column, TabularFrame};
pub use transport::{
    CredentialManager, HttpRequest, HttpResponse, HttpTransport, Method, StaticCredentials,
};
pub use window::{resolve_window, validate_points, validate_selectors, validate_window};

pub use gidata_types::*;
