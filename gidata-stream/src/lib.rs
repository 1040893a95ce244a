//! gidata-stream
//!
//! Live update drivers. Both produce [`gidata_core::UpdateStream`]s carrying
//! [`gidata_core::VariableUpdate`]s filtered to the subscribed variables.
//!
//! - [`WebSocketDriver`]: one duplex connection per driver for online ticks
//!   and value writes.
//! - [`KafkaDriver`]: one consumer per subscription, built by a
//!   [`gidata_core::consumer::KafkaConsumerFactory`]. The rdkafka-backed
//!   factory is available with the `kafka` feature.
#![warn(missing_docs)]

mod kafka;
#[cfg(feature = "kafka")]
mod rdkafka_factory;
/// Tick payload parsing shared by both drivers.
pub mod tick;
mod tungstenite;
mod websocket;

pub use kafka::KafkaDriver;
#[cfg(feature = "kafka")]
pub use rdkafka_factory::RdKafkaFactory;
pub use tungstenite::TungsteniteConnector;
pub use websocket::WebSocketDriver;
