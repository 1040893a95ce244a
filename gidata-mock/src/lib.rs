//! Scripted in-memory transports, connectors and fixtures for exercising
//! GI time-series drivers without a backend.
#![warn(missing_docs)]

mod clock;
pub mod fixtures;
mod http;
mod kafka;
mod ws;

pub use clock::FixedClock;
pub use http::MockHttp;
pub use kafka::MockKafka;
pub use ws::{MockWs, MockWsPeer};
