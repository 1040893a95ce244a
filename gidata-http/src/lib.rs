//! gidata-http
//!
//! The classic JSON REST surface of on-premise GI devices (GI.bench, Q.core,
//! Q.station) and the REST half of GI.cloud.
//!
//! - [`ReqwestTransport`]: the production [`gidata_core::HttpTransport`].
//! - [`HttpTimeSeriesDriver`]: one driver per domain (`buffer` or `history`)
//!   implementing the online, structure, fetch, export and import roles.
#![warn(missing_docs)]

mod driver;
mod envelope;
mod online;
/// reqwest-backed HTTP transport.
pub mod transport;

pub use driver::HttpTimeSeriesDriver;
pub use envelope::Envelope;
pub use online::{RestOnline, RestStructure};
pub use transport::ReqwestTransport;
