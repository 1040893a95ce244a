//! gidata-cloud
//!
//! Driver for the hybrid GraphQL + REST surface of GI.cloud.
//!
//! Buffered data is fetched with one `Raw` GraphQL query per source. Variable
//! ids are translated to GraphQL column names through [`FieldCache`], which
//! is filled from `variableMapping` structure queries and shared by every
//! concurrent fetch on one driver. Online values, stream structure, UDBF
//! export and imports go through the REST half of the surface.
#![warn(missing_docs)]

/// Per-source variable-to-field cache.
pub mod cache;
mod driver;
/// GraphQL request plumbing.
pub mod gql;
/// Query text builders.
pub mod query;

pub use cache::{FieldCache, FieldInfo, SourceMapping};
pub use driver::CloudGqlDriver;
pub use gql::GqlClient;
