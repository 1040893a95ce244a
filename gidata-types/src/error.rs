use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A single entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQlError {
    /// Server-provided message.
    pub message: String,
    /// Response path segments the error refers to, rendered as strings.
    #[serde(default)]
    pub path: Vec<String>,
}

/// Failures reported by a backend or by the transport talking to it.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UpstreamError {
    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code (>= 400).
        status: u16,
        /// Response body as text, possibly empty.
        body: String,
    },

    /// The GraphQL endpoint returned a non-empty `errors` array.
    #[error("GraphQL errors: {}", join_messages(.0))]
    GraphQl(Vec<GraphQlError>),

    /// The connection could not be established or broke mid-request.
    #[error("connection failed: {0}")]
    Connection(String),
}

fn join_messages(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| {
            if e.path.is_empty() {
                e.message.clone()
            } else {
                format!("{} (at {})", e.message, e.path.join("."))
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Unified error type for the gidata workspace.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GiDataError {
    /// The selected driver does not implement the requested capability.
    #[error("not supported: {capability}")]
    NotSupported {
        /// Capability label (e.g. "history", "import").
        capability: String,
    },

    /// A variable id could not be mapped to a backend field, even after a refresh.
    #[error("variable {variable} not found in source {source_id}")]
    LookupFailure {
        /// Source the variable was requested from.
        source_id: String,
        /// Unresolved variable id.
        variable: Uuid,
    },

    /// Backend or transport failure, propagated unmodified.
    #[error("upstream failure: {0}")]
    Upstream(#[from] UpstreamError),

    /// An operation exceeded its deadline.
    #[error("timed out: {operation}")]
    Timeout {
        /// Operation label.
        operation: String,
    },

    /// The stream or request was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,

    /// A live stream ended because the remote side went away.
    #[error("stream closed: {0}")]
    StreamClosed(String),

    /// Closing an import session failed after a successful upload.
    #[error("import session {session_id} failed: {message}")]
    Session {
        /// Server-side session identifier.
        session_id: String,
        /// Description of the close failure.
        message: String,
    },

    /// Both the upload and the session close failed.
    #[error("{primary}; closing the import session also failed: {cleanup}")]
    SessionCleanup {
        /// The upload failure.
        primary: Box<GiDataError>,
        /// The close failure.
        cleanup: Box<GiDataError>,
    },

    /// Invalid input argument, detected before any network call.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Malformed or inconsistent payload.
    #[error("data issue: {0}")]
    Data(String),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl GiDataError {
    /// Helper: build a `NotSupported` error for a capability label.
    #[must_use]
    pub fn not_supported(capability: impl Into<String>) -> Self {
        Self::NotSupported {
            capability: capability.into(),
        }
    }

    /// Helper: build a `LookupFailure` for a source/variable pair.
    #[must_use]
    pub fn lookup(source_id: impl Into<String>, variable: Uuid) -> Self {
        Self::LookupFailure {
            source_id: source_id.into(),
            variable,
        }
    }

    /// Helper: build an `Upstream(Status)` error.
    #[must_use]
    pub fn upstream_status(status: u16, body: impl Into<String>) -> Self {
        Self::Upstream(UpstreamError::Status {
            status,
            body: body.into(),
        })
    }

    /// Helper: build an `Upstream(Connection)` error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Upstream(UpstreamError::Connection(msg.into()))
    }

    /// Helper: build a `Timeout` error.
    #[must_use]
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Helper: build a `Data` error.
    #[must_use]
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Helper: build an `InvalidArg` error.
    #[must_use]
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Self::InvalidArg(msg.into())
    }

    /// Returns true for conditions that end a live update stream for good.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::StreamClosed(_))
    }

    /// Returns true when the error was produced locally, before any I/O.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidArg(_) | Self::NotSupported { .. } | Self::LookupFailure { .. }
        )
    }
}

impl From<serde_json::Error> for GiDataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Data(err.to_string())
    }
}
