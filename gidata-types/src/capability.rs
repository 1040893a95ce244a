use core::fmt;
use serde::{Deserialize, Serialize};

/// Capability labels used for dispatch, errors and telemetry.
///
/// Each label maps to one role a driver may or may not implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Capability {
    /// Read/write current values and list online variables.
    Online,
    /// Enumerate stream sources and their variables.
    Structure,
    /// Enumerate recorded measurements of a history source.
    Measurements,
    /// Windowed fetch from the rolling buffer.
    Buffer,
    /// Windowed fetch from persisted history.
    History,
    /// Bulk export (CSV / UDBF).
    Export,
    /// Bulk import (CSV / UDBF).
    Import,

    /// WebSocket tick subscription.
    StreamOnline,
    /// WebSocket value publishing.
    PublishOnline,
    /// Kafka consumer stream.
    StreamKafka,
}

impl Capability {
    /// Stable, kebab-case identifier for logs/errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Structure => "structure",
            Self::Measurements => "measurements",
            Self::Buffer => "buffer",
            Self::History => "history",
            Self::Export => "export",
            Self::Import => "import",
            Self::StreamOnline => "stream-online",
            Self::PublishOnline => "publish-online",
            Self::StreamKafka => "stream-kafka",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
