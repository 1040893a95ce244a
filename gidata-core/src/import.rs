use serde::Serialize;

use crate::transport::HttpTransport;
use gidata_types::{CsvImportSettings, GiDataError, LogSettings};

/// Base path of the import session endpoints.
pub const IMPORT_PATH: &str = "/history/data/import";

/// File type of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// Delimited text.
    Csv,
    /// Universal Data Bin File.
    Udbf,
}

impl ImportKind {
    /// Wire `Type` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Udbf => "udbf",
        }
    }

    /// Content type of the uploaded body.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Udbf => "application/octet-stream",
        }
    }
}

#[derive(Serialize)]
struct StartBody<'a> {
    #[serde(rename = "Type")]
    kind: &'a str,
    #[serde(rename = "Target")]
    target: &'a LogSettings,
    #[serde(rename = "CSVSettings", skip_serializing_if = "Option::is_none")]
    csv: Option<&'a CsvImportSettings>,
}

fn session_id(v: &serde_json::Value) -> Option<String> {
    let pick = |v: &serde_json::Value| {
        ["SessionID", "SessionId", "sessionId"]
            .iter()
            .find_map(|k| v.get(*k))
            .and_then(|id| match id {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    };
    pick(v).or_else(|| v.get("Data").and_then(pick))
}

/// Run one create → upload → close import session.
///
/// The session is closed whenever it was created, even if the upload fails.
///
/// Outcomes:
/// - upload and close succeed → `Ok(())`
/// - upload succeeds, close fails → `Session { session_id, message }`
/// - upload fails, close succeeds → the upload error
/// - both fail → `SessionCleanup { primary: upload, cleanup: close }`
///
/// # Errors
/// As listed above; a failed session start is returned as-is.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "gidata_core::import::run_import_session",
        skip(http, target, csv, bytes),
        fields(kind = kind.as_str(), size = bytes.len()),
    )
)]
pub async fn run_import_session(
    http: &dyn HttpTransport,
    kind: ImportKind,
    target: &LogSettings,
    csv: Option<&CsvImportSettings>,
    bytes: Vec<u8>,
) -> Result<(), GiDataError> {
    let start = StartBody {
        kind: kind.as_str(),
        target,
        csv,
    };
    let opened: serde_json::Value = http.post_json(IMPORT_PATH, &start).await?;
    let id = session_id(&opened)
        .ok_or_else(|| GiDataError::data("import start response lacks a session id"))?;
    let session_path = format!("{IMPORT_PATH}/{id}");

    #[cfg(feature = "tracing")]
    tracing::debug!(session = %id, "import session opened");

    let uploaded = http
        .post_bytes(&session_path, bytes, kind.content_type())
        .await
        .map(|_| ());
    let closed = http.delete(&session_path).await.map(|_| ());

    #[cfg(feature = "tracing")]
    tracing::debug!(
        session = %id,
        upload_ok = uploaded.is_ok(),
        close_ok = closed.is_ok(),
        "import session closed"
    );

    match (uploaded, closed) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close)) => Err(GiDataError::Session {
            session_id: id,
            message: close.to_string(),
        }),
        (Err(upload), Ok(())) => Err(upload),
        (Err(upload), Err(close)) => Err(GiDataError::SessionCleanup {
            primary: Box::new(upload),
            cleanup: Box::new(close),
        }),
    }
}
