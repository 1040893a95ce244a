use async_trait::async_trait;

use gidata_types::GiDataError;

/// Write half of a text WebSocket.
#[async_trait]
pub trait WsSink: Send {
    /// Send one text frame.
    async fn send_text(&mut self, text: String) -> Result<(), GiDataError>;

    /// Send a close frame and flush.
    async fn close(&mut self) -> Result<(), GiDataError>;
}

/// Read half of a text WebSocket.
#[async_trait]
pub trait WsSource: Send {
    /// Next text frame; `None` once the connection is gone.
    async fn next_text(&mut self) -> Option<Result<String, GiDataError>>;
}

/// Opens duplex WebSocket connections.
#[async_trait]
pub trait WsConnector: Send + Sync {
    /// Connect to `url`, authenticating with `bearer`.
    async fn connect(
        &self,
        url: &str,
        bearer: &str,
    ) -> Result<(Box<dyn WsSink>, Box<dyn WsSource>), GiDataError>;
}

/// Derive the WebSocket URL of an HTTP base URL (`http` to `ws`, `https` to `wss`).
#[must_use]
pub fn ws_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let swapped = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    if path.is_empty() {
        swapped
    } else if path.starts_with('/') {
        format!("{swapped}{path}")
    } else {
        format!("{swapped}/{path}")
    }
}
