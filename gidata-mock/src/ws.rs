use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use gidata_core::GiDataError;
use gidata_core::socket::{WsConnector, WsSink, WsSource};

/// Server side of one mocked WebSocket connection.
pub struct MockWsPeer {
    /// URL the client connected to.
    pub url: String,
    /// Bearer the client presented.
    pub bearer: String,
    sent_rx: mpsc::UnboundedReceiver<String>,
    push_tx: Option<mpsc::UnboundedSender<Result<String, GiDataError>>>,
    closed: Arc<AtomicBool>,
}

impl MockWsPeer {
    /// Next text frame sent by the client, waiting up to one second.
    pub async fn next_sent(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(1), self.sent_rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Next text frame sent by the client, decoded as JSON.
    pub async fn next_sent_json(&mut self) -> Option<serde_json::Value> {
        let text = self.next_sent().await?;
        serde_json::from_str(&text).ok()
    }

    /// Deliver a text frame to the client.
    pub fn push(&self, text: impl Into<String>) {
        if let Some(tx) = &self.push_tx {
            let _ = tx.send(Ok(text.into()));
        }
    }

    /// Deliver a JSON frame to the client.
    pub fn push_json(&self, value: &serde_json::Value) {
        self.push(value.to_string());
    }

    /// Deliver a transport error to the client.
    pub fn push_error(&self, err: GiDataError) {
        if let Some(tx) = &self.push_tx {
            let _ = tx.send(Err(err));
        }
    }

    /// Drop the connection from the server side.
    pub fn drop_connection(&mut self) {
        self.push_tx.take();
    }

    /// True once the client sent a close frame or dropped its halves.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Wait until the client closes, up to `limit`.
    pub async fn wait_closed(&self, limit: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + limit;
        while tokio::time::Instant::now() < deadline {
            if self.is_closed() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.is_closed()
    }
}

struct MockSink {
    tx: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl WsSink for MockSink {
    async fn send_text(&mut self, text: String) -> Result<(), GiDataError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(GiDataError::StreamClosed("socket already closed".into()));
        }
        self.tx
            .send(text)
            .map_err(|_| GiDataError::StreamClosed("peer gone".into()))
    }

    async fn close(&mut self) -> Result<(), GiDataError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for MockSink {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

struct MockSource {
    rx: mpsc::UnboundedReceiver<Result<String, GiDataError>>,
}

#[async_trait]
impl WsSource for MockSource {
    async fn next_text(&mut self) -> Option<Result<String, GiDataError>> {
        self.rx.recv().await
    }
}

/// In-memory WebSocket connector; every `connect` yields a [`MockWsPeer`].
pub struct MockWs {
    peers_tx: mpsc::UnboundedSender<MockWsPeer>,
    peers_rx: Mutex<mpsc::UnboundedReceiver<MockWsPeer>>,
    connects: AtomicUsize,
    refuse: AtomicBool,
}

impl Default for MockWs {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWs {
    /// Connector that accepts every connection.
    #[must_use]
    pub fn new() -> Self {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        Self {
            peers_tx,
            peers_rx: Mutex::new(peers_rx),
            connects: AtomicUsize::new(0),
            refuse: AtomicBool::new(false),
        }
    }

    /// Make subsequent connects fail with a connection error.
    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Number of successful connects so far.
    #[must_use]
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Next accepted connection, waiting up to one second.
    pub async fn accept(&self) -> Option<MockWsPeer> {
        let mut rx = self.peers_rx.lock().await;
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .ok()
            .flatten()
    }
}

#[async_trait]
impl WsConnector for MockWs {
    async fn connect(
        &self,
        url: &str,
        bearer: &str,
    ) -> Result<(Box<dyn WsSink>, Box<dyn WsSource>), GiDataError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(GiDataError::connection(format!("refused: {url}")));
        }
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let (push_tx, push_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));
        let peer = MockWsPeer {
            url: url.to_string(),
            bearer: bearer.to_string(),
            sent_rx,
            push_tx: Some(push_tx),
            closed: Arc::clone(&closed),
        };
        let _ = self.peers_tx.send(peer);
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok((
            Box::new(MockSink {
                tx: sent_tx,
                closed,
            }),
            Box::new(MockSource { rx: push_rx }),
        ))
    }
}
