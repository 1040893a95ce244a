use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;
use uuid::Uuid;

use gidata_core::driver::UpdateSource;
use gidata_core::socket::{WsConnector, WsSink, WsSource, ws_url};
use gidata_core::{
    CredentialManager, GiDataError, OnlineFunction, OnlineSubscription, StreamHandle,
    UpdateStream, VariableUpdate, WebSocketConfig,
};

use crate::tick;

type UpdateTx = mpsc::Sender<Result<VariableUpdate, GiDataError>>;

enum Outbound {
    Text(String),
    Close,
}

struct Subscriber {
    wanted: Vec<Uuid>,
    tx: UpdateTx,
}

/// State shared by the reader, the writer and every subscription of one connection.
struct Session {
    outbound: mpsc::UnboundedSender<Outbound>,
    subscribers: Mutex<HashMap<u64, Subscriber>>,
    next_id: AtomicU64,
    alive: AtomicBool,
    reader: Mutex<Option<AbortHandle>>,
}

impl Session {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn send(&self, text: String) -> Result<(), GiDataError> {
        if !self.is_alive() {
            return Err(GiDataError::StreamClosed("websocket session closed".into()));
        }
        self.outbound
            .send(Outbound::Text(text))
            .map_err(|_| GiDataError::StreamClosed("websocket writer stopped".into()))
    }

    fn register(&self, wanted: Vec<Uuid>, tx: UpdateTx) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Subscriber { wanted, tx });
        id
    }

    /// Drop subscription `id`; the last one out shuts the connection down.
    fn release(&self, id: u64) {
        let empty = {
            let mut subs = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
            subs.remove(&id);
            subs.is_empty()
        };
        if empty {
            self.shutdown();
        }
    }

    fn shutdown(&self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "gidata_stream::websocket", "closing websocket session");
        }
        let _ = self.outbound.send(Outbound::Close);
        if let Some(reader) = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            reader.abort();
        }
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    async fn dispatch(&self, values: &BTreeMap<Uuid, f64>) {
        let targets: Vec<(UpdateTx, VariableUpdate)> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter_map(|s| {
                let update = VariableUpdate::new(values.clone()).retain_only(&s.wanted);
                (!update.is_empty()).then(|| (s.tx.clone(), update))
            })
            .collect();
        for (tx, update) in targets {
            let _ = tx.send(Ok(update)).await;
        }
    }

    async fn broadcast(&self, err: &GiDataError) {
        let targets: Vec<UpdateTx> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|s| s.tx.clone())
            .collect();
        for tx in targets {
            let _ = tx.send(Err(err.clone())).await;
        }
    }
}

/// Releases its subscription when the owning stream task ends or is aborted.
struct Subscription {
    session: Arc<Session>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.session.release(self.id);
    }
}

async fn read_loop(mut source: Box<dyn WsSource>, session: Arc<Session>) {
    let reason = loop {
        match source.next_text().await {
            Some(Ok(text)) => match tick::parse_payload(text.as_bytes()) {
                Ok(Some(values)) => session.dispatch(&values).await,
                Ok(None) => {}
                Err(e) => session.broadcast(&e).await,
            },
            Some(Err(e)) => break e.to_string(),
            None => break "websocket connection closed by peer".to_string(),
        }
    };
    #[cfg(feature = "tracing")]
    tracing::debug!(target: "gidata_stream::websocket", %reason, "websocket reader finished");
    session
        .broadcast(&GiDataError::StreamClosed(reason))
        .await;
    session.shutdown();
}

async fn write_loop(
    mut sink: Box<dyn WsSink>,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    mut stop_rx: oneshot::Receiver<()>,
    session: Arc<Session>,
) {
    loop {
        let next = tokio::select! {
            _ = &mut stop_rx => None,
            msg = rx.recv() => msg,
        };
        let Some(Outbound::Text(text)) = next else {
            break;
        };
        if let Err(_e) = sink.send_text(text).await {
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "gidata_stream::websocket", error = %_e, "websocket send failed");
            break;
        }
    }
    session.alive.store(false, Ordering::SeqCst);
    let _ = sink.close().await;
}

struct Connection {
    session: Arc<Session>,
    writer: StreamHandle,
    _reader: StreamHandle,
}

impl Connection {
    fn spawn(sink: Box<dyn WsSink>, source: Box<dyn WsSource>) -> Self {
        let (outbound, rx) = mpsc::unbounded_channel();
        let session = Arc::new(Session {
            outbound,
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            alive: AtomicBool::new(true),
            reader: Mutex::new(None),
        });

        let (stop_tx, stop_rx) = oneshot::channel();
        let writer = tokio::spawn(write_loop(sink, rx, stop_rx, Arc::clone(&session)));
        let reader = tokio::spawn(read_loop(source, Arc::clone(&session)));
        *session.reader.lock().unwrap_or_else(PoisonError::into_inner) = Some(reader.abort_handle());

        Self {
            session,
            writer: StreamHandle::new(writer, stop_tx),
            _reader: StreamHandle::abort_only(reader),
        }
    }

    async fn close(self) {
        let Self {
            session, writer, ..
        } = self;
        session.shutdown();
        writer.stop().await;
    }
}

fn read_request(variables: &[Uuid], opts: &OnlineSubscription) -> String {
    let ids: Vec<String> = variables.iter().map(Uuid::to_string).collect();
    json!({
        "Function": OnlineFunction::Read.as_str(),
        "Variables": ids,
        "Interval": opts.interval_ms,
        "Extended": opts.extended,
        "OnChange": opts.on_change,
        "Precision": opts.precision,
    })
    .to_string()
}

fn write_request(values: &BTreeMap<Uuid, f64>, function: OnlineFunction) -> String {
    let map: Map<String, Value> = values
        .iter()
        .map(|(id, v)| (id.to_string(), json!(v)))
        .collect();
    json!({ "Function": function.as_str(), "Values": map }).to_string()
}

/// Online ticks and value writes over one duplex WebSocket.
///
/// The connection is opened by the first call that needs it and shared by all
/// later subscriptions and publishes. When the last subscription is cancelled
/// or dropped the socket is closed; a lost connection ends every open stream
/// with one `StreamClosed`. There is no reconnect: the next call opens a fresh
/// connection.
pub struct WebSocketDriver {
    connector: Arc<dyn WsConnector>,
    credentials: Arc<dyn CredentialManager>,
    url: String,
    capacity: usize,
    connection: tokio::sync::Mutex<Option<Connection>>,
}

impl WebSocketDriver {
    /// Driver for the WebSocket endpoint of `base_url`.
    #[must_use]
    pub fn new(
        connector: Arc<dyn WsConnector>,
        credentials: Arc<dyn CredentialManager>,
        base_url: &str,
        config: &WebSocketConfig,
    ) -> Self {
        Self {
            connector,
            credentials,
            url: ws_url(base_url, &config.path),
            capacity: config.channel_capacity.max(1),
            connection: tokio::sync::Mutex::new(None),
        }
    }

    /// The `ws://`/`wss://` URL connections are opened against.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether a live connection is currently open.
    pub async fn is_connected(&self) -> bool {
        self.connection
            .lock()
            .await
            .as_ref()
            .is_some_and(|c| c.session.is_alive())
    }

    async fn session(&self) -> Result<Arc<Session>, GiDataError> {
        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.as_ref()
            && conn.session.is_alive()
        {
            return Ok(Arc::clone(&conn.session));
        }
        let bearer = self.credentials.bearer().await?;
        let (sink, source) = self.connector.connect(&self.url, &bearer).await?;
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "gidata_stream::websocket", url = %self.url, "websocket connected");
        let conn = Connection::spawn(sink, source);
        let session = Arc::clone(&conn.session);
        *slot = Some(conn);
        Ok(session)
    }

    /// Subscribe to online ticks of `variables`.
    ///
    /// # Errors
    /// `InvalidArg` for an empty list, or the connect failure.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "gidata_stream::websocket::stream_online",
            skip(self, variables),
            fields(n = variables.len()),
        )
    )]
    pub async fn stream_online(
        &self,
        variables: &[Uuid],
        opts: OnlineSubscription,
    ) -> Result<UpdateStream, GiDataError> {
        if variables.is_empty() {
            return Err(GiDataError::invalid_arg("no variables to stream"));
        }
        let session = self.session().await?;
        let (tx, rx) = mpsc::channel(self.capacity);
        let subscription = Subscription {
            id: session.register(variables.to_vec(), tx),
            session: Arc::clone(&session),
        };
        // registered first so the first tick cannot slip past
        session.send(read_request(variables, &opts))?;

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let _subscription = subscription;
            let _ = stop_rx.await;
        });
        Ok(UpdateStream::new(StreamHandle::new(task, stop_tx), rx))
    }

    /// Send `values` with the given function (normally `write`).
    ///
    /// # Errors
    /// `InvalidArg` for an empty map, the connect failure, or `StreamClosed`
    /// when the connection is already going away.
    pub async fn publish(
        &self,
        values: &BTreeMap<Uuid, f64>,
        function: OnlineFunction,
    ) -> Result<(), GiDataError> {
        if values.is_empty() {
            return Err(GiDataError::invalid_arg("no values to publish"));
        }
        let session = self.session().await?;
        session.send(write_request(values, function))
    }

    /// Close the current connection, if any, and wait for the socket to close.
    pub async fn close(&self) {
        let conn = self.connection.lock().await.take();
        if let Some(conn) = conn {
            conn.close().await;
        }
    }
}

#[async_trait]
impl UpdateSource for WebSocketDriver {
    async fn stream_updates(&self, variables: &[Uuid]) -> Result<UpdateStream, GiDataError> {
        self.stream_online(variables, OnlineSubscription::default())
            .await
    }
}
