use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use gidata_core::GiDataError;
use gidata_core::StreamHandle;
use gidata_core::consumer::{KafkaConsumerFactory, KafkaSettings, PayloadReceiver};

type Subscriber = mpsc::Sender<Result<Vec<u8>, GiDataError>>;

/// In-memory Kafka consumer factory.
///
/// Every pushed payload is delivered to all live subscriptions.
pub struct MockKafka {
    subscribers: Mutex<Vec<Subscriber>>,
    settings: Mutex<Vec<KafkaSettings>>,
    failure: Mutex<Option<GiDataError>>,
    released: Arc<AtomicUsize>,
}

impl Default for MockKafka {
    fn default() -> Self {
        Self::new()
    }
}

impl MockKafka {
    /// Factory that accepts every subscription.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            settings: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make the next subscriptions fail with `err`.
    pub fn fail_with(&self, err: GiDataError) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(err);
    }

    /// Settings of every subscription so far.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<KafkaSettings> {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of consumers whose task has been stopped or aborted.
    #[must_use]
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Deliver a raw payload to every subscriber.
    pub async fn push(&self, payload: impl Into<Vec<u8>>) {
        let payload = payload.into();
        let subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for tx in subs {
            let _ = tx.send(Ok(payload.clone())).await;
        }
    }

    /// Deliver a JSON payload to every subscriber.
    pub async fn push_json(&self, value: &serde_json::Value) {
        self.push(value.to_string().into_bytes()).await;
    }

    /// Report a consumer error to every subscriber.
    pub async fn push_error(&self, err: GiDataError) {
        let subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for tx in subs {
            let _ = tx.send(Err(err.clone())).await;
        }
    }

    /// Drop every subscriber's channel, as if the brokers went away.
    pub fn end(&self) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

struct ReleaseGuard(Arc<AtomicUsize>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl KafkaConsumerFactory for MockKafka {
    async fn subscribe(
        &self,
        settings: &KafkaSettings,
    ) -> Result<(StreamHandle, PayloadReceiver), GiDataError> {
        if let Some(err) = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(err);
        }
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(settings.clone());

        let (tx, rx) = mpsc::channel(64);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let guard = ReleaseGuard(Arc::clone(&self.released));
        let task = tokio::spawn(async move {
            let _guard = guard;
            let _ = stop_rx.await;
        });
        Ok((StreamHandle::new(task, stop_tx), rx))
    }
}
