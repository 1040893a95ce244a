use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use url::Url;
use uuid::Uuid;

use gidata_core::consumer::{KafkaConsumerFactory, KafkaSettings, PayloadReceiver};
use gidata_core::driver::UpdateSource;
use gidata_core::{
    CredentialManager, GiDataError, KafkaConfig, KafkaSubscription, StreamHandle, UpdateStream,
    VariableUpdate,
};

use crate::tick;

const DEFAULT_BROKER_PORT: u16 = 9092;

type UpdateTx = mpsc::Sender<Result<VariableUpdate, GiDataError>>;

async fn forward(
    consumer: StreamHandle,
    mut payloads: PayloadReceiver,
    wanted: Vec<Uuid>,
    tx: UpdateTx,
    mut stop_rx: oneshot::Receiver<()>,
) {
    loop {
        let item = tokio::select! {
            _ = &mut stop_rx => break,
            item = payloads.recv() => item,
        };
        let out = match item {
            Some(Ok(bytes)) => match tick::parse_payload(&bytes) {
                Ok(Some(values)) => {
                    let update = VariableUpdate::new(values).retain_only(&wanted);
                    if update.is_empty() {
                        continue;
                    }
                    Ok(update)
                }
                Ok(None) => continue,
                Err(e) => Err(e),
            },
            Some(Err(e)) => Err(e),
            None => {
                let _ = tx
                    .send(Err(GiDataError::StreamClosed("kafka consumer ended".into())))
                    .await;
                break;
            }
        };
        if tx.send(out).await.is_err() {
            break;
        }
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(target: "gidata_stream::kafka", "releasing kafka consumer");
    consumer.stop().await;
}

/// Live updates from the backend's Kafka topics.
///
/// Each [`stream`](Self::stream) call owns one consumer; cancelling or dropping
/// the stream stops it.
pub struct KafkaDriver {
    factory: Arc<dyn KafkaConsumerFactory>,
    credentials: Arc<dyn CredentialManager>,
    base_url: String,
    config: KafkaConfig,
}

impl KafkaDriver {
    /// Driver consuming through `factory`.
    #[must_use]
    pub fn new(
        factory: Arc<dyn KafkaConsumerFactory>,
        credentials: Arc<dyn CredentialManager>,
        base_url: impl Into<String>,
        config: KafkaConfig,
    ) -> Self {
        Self {
            factory,
            credentials,
            base_url: base_url.into(),
            config,
        }
    }

    /// Bootstrap servers: the configured list, else `{host}:9092` of the base URL.
    ///
    /// # Errors
    /// `InvalidArg` when no brokers are configured and the base URL has no host.
    pub fn brokers(&self) -> Result<String, GiDataError> {
        if let Some(brokers) = &self.config.brokers {
            return Ok(brokers.clone());
        }
        let url = Url::parse(&self.base_url)
            .map_err(|e| GiDataError::invalid_arg(format!("invalid base url: {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| GiDataError::invalid_arg("base url has no host"))?;
        Ok(format!("{host}:{DEFAULT_BROKER_PORT}"))
    }

    /// Consumer settings for `sub`.
    ///
    /// # Errors
    /// `InvalidArg` for missing brokers or topics, or a credential failure.
    pub async fn settings(&self, sub: &KafkaSubscription) -> Result<KafkaSettings, GiDataError> {
        if self.config.topics.is_empty() {
            return Err(GiDataError::invalid_arg("no kafka topics configured"));
        }
        let bearer = if self.credentials.is_cloud_environment() {
            Some(self.credentials.bearer().await?)
        } else {
            None
        };
        Ok(KafkaSettings {
            brokers: self.brokers()?,
            topics: self.config.topics.clone(),
            group_id: sub
                .group_id
                .clone()
                .unwrap_or_else(|| self.config.default_group_id.clone()),
            ssl: sub.ssl,
            bearer,
        })
    }

    /// Subscribe to updates of `variables`.
    ///
    /// # Errors
    /// `InvalidArg` for an empty list, or whatever the consumer setup failed with.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "gidata_stream::kafka::stream",
            skip(self, variables),
            fields(n = variables.len()),
        )
    )]
    pub async fn stream(
        &self,
        variables: &[Uuid],
        sub: &KafkaSubscription,
    ) -> Result<UpdateStream, GiDataError> {
        if variables.is_empty() {
            return Err(GiDataError::invalid_arg("no variables to stream"));
        }
        let settings = self.settings(sub).await?;
        let (consumer, payloads) = self.factory.subscribe(&settings).await?;

        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(forward(consumer, payloads, variables.to_vec(), tx, stop_rx));
        Ok(UpdateStream::new(StreamHandle::new(task, stop_tx), rx))
    }
}

#[async_trait]
impl UpdateSource for KafkaDriver {
    async fn stream_updates(&self, variables: &[Uuid]) -> Result<UpdateStream, GiDataError> {
        self.stream(variables, &KafkaSubscription::default()).await
    }
}
