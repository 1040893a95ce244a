use std::error::Error;

use async_trait::async_trait;
use rdkafka::client::{ClientContext, OAuthToken};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, ConsumerContext, StreamConsumer};
use rdkafka::message::Message;
use tokio::sync::{mpsc, oneshot};

use gidata_core::consumer::{KafkaConsumerFactory, KafkaSettings, PayloadReceiver};
use gidata_core::{GiDataError, StreamHandle};

// librdkafka asks for a fresh token well before this lifetime runs out
const TOKEN_LIFETIME_MS: i64 = 15 * 60 * 1000;

struct BearerContext {
    bearer: Option<String>,
}

impl ClientContext for BearerContext {
    const ENABLE_REFRESH_OAUTH_TOKEN: bool = true;

    fn generate_oauth_token(
        &self,
        _oauthbearer_config: Option<&str>,
    ) -> Result<OAuthToken, Box<dyn Error>> {
        let token = self.bearer.clone().ok_or("no bearer token for SASL/OAUTHBEARER")?;
        #[allow(clippy::cast_possible_truncation)]
        let now_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)?
            .as_millis() as i64;
        Ok(OAuthToken {
            token,
            principal_name: "gidata".to_string(),
            lifetime_ms: now_ms + TOKEN_LIFETIME_MS,
        })
    }
}

impl ConsumerContext for BearerContext {}

fn client_config(settings: &KafkaSettings) -> ClientConfig {
    let mut config = ClientConfig::new();
    config
        .set("bootstrap.servers", &settings.brokers)
        .set("group.id", &settings.group_id)
        .set("enable.auto.commit", "true")
        .set("auto.offset.reset", "latest");
    let protocol = match (settings.ssl, settings.bearer.is_some()) {
        (false, false) => "plaintext",
        (true, false) => "ssl",
        (false, true) => "sasl_plaintext",
        (true, true) => "sasl_ssl",
    };
    config.set("security.protocol", protocol);
    if settings.bearer.is_some() {
        config.set("sasl.mechanism", "OAUTHBEARER");
    }
    config
}

/// [`KafkaConsumerFactory`] backed by an rdkafka `StreamConsumer`.
#[derive(Debug, Clone, Copy)]
pub struct RdKafkaFactory {
    capacity: usize,
}

impl Default for RdKafkaFactory {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl RdKafkaFactory {
    /// Factory whose payload channels hold up to `capacity` messages.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self { capacity }
    }
}

#[async_trait]
impl KafkaConsumerFactory for RdKafkaFactory {
    async fn subscribe(
        &self,
        settings: &KafkaSettings,
    ) -> Result<(StreamHandle, PayloadReceiver), GiDataError> {
        let context = BearerContext {
            bearer: settings.bearer.clone(),
        };
        let consumer: StreamConsumer<BearerContext> = client_config(settings)
            .create_with_context(context)
            .map_err(|e| GiDataError::connection(format!("kafka consumer setup: {e}")))?;
        let topics: Vec<&str> = settings.topics.iter().map(String::as_str).collect();
        consumer
            .subscribe(&topics)
            .map_err(|e| GiDataError::connection(format!("kafka subscribe: {e}")))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "gidata_stream::kafka",
            brokers = %settings.brokers,
            group = %settings.group_id,
            "kafka consumer subscribed"
        );

        let (tx, rx) = mpsc::channel(self.capacity.max(1));
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            loop {
                let item = tokio::select! {
                    _ = &mut stop_rx => break,
                    msg = consumer.recv() => msg
                        .map(|m| m.payload().map(<[u8]>::to_vec))
                        .map_err(|e| GiDataError::connection(e.to_string())),
                };
                let out = match item {
                    Ok(Some(payload)) => Ok(payload),
                    Ok(None) => continue,
                    Err(e) => Err(e),
                };
                if tx.send(out).await.is_err() {
                    break;
                }
            }
        });
        Ok((StreamHandle::new(task, stop_tx), rx))
    }
}
