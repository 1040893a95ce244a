use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::stream::StreamHandle;
use gidata_types::GiDataError;

/// Connection settings for one Kafka subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaSettings {
    /// Comma-separated bootstrap servers.
    pub brokers: String,
    /// Topics to subscribe to.
    pub topics: Vec<String>,
    /// Consumer group id.
    pub group_id: String,
    /// Use TLS towards the brokers.
    pub ssl: bool,
    /// Bearer token for SASL/OAUTHBEARER, when the cluster requires one.
    pub bearer: Option<String>,
}

/// Payload channel of a running consumer.
pub type PayloadReceiver = mpsc::Receiver<Result<Vec<u8>, GiDataError>>;

/// Creates Kafka consumers and pumps their payloads into a channel.
#[async_trait]
pub trait KafkaConsumerFactory: Send + Sync {
    /// Subscribe according to `settings`.
    ///
    /// Setup failures must be reported here, not through the channel.
    async fn subscribe(
        &self,
        settings: &KafkaSettings,
    ) -> Result<(StreamHandle, PayloadReceiver), GiDataError>;
}
