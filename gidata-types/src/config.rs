//! Configuration types shared by the client and its drivers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Deployment flavour of the backend the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Environment {
    /// On-premise device API (GI.bench, Q.core, Q.station): JSON REST only.
    #[default]
    Local,
    /// GI.cloud: GraphQL for buffered data, REST for the rest.
    Cloud,
}

/// Settings specific to the GraphQL cloud backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudConfig {
    /// Path of the GraphQL endpoint, relative to the base URL.
    pub graphql_path: String,
    /// Path segment under which stream structure is published (`/{root}/structure/...`).
    pub structure_root: String,
    /// Aggregation label written into exported CSV column headers.
    pub default_aggregation: String,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            graphql_path: "/__api__/gql".to_string(),
            structure_root: "kafka".to_string(),
            default_aggregation: "raw".to_string(),
        }
    }
}

/// Settings for the WebSocket tick stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSocketConfig {
    /// Path of the WebSocket endpoint, relative to the base URL.
    pub path: String,
    /// Capacity of the per-subscription update channel.
    pub channel_capacity: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            path: "/ws".to_string(),
            channel_capacity: 1024,
        }
    }
}

/// Settings for the Kafka consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Comma-separated bootstrap servers. `None` derives `{host}:9092` from the base URL.
    pub brokers: Option<String>,
    /// Topics to subscribe to.
    pub topics: Vec<String>,
    /// Consumer group used when a subscription does not name one.
    pub default_group_id: String,
    /// Capacity of the per-subscription update channel.
    pub channel_capacity: usize,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: None,
            topics: vec!["online".to_string()],
            default_group_id: "gi_data_client".to_string(),
            channel_capacity: 1024,
        }
    }
}

/// Global configuration for the `GiData` client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiDataConfig {
    /// Base URL of the backend, e.g. `http://10.1.50.36:8090`.
    pub base_url: String,
    /// Forced environment. `None` asks the credential manager.
    pub environment: Option<Environment>,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
    /// Point budget used when a fetch does not specify one.
    pub default_points: u32,
    /// GraphQL backend settings.
    pub cloud: CloudConfig,
    /// WebSocket settings.
    pub websocket: WebSocketConfig,
    /// Kafka settings.
    pub kafka: KafkaConfig,
}

impl Default for GiDataConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".to_string(),
            environment: None,
            http_timeout: Duration::from_secs(160),
            default_points: 2048,
            cloud: CloudConfig::default(),
            websocket: WebSocketConfig::default(),
            kafka: KafkaConfig::default(),
        }
    }
}
