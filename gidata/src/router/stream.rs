use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::GiData;
use gidata_core::{
    Capability, GiDataError, KafkaSubscription, OnlineFunction, OnlineSubscription, UpdateStream,
};
use gidata_stream::{KafkaDriver, WebSocketDriver};

impl GiData {
    async fn ws_driver(&self) -> &WebSocketDriver {
        self.ws
            .get_or_init(|| async {
                #[cfg(feature = "tracing")]
                tracing::debug!(target: "gidata::router::stream", "creating websocket driver");
                WebSocketDriver::new(
                    Arc::clone(&self.ws_connector),
                    Arc::clone(&self.credentials),
                    self.http.base_url(),
                    &self.cfg.websocket,
                )
            })
            .await
    }

    async fn kafka_driver(&self) -> Result<&KafkaDriver, GiDataError> {
        let Some(factory) = &self.kafka_factory else {
            return Err(GiDataError::not_supported(Capability::StreamKafka.as_str()));
        };
        Ok(self
            .kafka
            .get_or_init(|| async {
                #[cfg(feature = "tracing")]
                tracing::debug!(target: "gidata::router::stream", "creating kafka driver");
                KafkaDriver::new(
                    Arc::clone(factory),
                    Arc::clone(&self.credentials),
                    self.http.base_url(),
                    self.cfg.kafka.clone(),
                )
            })
            .await)
    }

    /// Subscribe to online ticks over the shared WebSocket connection.
    ///
    /// Cancel (or drop) the returned stream to release the subscription; the
    /// socket closes once no subscription is left.
    ///
    /// # Errors
    /// `InvalidArg` for an empty list, or the connect failure.
    pub async fn stream_online(
        &self,
        variables: &[Uuid],
        opts: OnlineSubscription,
    ) -> Result<UpdateStream, GiDataError> {
        self.ws_driver().await.stream_online(variables, opts).await
    }

    /// Publish values over the shared WebSocket connection.
    ///
    /// # Errors
    /// `InvalidArg` for an empty map, the connect failure, or `StreamClosed`.
    pub async fn publish_online(
        &self,
        values: &BTreeMap<Uuid, f64>,
        function: OnlineFunction,
    ) -> Result<(), GiDataError> {
        self.ws_driver().await.publish(values, function).await
    }

    /// Subscribe to updates from the backend's Kafka topics.
    ///
    /// # Errors
    /// `NotSupported` without a consumer factory; setup failures are returned
    /// immediately.
    pub async fn stream_kafka(
        &self,
        variables: &[Uuid],
        sub: &KafkaSubscription,
    ) -> Result<UpdateStream, GiDataError> {
        self.kafka_driver().await?.stream(variables, sub).await
    }
}
