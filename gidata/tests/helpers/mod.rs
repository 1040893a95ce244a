#![allow(dead_code)]

use std::sync::Arc;

use gidata::{Environment, GiData, GiDataBuilder};
use gidata_core::HttpTransport;
use gidata_core::consumer::KafkaConsumerFactory;
use gidata_core::socket::WsConnector;
use gidata_mock::fixtures::NOW_MS;
use gidata_mock::{FixedClock, MockHttp, MockKafka, MockWs, MockWsPeer};
use serde_json::json;

pub const GQL: &str = "/__api__/gql";

/// Mocks behind one client.
pub struct Rig {
    pub http: Arc<MockHttp>,
    pub ws: Arc<MockWs>,
    pub kafka: Arc<MockKafka>,
}

impl Rig {
    pub fn new(http: MockHttp) -> Self {
        Self {
            http: Arc::new(http),
            ws: Arc::new(MockWs::new()),
            kafka: Arc::new(MockKafka::new()),
        }
    }

    /// Builder wired to the mocks, without a Kafka factory.
    pub fn builder(&self, env: Environment) -> GiDataBuilder {
        let http: Arc<dyn HttpTransport> = self.http.clone();
        let ws: Arc<dyn WsConnector> = self.ws.clone();
        GiData::builder()
            .base_url(self.http.base_url())
            .environment(env)
            .access_token("tok")
            .with_transport(http)
            .with_ws_connector(ws)
            .with_clock(Arc::new(FixedClock::new(NOW_MS)))
    }

    pub fn local(&self) -> GiData {
        self.builder(Environment::Local).build().unwrap()
    }

    pub fn cloud(&self) -> GiData {
        self.builder(Environment::Cloud).build().unwrap()
    }

    /// Local client that also streams from the mocked Kafka.
    pub fn with_kafka(&self, env: Environment) -> GiData {
        let factory: Arc<dyn KafkaConsumerFactory> = self.kafka.clone();
        self.builder(env).with_kafka_factory(factory).build().unwrap()
    }

    pub async fn peer(&self) -> MockWsPeer {
        self.ws.accept().await.expect("client never connected")
    }
}

/// Online tick frame carrying `pairs`.
pub fn tick(pairs: &[(uuid::Uuid, f64)]) -> serde_json::Value {
    let values: serde_json::Map<String, serde_json::Value> =
        pairs.iter().map(|(id, v)| (id.to_string(), json!(v))).collect();
    json!({ "Values": values })
}

pub fn query_of(body: &serde_json::Value) -> String {
    body["query"].as_str().unwrap_or_default().to_string()
}
