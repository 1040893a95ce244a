use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use url::Url;

use gidata_cloud::CloudGqlDriver;
use gidata_core::consumer::KafkaConsumerFactory;
use gidata_core::socket::WsConnector;
use gidata_core::{
    Capability, Clock, CloudConfig, CredentialManager, DataDriver, Environment, GiDataConfig,
    GiDataError, HttpTransport, KafkaConfig, StaticCredentials, SystemClock, WebSocketConfig,
};
use gidata_http::{HttpTimeSeriesDriver, ReqwestTransport};
use gidata_stream::{KafkaDriver, TungsteniteConnector, WebSocketDriver};

/// Client for one GI backend.
///
/// Requests are dispatched to a buffer-domain driver chosen by the environment
/// (GraphQL for `Cloud`, REST for `Local`) and a REST history driver. The
/// WebSocket and Kafka drivers are created on first use and then reused.
pub struct GiData {
    pub(crate) cfg: GiDataConfig,
    pub(crate) environment: Environment,
    pub(crate) http: Arc<dyn HttpTransport>,
    pub(crate) credentials: Arc<dyn CredentialManager>,
    pub(crate) buffer: Arc<dyn DataDriver>,
    pub(crate) history: Arc<dyn DataDriver>,
    pub(crate) ws_connector: Arc<dyn WsConnector>,
    pub(crate) kafka_factory: Option<Arc<dyn KafkaConsumerFactory>>,
    pub(crate) ws: OnceCell<WebSocketDriver>,
    pub(crate) kafka: OnceCell<KafkaDriver>,
}

/// Builder for [`GiData`].
pub struct GiDataBuilder {
    cfg: GiDataConfig,
    credentials: Option<Arc<dyn CredentialManager>>,
    access_token: Option<String>,
    transport: Option<Arc<dyn HttpTransport>>,
    clock: Arc<dyn Clock>,
    ws_connector: Option<Arc<dyn WsConnector>>,
    kafka_factory: Option<Arc<dyn KafkaConsumerFactory>>,
}

impl Default for GiDataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GiDataBuilder {
    /// Builder with [`GiDataConfig::default`] and no credentials.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cfg: GiDataConfig::default(),
            credentials: None,
            access_token: None,
            transport: None,
            clock: Arc::new(SystemClock),
            ws_connector: None,
            kafka_factory: None,
        }
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: GiDataConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Backend base URL, e.g. `http://10.1.50.36:8090`.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.cfg.base_url = url.into();
        self
    }

    /// Force the environment instead of asking the credential manager.
    #[must_use]
    pub const fn environment(mut self, env: Environment) -> Self {
        self.cfg.environment = Some(env);
        self
    }

    /// Per-request HTTP timeout of the built-in transport.
    #[must_use]
    pub const fn http_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.http_timeout = timeout;
        self
    }

    /// Point budget reported by [`GiData::default_points`].
    #[must_use]
    pub const fn default_points(mut self, points: u32) -> Self {
        self.cfg.default_points = points;
        self
    }

    /// GraphQL backend settings.
    #[must_use]
    pub fn cloud(mut self, cloud: CloudConfig) -> Self {
        self.cfg.cloud = cloud;
        self
    }

    /// WebSocket settings.
    #[must_use]
    pub fn websocket(mut self, ws: WebSocketConfig) -> Self {
        self.cfg.websocket = ws;
        self
    }

    /// Kafka settings.
    #[must_use]
    pub fn kafka(mut self, kafka: KafkaConfig) -> Self {
        self.cfg.kafka = kafka;
        self
    }

    /// Credential manager supplying bearer tokens. Replaces any
    /// [`access_token`](Self::access_token).
    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialManager>) -> Self {
        self.credentials = Some(credentials);
        self.access_token = None;
        self
    }

    /// Fixed access token. Replaces any credential manager.
    ///
    /// The credentials are built in [`build`](Self::build), so they belong to
    /// the cloud exactly when [`environment`](Self::environment) forces `Cloud`,
    /// whichever of the two is called first.
    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self.credentials = None;
        self
    }

    /// HTTP transport shared by every driver, replacing the reqwest one.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Clock used to resolve relative windows.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// WebSocket connector, replacing the tungstenite one.
    #[must_use]
    pub fn with_ws_connector(mut self, connector: Arc<dyn WsConnector>) -> Self {
        self.ws_connector = Some(connector);
        self
    }

    /// Kafka consumer factory. Without one (and without the `kafka` feature)
    /// Kafka streaming reports `NotSupported`.
    #[must_use]
    pub fn with_kafka_factory(mut self, factory: Arc<dyn KafkaConsumerFactory>) -> Self {
        self.kafka_factory = Some(factory);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the base URL is not an absolute `http(s)` URL, or
    /// `Upstream(Connection)` if the HTTP client cannot be created.
    pub fn build(self) -> Result<GiData, GiDataError> {
        let url = Url::parse(&self.cfg.base_url).map_err(|e| {
            GiDataError::invalid_arg(format!("invalid base url {:?}: {e}", self.cfg.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(GiDataError::invalid_arg(format!(
                "base url must be http(s)://host[:port], got {:?}",
                self.cfg.base_url
            )));
        }

        let credentials = match self.credentials {
            Some(credentials) => credentials,
            None => {
                let token = self.access_token.unwrap_or_default();
                Arc::new(match self.cfg.environment {
                    Some(Environment::Cloud) => StaticCredentials::cloud(token),
                    Some(Environment::Local) | None => StaticCredentials::local(token),
                }) as Arc<dyn CredentialManager>
            }
        };
        let environment = self.cfg.environment.unwrap_or(if credentials.is_cloud_environment() {
            Environment::Cloud
        } else {
            Environment::Local
        });
        let http: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new(
                &self.cfg.base_url,
                Arc::clone(&credentials),
                self.cfg.http_timeout,
            )?),
        };

        let buffer: Arc<dyn DataDriver> = match environment {
            Environment::Cloud => Arc::new(
                CloudGqlDriver::new(Arc::clone(&http), self.cfg.cloud.clone())
                    .with_clock(Arc::clone(&self.clock)),
            ),
            Environment::Local => Arc::new(
                HttpTimeSeriesDriver::buffer(Arc::clone(&http)).with_clock(Arc::clone(&self.clock)),
            ),
        };
        let history: Arc<dyn DataDriver> = Arc::new(
            HttpTimeSeriesDriver::history(Arc::clone(&http)).with_clock(Arc::clone(&self.clock)),
        );

        #[cfg(feature = "kafka")]
        let kafka_factory = self.kafka_factory.or_else(|| {
            Some(Arc::new(gidata_stream::RdKafkaFactory::new(
                self.cfg.kafka.channel_capacity,
            )) as Arc<dyn KafkaConsumerFactory>)
        });
        #[cfg(not(feature = "kafka"))]
        let kafka_factory = self.kafka_factory;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "gidata::core",
            base_url = %self.cfg.base_url,
            ?environment,
            buffer = buffer.name(),
            "gidata client built"
        );

        Ok(GiData {
            environment,
            http,
            credentials,
            buffer,
            history,
            ws_connector: self
                .ws_connector
                .unwrap_or_else(|| Arc::new(TungsteniteConnector)),
            kafka_factory,
            ws: OnceCell::new(),
            kafka: OnceCell::new(),
            cfg: self.cfg,
        })
    }
}

impl GiData {
    /// Start building a client.
    ///
    /// ```rust,ignore
    /// let gi = gidata::GiData::builder()
    ///     .base_url("http://10.1.50.36:8090")
    ///     .access_token("...")
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> GiDataBuilder {
        GiDataBuilder::new()
    }

    /// The environment the buffer driver was chosen for.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// The effective configuration.
    #[must_use]
    pub const fn config(&self) -> &GiDataConfig {
        &self.cfg
    }

    /// Point budget configured for callers that do not pick one.
    #[must_use]
    pub const fn default_points(&self) -> u32 {
        self.cfg.default_points
    }

    /// The buffer-domain driver.
    #[must_use]
    pub fn buffer_driver(&self) -> &dyn DataDriver {
        self.buffer.as_ref()
    }

    /// The history-domain driver.
    #[must_use]
    pub fn history_driver(&self) -> &dyn DataDriver {
        self.history.as_ref()
    }

    /// Union of the capabilities of both drivers, plus streaming.
    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut caps = self.buffer.capabilities();
        for c in self.history.capabilities() {
            if !caps.contains(&c) {
                caps.push(c);
            }
        }
        caps.push(Capability::StreamOnline);
        caps.push(Capability::PublishOnline);
        if self.kafka_factory.is_some() {
            caps.push(Capability::StreamKafka);
        }
        caps
    }

    /// Drop the live WebSocket connection, if one is open.
    ///
    /// The client stays usable; the next streaming call reconnects.
    pub async fn close(&self) {
        if let Some(ws) = self.ws.get() {
            ws.close().await;
        }
    }
}
