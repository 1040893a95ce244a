#![allow(dead_code)]

use std::sync::Arc;

use gidata::{GiData, VariableSelector};
use gidata_core::{HttpTransport, Method};
use gidata_core::socket::WsConnector;
use gidata_mock::fixtures::{NOW_MS, SID, VID, rest};
use gidata_mock::{FixedClock, MockHttp, MockWs};
use uuid::Uuid;

/// Client plus the mocked socket, when running against mocks.
pub struct Demo {
    pub gi: GiData,
    pub ws: Option<Arc<MockWs>>,
    pub source: Uuid,
    pub variable: Uuid,
}

impl Demo {
    pub fn selector(&self) -> VariableSelector {
        VariableSelector::new(self.source, self.variable)
    }
}

fn id_from_env(key: &str) -> Result<Uuid, Box<dyn std::error::Error>> {
    let raw = std::env::var(key).map_err(|_| format!("set {key}"))?;
    Ok(Uuid::parse_str(&raw)?)
}

/// Real backend from `GIDATA_URL`/`GIDATA_TOKEN`, or mocks when
/// `GIDATA_EXAMPLES_USE_MOCK` is set.
pub fn demo() -> Result<Demo, Box<dyn std::error::Error>> {
    if std::env::var("GIDATA_EXAMPLES_USE_MOCK").is_ok() {
        println!("--- (Using mock backend for CI) ---");
        return Ok(mocked());
    }
    let url = std::env::var("GIDATA_URL").unwrap_or_else(|_| "http://localhost:8090".into());
    let token = std::env::var("GIDATA_TOKEN").unwrap_or_default();
    let gi = GiData::builder().base_url(url).access_token(token).build()?;
    Ok(Demo {
        gi,
        ws: None,
        source: id_from_env("GIDATA_SID")?,
        variable: id_from_env("GIDATA_VID")?,
    })
}

fn mocked() -> Demo {
    let mock = MockHttp::default()
        .on_json(
            Method::Post,
            "/buffer/data",
            rest::data_response(NOW_MS - 10.0, 1.0, &[rest::constant(10, 21.5)]),
        )
        .on_json(
            Method::Post,
            "/history/data",
            rest::data_response(NOW_MS - 60_000.0, 1_000.0, &[rest::constant(60, 20.0)]),
        )
        .on_json(Method::Get, "/buffer/structure/sources", rest::sources(&[(SID, "bench")]));
    let http: Arc<dyn HttpTransport> = Arc::new(mock);
    let ws = Arc::new(MockWs::new());
    let connector: Arc<dyn WsConnector> = ws.clone();
    let gi = GiData::builder()
        .base_url(http.base_url())
        .with_transport(Arc::clone(&http))
        .with_ws_connector(connector)
        .with_clock(Arc::new(FixedClock::new(NOW_MS)))
        .build()
        .expect("mock client builds");
    Demo {
        gi,
        ws: Some(ws),
        source: SID,
        variable: VID,
    }
}

/// Log to stderr, honouring `RUST_LOG`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
