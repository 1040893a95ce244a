#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gidata_cloud::CloudGqlDriver;
use gidata_core::{CloudConfig, HttpResponse, HttpTransport, Method};
use gidata_mock::fixtures::{NOW_MS, SID, SID_2, VID, VID_2, VID_3, gql};
use gidata_mock::{FixedClock, MockHttp};
use serde_json::Value;

pub const GQL: &str = "/__api__/gql";

pub fn query_of(body: &Value) -> String {
    body["query"].as_str().unwrap_or_default().to_string()
}

/// Scripted GI.cloud: `SID` maps VID→f1 (and VID_2→f2 once `grow` is set),
/// `SID_2` maps VID_3→g1. Raw answers depend on the queried source.
pub struct Cloud {
    pub mock: Arc<MockHttp>,
    pub grow: Arc<AtomicBool>,
}

impl Cloud {
    pub fn new(raw_sid: Value, raw_sid2: Value) -> Self {
        Self::with_mock(MockHttp::default(), raw_sid, raw_sid2)
    }

    pub fn with_mock(mock: MockHttp, raw_sid: Value, raw_sid2: Value) -> Self {
        let grow = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&grow);
        let mock = mock.on(Method::Post, GQL, move |req| {
            let q = req.json_body().as_ref().map(query_of).unwrap_or_default();
            let second = q.contains(&SID_2.to_string());
            let body = if q.contains("variableMapping") {
                if second {
                    gql::variable_mapping(SID_2, "rig", &[("g1", VID_3, "pressure", "bar")])
                } else if flag.load(Ordering::SeqCst) {
                    gql::variable_mapping(
                        SID,
                        "bench",
                        &[("f1", VID, "temp", "V"), ("f2", VID_2, "speed", "rpm")],
                    )
                } else {
                    gql::variable_mapping(SID, "bench", &[("f1", VID, "temp", "V")])
                }
            } else if q.contains("exportCSV") {
                gql::export_csv("datetime;temp:bench:raw [V]\n")
            } else if second {
                raw_sid2.clone()
            } else {
                raw_sid.clone()
            };
            Ok(HttpResponse::new(200, body.to_string().into_bytes()))
        });
        Self {
            mock: Arc::new(mock),
            grow,
        }
    }

    pub fn driver(&self) -> CloudGqlDriver {
        let http: Arc<dyn HttpTransport> = self.mock.clone();
        CloudGqlDriver::new(http, CloudConfig::default())
            .with_clock(Arc::new(FixedClock::new(NOW_MS)))
    }

    pub fn queries(&self) -> Vec<String> {
        self.mock
            .json_bodies(Method::Post, GQL)
            .iter()
            .map(query_of)
            .collect()
    }

    pub fn mapping_queries(&self) -> usize {
        self.queries()
            .iter()
            .filter(|q| q.contains("variableMapping"))
            .count()
    }

    pub fn raw_queries(&self) -> Vec<String> {
        self.queries()
            .into_iter()
            .filter(|q| q.contains("Raw("))
            .collect()
    }
}
