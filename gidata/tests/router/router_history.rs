use gidata::{SourceId, TimeWindow, VariableSelector};
use gidata_core::Method;
use gidata_mock::MockHttp;
use gidata_mock::fixtures::{NOW_MS, SID, VID, rest};
use uuid::Uuid;

use crate::helpers::{GQL, Rig};

fn history_mock() -> MockHttp {
    MockHttp::default().on_json(
        Method::Post,
        "/history/data",
        rest::data_response(NOW_MS - 4.0, 1.0, &[rest::constant(4, 0.5)]),
    )
}

#[tokio::test]
async fn history_fetch_uses_rest_in_every_environment() {
    let rig = Rig::new(history_mock());
    let sel = [VariableSelector::new(SID, VID)];

    for gi in [rig.local(), rig.cloud()] {
        let frame = gi.fetch_history(&sel, TimeWindow::last(4.0), 64).await.unwrap();
        assert_eq!(frame.shape(), (4, 1));
    }

    assert_eq!(rig.http.count(Method::Post, "/history/data"), 2);
    assert_eq!(rig.http.count(Method::Post, GQL), 0);
    let body = &rig.http.json_bodies(Method::Post, "/history/data")[0];
    assert_eq!(body["Points"], 64);
    assert_eq!(body["End"], NOW_MS);
}

#[tokio::test]
async fn history_structure_and_measurements() {
    let m1 = Uuid::from_u128(0xa);
    let m2 = Uuid::from_u128(0xb);
    let http = MockHttp::default()
        .on_json(Method::Get, "/history/structure/sources", rest::sources(&[(SID, "archive")]))
        .on_json(
            Method::Get,
            &format!("/history/structure/sources/{SID}/variables"),
            rest::stream_variables(&[(VID, "temp", "V")]),
        )
        .on_json(
            Method::Get,
            &format!("/history/structure/sources/{SID}/measurements"),
            rest::measurements(&[m1, m2]),
        );
    let rig = Rig::new(http);
    let gi = rig.cloud();
    let sid = SourceId::from(SID);

    let sources = gi.list_history_sources().await.unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].name, "archive");

    let vars = gi.list_history_variables(&sid).await.unwrap();
    assert_eq!(vars.len(), 1);

    let measurements = gi.list_history_measurements(&sid).await.unwrap();
    assert_eq!(measurements.len(), 2);
}

#[tokio::test]
async fn invalid_history_requests_never_reach_the_backend() {
    let rig = Rig::new(history_mock());
    let gi = rig.local();

    assert!(gi.fetch_history(&[], TimeWindow::default(), 10).await.is_err());
    assert!(
        gi.fetch_history(&[VariableSelector::new(SID, VID)], TimeWindow::default(), 0)
            .await
            .is_err()
    );
    assert!(rig.http.calls().is_empty());
}
