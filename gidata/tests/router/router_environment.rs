use gidata::{SourceId, TimeWindow, VariableSelector};
use gidata_core::{HttpResponse, Method};
use gidata_mock::MockHttp;
use gidata_mock::fixtures::{NOW_MS, SID, VID, VID_2, gql, rest};

use crate::helpers::{GQL, Rig, query_of};

#[tokio::test]
async fn local_buffer_fetch_goes_to_rest() {
    let rig = Rig::new(MockHttp::default().on_json(
        Method::Post,
        "/buffer/data",
        rest::data_response(NOW_MS - 5.0, 1.0, &[rest::constant(5, 2.5)]),
    ));
    let gi = rig.local();

    let frame = gi
        .fetch_buffer(&[VariableSelector::new(SID, VID)], TimeWindow::last(5.0), 100)
        .await
        .unwrap();

    assert_eq!(frame.shape(), (5, 1));
    assert_eq!(rig.http.count(Method::Post, "/buffer/data"), 1);
    assert_eq!(rig.http.count(Method::Post, GQL), 0);
}

#[tokio::test]
async fn cloud_buffer_fetch_goes_to_graphql() {
    let rig = Rig::new(MockHttp::default().on(Method::Post, GQL, |req| {
        let q = req.json_body().as_ref().map(query_of).unwrap_or_default();
        let body = if q.contains("variableMapping") {
            gql::variable_mapping(SID, "bench", &[("f1", VID, "temp", "V")])
        } else {
            gql::raw_rows(&gql::raw_series(NOW_MS - 3.0, 1.0, 3, &[7.0]))
        };
        Ok(HttpResponse::new(200, body.to_string().into_bytes()))
    }));
    let gi = rig.cloud();

    let frame = gi
        .fetch_buffer(&[VariableSelector::new(SID, VID)], TimeWindow::last(3.0), 100)
        .await
        .unwrap();

    assert_eq!(frame.shape(), (3, 1));
    assert_eq!(rig.http.count(Method::Post, "/buffer/data"), 0);
    assert!(rig.http.count(Method::Post, GQL) >= 2);
}

#[tokio::test]
async fn buffer_structure_root_depends_on_environment() {
    let http = MockHttp::default()
        .on_json(Method::Get, "/buffer/structure/sources", rest::sources(&[(SID, "local")]))
        .on_json(Method::Get, "/kafka/structure/sources", rest::sources(&[(SID, "cloud")]));
    let rig = Rig::new(http);

    let local = rig.local().list_buffer_sources().await.unwrap();
    let cloud = rig.cloud().list_buffer_sources().await.unwrap();

    assert_eq!(local[0].name, "local");
    assert_eq!(cloud[0].name, "cloud");
}

#[tokio::test]
async fn stream_variables_come_from_the_buffer_driver() {
    let path = format!("/buffer/structure/sources/{SID}/variables");
    let rig = Rig::new(MockHttp::default().on_json(
        Method::Get,
        &path,
        rest::stream_variables(&[(VID, "temp", "V"), (VID_2, "speed", "rpm")]),
    ));

    let vars = rig
        .local()
        .list_stream_variables(&SourceId::from(SID))
        .await
        .unwrap();
    assert_eq!(vars.len(), 2);
    assert_eq!(rig.http.count(Method::Get, &path), 1);
}

#[tokio::test]
async fn online_read_and_write_use_the_online_surface() {
    let rig = Rig::new(MockHttp::default().on_json(
        Method::Post,
        "/online/data",
        rest::online_values(&[1.25, 3.5]),
    ));
    let gi = rig.local();

    let values = gi.read_online(&[VID, VID_2]).await.unwrap();
    assert_eq!(values.get(&VID), Some(&1.25));
    assert_eq!(values.get(&VID_2), Some(&3.5));

    gi.write_online(&[(VID, 9.0)]).await.unwrap();
    let bodies = rig.http.json_bodies(Method::Post, "/online/data");
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0]["Function"], "read");
    assert_eq!(bodies[1]["Values"][0], 9.0);
}
