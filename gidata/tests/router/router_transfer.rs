use gidata::{
    CsvImportSettings, Domain, ExportRequest, GiDataError, LogSettings, TimeWindow,
    VariableSelector,
};
use gidata_core::{HttpResponse, Method};
use gidata_mock::MockHttp;
use gidata_mock::fixtures::{SID, VID, gql, rest};

use crate::helpers::{GQL, Rig, query_of};

fn export_mock() -> MockHttp {
    MockHttp::default()
        .on_bytes(Method::Post, "/buffer/data", b"buffer".to_vec())
        .on_bytes(Method::Post, "/history/data", b"history".to_vec())
        .on(Method::Post, GQL, |req| {
            let q = req.json_body().as_ref().map(query_of).unwrap_or_default();
            let body = if q.contains("variableMapping") {
                gql::variable_mapping(SID, "bench", &[("f1", VID, "temp", "V")])
            } else {
                gql::export_csv("cloud")
            };
            Ok(HttpResponse::new(200, body.to_string().into_bytes()))
        })
}

fn request(domain: Domain) -> ExportRequest {
    ExportRequest::csv(domain, vec![VariableSelector::new(SID, VID)], TimeWindow::last(1_000.0))
}

#[tokio::test]
async fn export_is_routed_by_domain() {
    let rig = Rig::new(export_mock());
    let local = rig.local();

    assert_eq!(local.export(&request(Domain::Buffer)).await.unwrap(), b"buffer");
    assert_eq!(local.export(&request(Domain::History)).await.unwrap(), b"history");
    assert_eq!(rig.http.count(Method::Post, GQL), 0);
}

#[tokio::test]
async fn cloud_buffer_export_uses_graphql_and_history_stays_rest() {
    let rig = Rig::new(export_mock());
    let cloud = rig.cloud();

    assert_eq!(cloud.export(&request(Domain::Buffer)).await.unwrap(), b"cloud");
    assert_eq!(cloud.export(&request(Domain::History)).await.unwrap(), b"history");
    assert_eq!(rig.http.count(Method::Post, "/buffer/data"), 0);
}

#[tokio::test]
async fn export_validation_precedes_routing() {
    let rig = Rig::new(export_mock());
    let req = ExportRequest::csv(Domain::Buffer, Vec::new(), TimeWindow::default());
    match rig.local().export(&req).await {
        Err(GiDataError::InvalidArg(_)) => {}
        other => panic!("unexpected: {other:?}"),
    }
    assert!(rig.http.calls().is_empty());
}

fn import_mock() -> MockHttp {
    MockHttp::default()
        .on_json(Method::Post, "/history/data/import", rest::import_started("s-1"))
        .on_bytes(Method::Post, "/history/data/import/s-1", Vec::new())
        .on_bytes(Method::Delete, "/history/data/import/s-1", Vec::new())
}

#[tokio::test]
async fn imports_run_one_session_each() {
    for cloud in [false, true] {
        let rig = Rig::new(import_mock());
        let gi = if cloud { rig.cloud() } else { rig.local() };
        let target = LogSettings::new("src", "Upload");

        gi.import_csv(b"ts;v\n1;2\n".to_vec(), &target, &CsvImportSettings::default())
            .await
            .unwrap();
        gi.import_udbf(vec![0u8; 8], &target).await.unwrap();

        assert_eq!(rig.http.count(Method::Post, "/history/data/import"), 2);
        assert_eq!(rig.http.count(Method::Delete, "/history/data/import/s-1"), 2);
        let uploads: Vec<usize> = rig
            .http
            .calls()
            .into_iter()
            .filter(|c| c.method == Method::Post && c.path == "/history/data/import/s-1")
            .map(|c| c.body.map_or(0, |b| b.len()))
            .collect();
        assert_eq!(uploads, vec![10, 8]);
    }
}
