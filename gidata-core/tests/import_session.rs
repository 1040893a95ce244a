use gidata_core::import::{IMPORT_PATH, ImportKind, run_import_session};
use gidata_core::{
    CsvImportSettings, GiDataError, HttpResponse, HttpTransport, LogSettings, Method,
};
use gidata_mock::MockHttp;
use gidata_mock::fixtures::rest;

const SESSION: &str = "/history/data/import/s-42";

fn target() -> LogSettings {
    LogSettings::new("src-1", "Bench A").measurement("run 7")
}

fn opened() -> MockHttp {
    MockHttp::default().on_json(Method::Post, IMPORT_PATH, rest::import_started("s-42"))
}

fn balanced(mock: &MockHttp) {
    assert_eq!(mock.count(Method::Post, IMPORT_PATH), 1);
    assert_eq!(mock.count(Method::Delete, SESSION), 1);
}

#[tokio::test]
async fn successful_upload_closes_session() {
    let mock = opened()
        .on_json(Method::Post, SESSION, serde_json::json!({"Success": true}))
        .on_json(Method::Delete, SESSION, serde_json::json!({"Success": true}));
    let http: &dyn HttpTransport = &mock;

    run_import_session(
        http,
        ImportKind::Csv,
        &target(),
        Some(&CsvImportSettings::default()),
        b"a;b\n1;2\n".to_vec(),
    )
    .await
    .unwrap();

    balanced(&mock);
    let start = &mock.json_bodies(Method::Post, IMPORT_PATH)[0];
    assert_eq!(start["Type"], "csv");
    assert_eq!(start["Target"]["SourceID"], "src-1");
    assert_eq!(start["Target"]["MeasurementName"], "run 7");
    assert!(start.get("CSVSettings").is_some());

    let upload = mock
        .calls()
        .into_iter()
        .find(|c| c.method == Method::Post && c.path == SESSION)
        .unwrap();
    assert_eq!(upload.content_type.as_deref(), Some("text/csv"));
    assert_eq!(upload.body.as_deref(), Some(&b"a;b\n1;2\n"[..]));
}

#[tokio::test]
async fn failed_close_after_upload_is_a_session_error() {
    let mock = opened()
        .on_bytes(Method::Post, SESSION, Vec::new())
        .on_status(Method::Delete, SESSION, 500, "close broke");
    let http: &dyn HttpTransport = &mock;

    match run_import_session(http, ImportKind::Udbf, &target(), None, vec![1, 2, 3]).await {
        Err(GiDataError::Session { session_id, message }) => {
            assert_eq!(session_id, "s-42");
            assert!(message.contains("close broke"));
        }
        other => panic!("unexpected: {other:?}"),
    }
    balanced(&mock);
}

#[tokio::test]
async fn failed_upload_still_closes_session() {
    let mock = opened()
        .on_status(Method::Post, SESSION, 422, "bad file")
        .on_bytes(Method::Delete, SESSION, Vec::new());
    let http: &dyn HttpTransport = &mock;

    match run_import_session(http, ImportKind::Udbf, &target(), None, vec![0]).await {
        Err(GiDataError::Upstream(_)) => {}
        other => panic!("unexpected: {other:?}"),
    }
    balanced(&mock);
}

#[tokio::test]
async fn double_failure_reports_both_errors() {
    let mock = opened()
        .on_status(Method::Post, SESSION, 422, "bad file")
        .on_status(Method::Delete, SESSION, 503, "gone");
    let http: &dyn HttpTransport = &mock;

    match run_import_session(http, ImportKind::Csv, &target(), None, vec![0]).await {
        Err(GiDataError::SessionCleanup { primary, cleanup }) => {
            assert!(primary.to_string().contains("bad file"));
            assert!(cleanup.to_string().contains("gone"));
        }
        other => panic!("unexpected: {other:?}"),
    }
    balanced(&mock);
}

#[tokio::test]
async fn session_id_may_sit_at_top_level() {
    let mock = MockHttp::default()
        .on(Method::Post, IMPORT_PATH, |_| {
            Ok(HttpResponse::new(200, br#"{"SessionId": 9}"#.to_vec()))
        })
        .on_bytes(Method::Post, "/history/data/import/9", Vec::new())
        .on_bytes(Method::Delete, "/history/data/import/9", Vec::new());
    let http: &dyn HttpTransport = &mock;

    run_import_session(http, ImportKind::Udbf, &target(), None, vec![0])
        .await
        .unwrap();
    assert_eq!(mock.count(Method::Delete, "/history/data/import/9"), 1);
}

#[tokio::test]
async fn failed_start_opens_nothing() {
    let mock = MockHttp::default().on_status(Method::Post, IMPORT_PATH, 401, "no");
    let http: &dyn HttpTransport = &mock;

    let err = run_import_session(http, ImportKind::Csv, &target(), None, vec![0])
        .await
        .unwrap_err();
    assert!(matches!(err, GiDataError::Upstream(_)));
    assert_eq!(mock.count_prefix(Method::Delete, IMPORT_PATH), 0);
}
