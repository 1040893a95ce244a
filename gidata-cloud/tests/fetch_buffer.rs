#[path = "helpers.rs"]
mod helpers;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use gidata_core::driver::BufferProvider;
use gidata_core::{GiDataError, TimeWindow, UpstreamError, VariableSelector};
use gidata_mock::MockHttp;
use gidata_mock::fixtures::{NOW_MS, SID, SID_2, VID, VID_2, VID_3, gql};
use helpers::Cloud;
use uuid::Uuid;

fn two_columns(n: usize) -> serde_json::Value {
    gql::raw_rows(&gql::raw_series(NOW_MS - 1_000.0, 1.0, n, &[1.0, 2.0]))
}

fn one_column(n: usize) -> serde_json::Value {
    gql::raw_rows(&gql::raw_series(NOW_MS - 1_000.0, 1.0, n, &[1.0]))
}

#[tokio::test]
async fn raw_query_is_built_from_resolved_fields() {
    let cloud = Cloud::new(two_columns(5), one_column(0));
    let d = cloud.driver();
    let sel = [VariableSelector::new(SID, VID), VariableSelector::new(SID, VID_2)];

    let frame = d
        .fetch_buffer(&sel, TimeWindow::last(10_000.0), 2048)
        .await
        .unwrap();

    assert_eq!(frame.shape(), (5, 2));
    assert_eq!(frame.column(&VID.to_string()).unwrap().values[0], Some(1.0));
    assert_eq!(frame.column(&VID_2.to_string()).unwrap().values[0], Some(2.0));

    let raw = cloud.raw_queries();
    assert_eq!(raw.len(), 1);
    assert!(raw[0].contains(r#"columns: ["ts", "nanos", "f1", "f2"]"#), "{}", raw[0]);
    assert!(raw[0].contains(&format!("sid: \"{SID}\"")));
    #[allow(clippy::cast_possible_truncation)]
    let to = NOW_MS as i64;
    assert!(raw[0].contains(&format!("from: {}, to: {to}", to - 10_000)));
}

#[tokio::test]
async fn columns_follow_selector_order() {
    let cloud = Cloud::new(two_columns(3), one_column(0));
    let sel = [VariableSelector::new(SID, VID_2), VariableSelector::new(SID, VID)];
    let frame = cloud
        .driver()
        .fetch_buffer(&sel, TimeWindow::default(), 100)
        .await
        .unwrap();

    let expected = [VID_2.to_string(), VID.to_string()];
    assert_eq!(frame.column_names(), vec![expected[0].as_str(), expected[1].as_str()]);
    assert!(cloud.raw_queries()[0].contains(r#"["ts", "nanos", "f2", "f1"]"#));
}

#[tokio::test]
async fn cached_pairs_issue_no_structure_queries() {
    let cloud = Cloud::new(one_column(2), one_column(0));
    let d = cloud.driver();
    let sel = [VariableSelector::new(SID, VID)];

    d.fetch_buffer(&sel, TimeWindow::default(), 10).await.unwrap();
    d.fetch_buffer(&sel, TimeWindow::default(), 10).await.unwrap();
    d.fetch_buffer(&[VariableSelector::new(SID, VID_2)], TimeWindow::default(), 10)
        .await
        .unwrap();

    assert_eq!(cloud.mapping_queries(), 1);
    assert_eq!(cloud.raw_queries().len(), 3);
}

#[tokio::test]
async fn new_variable_on_cached_source_refreshes_once() {
    let cloud = Cloud::new(one_column(2), one_column(0));
    cloud.grow.store(false, Ordering::SeqCst);
    let d = cloud.driver();

    d.fetch_buffer(&[VariableSelector::new(SID, VID)], TimeWindow::default(), 10)
        .await
        .unwrap();
    assert_eq!(cloud.mapping_queries(), 1);

    cloud.grow.store(true, Ordering::SeqCst);
    d.fetch_buffer(&[VariableSelector::new(SID, VID_2)], TimeWindow::default(), 10)
        .await
        .unwrap();
    assert_eq!(cloud.mapping_queries(), 2);

    // the earlier entry survives the refresh
    let snap = d.field_cache().snapshot(&SID.to_string());
    assert_eq!(snap.fields.len(), 2);
    assert_eq!(snap.name, "bench");
}

#[tokio::test]
async fn unknown_variable_is_a_lookup_failure_after_one_refresh() {
    let cloud = Cloud::new(one_column(2), one_column(0));
    let d = cloud.driver();
    let ghost = Uuid::from_u128(0xdead);

    match d
        .fetch_buffer(&[VariableSelector::new(SID, ghost)], TimeWindow::default(), 10)
        .await
    {
        Err(GiDataError::LookupFailure { source_id, variable }) => {
            assert_eq!(source_id, SID.to_string());
            assert_eq!(variable, ghost);
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(cloud.mapping_queries(), 1);
    assert!(cloud.raw_queries().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_misses_share_one_refresh() {
    let mock = MockHttp::default().with_delay(Duration::from_millis(20));
    let cloud = Cloud::with_mock(mock, one_column(2), one_column(0));
    let d = Arc::new(cloud.driver());

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let d = Arc::clone(&d);
            tokio::spawn(async move {
                d.fetch_buffer(&[VariableSelector::new(SID, VID)], TimeWindow::default(), 10)
                    .await
            })
        })
        .collect();
    for t in tasks {
        t.await.unwrap().unwrap();
    }

    assert_eq!(cloud.mapping_queries(), 1);
    assert_eq!(d.field_cache().generation(&SID.to_string()), 1);
}

#[tokio::test]
async fn sources_are_queried_separately_and_outer_joined() {
    // SID rows at now-1000, -999, -998; SID_2 rows at now-999.5, -998.5
    let a = gql::raw_rows(&gql::raw_series(NOW_MS - 1_000.0, 1.0, 3, &[1.0]));
    let b = gql::raw_rows(&gql::raw_series(NOW_MS - 999.5, 1.0, 2, &[9.0]));
    let cloud = Cloud::new(a, b);
    let sel = [VariableSelector::new(SID_2, VID_3), VariableSelector::new(SID, VID)];

    let frame = cloud
        .driver()
        .fetch_buffer(&sel, TimeWindow::default(), 100)
        .await
        .unwrap();

    assert_eq!(cloud.raw_queries().len(), 2);
    assert_eq!(frame.shape(), (5, 2));
    assert_eq!(frame.column_names()[0], VID_3.to_string());
    assert!(frame.index().windows(2).all(|w| w[0] < w[1]));
    let vid = &frame.column(&VID.to_string()).unwrap().values;
    assert_eq!(vid, &vec![Some(1.0), None, Some(1.0), None, Some(1.0)]);
}

#[tokio::test]
async fn joined_frame_is_downsampled_to_points() {
    let cloud = Cloud::new(one_column(100), one_column(0));
    let frame = cloud
        .driver()
        .fetch_buffer(&[VariableSelector::new(SID, VID)], TimeWindow::default(), 10)
        .await
        .unwrap();
    assert_eq!(frame.len(), 10);
}

#[tokio::test]
async fn graphql_errors_are_surfaced() {
    let cloud = Cloud::new(gql::errors(&["column f1 unknown", "sid missing"]), one_column(0));
    match cloud
        .driver()
        .fetch_buffer(&[VariableSelector::new(SID, VID)], TimeWindow::default(), 10)
        .await
    {
        Err(GiDataError::Upstream(UpstreamError::GraphQl(errors))) => {
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[0].message, "column f1 unknown");
            assert_eq!(errors[0].path, vec!["Raw".to_string()]);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn invalid_requests_never_reach_the_backend() {
    let cloud = Cloud::new(one_column(1), one_column(0));
    let d = cloud.driver();
    assert!(matches!(
        d.fetch_buffer(&[], TimeWindow::default(), 10).await,
        Err(GiDataError::InvalidArg(_))
    ));
    assert!(matches!(
        d.fetch_buffer(&[VariableSelector::new(SID, VID)], TimeWindow::default(), 0)
            .await,
        Err(GiDataError::InvalidArg(_))
    ));
    assert!(cloud.mock.calls().is_empty());
}
