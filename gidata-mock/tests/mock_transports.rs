use std::time::Duration;

use gidata_core::consumer::{KafkaConsumerFactory, KafkaSettings};
use gidata_core::socket::WsConnector;
use gidata_core::{Clock, GiDataError, HttpRequest, HttpTransport, Method, UpstreamError};
use gidata_mock::{FixedClock, MockHttp, MockKafka, MockWs};

#[tokio::test]
async fn http_routes_match_in_order_and_by_prefix() {
    let mock = MockHttp::default()
        .on_json(Method::Get, "/buffer/structure/sources", serde_json::json!({"Data": []}))
        .on_json(Method::Get, "/buffer/*", serde_json::json!({"prefix": true}));

    let exact = mock
        .send(HttpRequest::new(Method::Get, "/buffer/structure/sources"))
        .await
        .unwrap();
    assert_eq!(exact.text(), r#"{"Data":[]}"#);

    let prefixed = mock
        .send(HttpRequest::new(Method::Get, "/buffer/other"))
        .await
        .unwrap();
    assert!(prefixed.text().contains("prefix"));

    match mock.send(HttpRequest::new(Method::Delete, "/nope")).await {
        Err(GiDataError::Upstream(UpstreamError::Status { status, .. })) => {
            assert_eq!(status, 404);
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(mock.calls().len(), 3);
    assert_eq!(mock.count_prefix(Method::Get, "/buffer/"), 2);
}

#[tokio::test]
async fn ws_peer_sees_client_frames_and_close() {
    let ws = MockWs::new();
    let (mut sink, mut source) = ws.connect("ws://dev/ws", "tok").await.unwrap();
    let mut peer = ws.accept().await.expect("peer");
    assert_eq!(peer.bearer, "tok");

    sink.send_text("hello".into()).await.unwrap();
    assert_eq!(peer.next_sent().await.as_deref(), Some("hello"));

    peer.push(r#"{"Values":{}}"#);
    assert!(source.next_text().await.unwrap().is_ok());

    peer.drop_connection();
    assert!(source.next_text().await.is_none());

    sink.close().await.unwrap();
    assert!(peer.wait_closed(Duration::from_millis(100)).await);
    assert_eq!(ws.connects(), 1);

    ws.refuse_connections(true);
    assert!(ws.connect("ws://dev/ws", "tok").await.is_err());
}

#[tokio::test]
async fn kafka_fans_out_and_counts_releases() {
    let kafka = MockKafka::new();
    let settings = KafkaSettings {
        brokers: "localhost:9092".into(),
        topics: vec!["online".into()],
        group_id: "g".into(),
        ssl: false,
        bearer: None,
    };
    let (handle, mut rx) = kafka.subscribe(&settings).await.unwrap();
    kafka.push(b"payload".to_vec()).await;
    assert_eq!(rx.recv().await.unwrap().unwrap(), b"payload");

    handle.stop().await;
    assert_eq!(kafka.released(), 1);
    assert_eq!(kafka.subscriptions(), vec![settings.clone()]);

    kafka.fail_with(GiDataError::connection("brokers down"));
    assert!(kafka.subscribe(&settings).await.is_err());
}

#[test]
fn fixed_clock_moves_only_when_told() {
    let clock = FixedClock::new(1_000.0);
    assert_eq!(clock.now_ms(), 1_000.0);
    clock.advance(500.0);
    assert_eq!(clock.now_ms(), 1_500.0);
    clock.set(10.0);
    assert_eq!(clock.now_ms(), 10.0);
}
