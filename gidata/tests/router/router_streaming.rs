use std::collections::BTreeMap;
use std::time::Duration;

use gidata::{Environment, GiDataError, KafkaSubscription, OnlineFunction, OnlineSubscription};
use gidata_mock::MockHttp;
use gidata_mock::fixtures::{VID, VID_2};

use crate::helpers::{Rig, tick};

#[tokio::test]
async fn websocket_is_created_lazily_and_shared() {
    let rig = Rig::new(MockHttp::default());
    let gi = rig.local();
    assert_eq!(rig.ws.connects(), 0);

    let mut stream = gi.stream_online(&[VID], OnlineSubscription::default()).await.unwrap();
    let mut peer = rig.peer().await;
    assert_eq!(peer.url, "ws://mock.local:8090/ws");
    assert_eq!(peer.bearer, "tok");
    let read = peer.next_sent_json().await.unwrap();
    assert_eq!(read["Function"], "read");

    let values = BTreeMap::from([(VID_2, 4.0)]);
    gi.publish_online(&values, OnlineFunction::Write).await.unwrap();
    let write = peer.next_sent_json().await.unwrap();
    assert_eq!(write["Function"], "write");
    assert_eq!(write["Values"][VID_2.to_string()], 4.0);

    peer.push_json(&tick(&[(VID, 1.0), (VID_2, 2.0)]));
    let update = stream.recv().await.unwrap();
    assert_eq!(update.get(&VID), Some(1.0));
    assert_eq!(update.get(&VID_2), None);

    assert_eq!(rig.ws.connects(), 1);
    stream.cancel().await;
}

#[tokio::test]
async fn close_drops_the_socket_and_the_next_call_reconnects() {
    let rig = Rig::new(MockHttp::default());
    let gi = rig.local();

    let mut stream = gi.stream_online(&[VID], OnlineSubscription::default()).await.unwrap();
    let peer = rig.peer().await;

    gi.close().await;
    assert!(peer.wait_closed(Duration::from_secs(1)).await);
    match stream.recv().await {
        Err(GiDataError::StreamClosed(_) | GiDataError::Cancelled) => {}
        other => panic!("unexpected: {other:?}"),
    }

    let values = BTreeMap::from([(VID, 1.0)]);
    gi.publish_online(&values, OnlineFunction::Write).await.unwrap();
    assert_eq!(rig.ws.connects(), 2);
}

#[tokio::test]
async fn close_without_a_socket_is_a_no_op() {
    let rig = Rig::new(MockHttp::default());
    rig.local().close().await;
    assert_eq!(rig.ws.connects(), 0);
}

#[tokio::test]
async fn kafka_streams_through_the_injected_factory() {
    let rig = Rig::new(MockHttp::default());
    let gi = rig.with_kafka(Environment::Cloud);

    let mut stream = gi
        .stream_kafka(&[VID], &KafkaSubscription::default())
        .await
        .unwrap();
    let subs = rig.kafka.subscriptions();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].brokers, "mock.local:9092");
    assert_eq!(subs[0].bearer.as_deref(), Some("tok"));

    rig.kafka.push_json(&tick(&[(VID, 6.5)])).await;
    assert_eq!(stream.recv().await.unwrap().get(&VID), Some(6.5));

    stream.cancel().await;
    assert_eq!(rig.kafka.released(), 1);
}
