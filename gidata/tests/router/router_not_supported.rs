use gidata::{GiDataError, KafkaSubscription};
use gidata_mock::MockHttp;
use gidata_mock::fixtures::VID;

use crate::helpers::Rig;

#[tokio::test]
async fn kafka_without_a_factory_is_not_supported() {
    let rig = Rig::new(MockHttp::default());
    let gi = rig.local();

    match gi.stream_kafka(&[VID], &KafkaSubscription::default()).await {
        Err(GiDataError::NotSupported { capability }) => assert_eq!(capability, "stream-kafka"),
        other => panic!("unexpected: {other:?}"),
    }
    assert!(rig.kafka.subscriptions().is_empty());
}

#[tokio::test]
async fn roles_are_split_between_domains() {
    let rig = Rig::new(MockHttp::default());
    let gi = rig.local();

    assert!(gi.buffer_driver().as_measurement_provider().is_none());
    assert!(gi.buffer_driver().as_import_provider().is_none());
    assert!(gi.history_driver().as_online_provider().is_none());
    assert!(gi.history_driver().as_import_provider().is_some());

    match gi.read_online(&[]).await {
        Err(GiDataError::InvalidArg(_)) => {}
        other => panic!("unexpected: {other:?}"),
    }
}
