use std::sync::Arc;

use gidata::{
    Capability, Environment, GiData, GiDataError, KafkaSubscription, StaticCredentials,
};
use gidata_core::HttpTransport;
use gidata_core::consumer::KafkaConsumerFactory;
use gidata_mock::MockHttp;
use gidata_mock::fixtures::VID;

use crate::helpers::Rig;

#[test]
fn base_url_must_be_absolute_http() {
    for bad in ["", "not a url", "ftp://host:21", "ws://host:8090", "file:///tmp/x"] {
        match GiData::builder().base_url(bad).build() {
            Err(GiDataError::InvalidArg(_)) => {}
            Err(other) => panic!("unexpected error for {bad:?}: {other:?}"),
            Ok(_) => panic!("{bad:?} was accepted"),
        }
    }
}

#[test]
fn environment_follows_the_credentials_unless_forced() {
    let cloud = GiData::builder()
        .base_url("https://tenant.gi.cloud")
        .with_credentials(Arc::new(StaticCredentials::cloud("jwt")))
        .build()
        .unwrap();
    assert_eq!(cloud.environment(), Environment::Cloud);
    assert_eq!(cloud.buffer_driver().name(), "gidata-cloud");

    let local = GiData::builder()
        .base_url("http://10.1.50.36:8090")
        .build()
        .unwrap();
    assert_eq!(local.environment(), Environment::Local);

    let forced = GiData::builder()
        .base_url("https://tenant.gi.cloud")
        .with_credentials(Arc::new(StaticCredentials::cloud("jwt")))
        .environment(Environment::Local)
        .build()
        .unwrap();
    assert_eq!(forced.environment(), Environment::Local);
}

fn driver_family(env: Environment) -> &'static str {
    match env {
        Environment::Local => "rest",
        Environment::Cloud => "graphql",
    }
}

#[test]
fn environments_can_be_matched_exhaustively() {
    assert_eq!(driver_family(Environment::default()), "rest");
    assert_eq!(driver_family(Environment::Cloud), "graphql");
}

#[tokio::test]
async fn access_token_follows_an_environment_set_afterwards() {
    let rig = Rig::new(MockHttp::default());
    let http: Arc<dyn HttpTransport> = rig.http.clone();
    let factory: Arc<dyn KafkaConsumerFactory> = rig.kafka.clone();
    let build = |env: Environment| {
        GiData::builder()
            .base_url(rig.http.base_url())
            .access_token("tok")
            .environment(env)
            .with_transport(Arc::clone(&http))
            .with_kafka_factory(Arc::clone(&factory))
            .build()
            .unwrap()
    };

    let cloud = build(Environment::Cloud);
    assert_eq!(cloud.buffer_driver().name(), "gidata-cloud");
    let mut stream = cloud
        .stream_kafka(&[VID], &KafkaSubscription::default())
        .await
        .unwrap();
    assert_eq!(rig.kafka.subscriptions()[0].bearer.as_deref(), Some("tok"));
    stream.cancel().await;

    let local = build(Environment::Local);
    let mut stream = local
        .stream_kafka(&[VID], &KafkaSubscription::default())
        .await
        .unwrap();
    assert_eq!(rig.kafka.subscriptions()[1].bearer, None);
    stream.cancel().await;
}

#[test]
fn the_last_credential_source_wins() {
    let token_last = GiData::builder()
        .base_url("https://tenant.gi.cloud")
        .with_credentials(Arc::new(StaticCredentials::cloud("jwt")))
        .access_token("tok")
        .build()
        .unwrap();
    assert_eq!(token_last.environment(), Environment::Local);

    let manager_last = GiData::builder()
        .base_url("https://tenant.gi.cloud")
        .access_token("tok")
        .with_credentials(Arc::new(StaticCredentials::cloud("jwt")))
        .build()
        .unwrap();
    assert_eq!(manager_last.environment(), Environment::Cloud);
}

#[test]
fn builder_settings_are_reported_back() {
    let gi = Rig::new(MockHttp::default())
        .builder(Environment::Local)
        .default_points(512)
        .build()
        .unwrap();
    assert_eq!(gi.default_points(), 512);
    assert_eq!(gi.config().base_url, "http://mock.local:8090");
}

#[test]
fn capabilities_combine_both_domains_and_streaming() {
    let rig = Rig::new(MockHttp::default());

    let caps = rig.local().capabilities();
    for c in [
        Capability::Online,
        Capability::Structure,
        Capability::Buffer,
        Capability::History,
        Capability::Measurements,
        Capability::Export,
        Capability::Import,
        Capability::StreamOnline,
        Capability::PublishOnline,
    ] {
        assert!(caps.contains(&c), "missing {c:?}");
    }
    assert!(!caps.contains(&Capability::StreamKafka));
    assert_eq!(caps.iter().filter(|c| **c == Capability::Structure).count(), 1);

    assert!(rig.with_kafka(Environment::Cloud).capabilities().contains(&Capability::StreamKafka));
}
