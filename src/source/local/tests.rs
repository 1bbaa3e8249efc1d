use super::*;
use crate::test_utils::{RecordingSink, StalledSink, UnreachableSink};

fn sport_source() -> NotificationSource<String> {
    NotificationSource::new(Topic::new("sport"))
}

#[tokio::test]
async fn test_publish_no_sinks() {
    let source = sport_source();

    let report = source
        .publish(Notification::new("kick-off".to_string()))
        .await
        .unwrap();

    assert_eq!(report.attempted(), 0);
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_publish_reaches_every_registered_sink() {
    let source = sport_source();
    let a = Arc::new(RecordingSink::<String>::new("a"));
    let b = Arc::new(RecordingSink::<String>::new("b"));
    source.register(a.clone()).await.unwrap();
    source.register(b.clone()).await.unwrap();

    let report = source
        .publish(Notification::new("goal".to_string()))
        .await
        .unwrap();

    let mut delivered = report.delivered.clone();
    delivered.sort();
    assert_eq!(delivered, vec!["a", "b"]);
    assert_eq!(a.events().await, vec!["goal"]);
    assert_eq!(b.events().await, vec!["goal"]);
}

#[tokio::test]
async fn test_register_same_id_twice_keeps_one_entry() {
    let source = sport_source();
    let first = Arc::new(RecordingSink::<String>::new("dup"));
    let second = Arc::new(RecordingSink::<String>::new("dup"));

    source.register(first.clone()).await.unwrap();
    source.register(second.clone()).await.unwrap();
    assert_eq!(source.sink_count().await, 1);

    source
        .publish(Notification::new("once".to_string()))
        .await
        .unwrap();

    // Replacement: only the latest reference is stored
    assert_eq!(first.count().await, 0);
    assert_eq!(second.events().await, vec!["once"]);
}

#[tokio::test]
async fn test_unregister_absent_id_is_noop() {
    let source = sport_source();
    source.unregister("never-registered").await.unwrap();

    let sink = Arc::new(RecordingSink::<String>::new("s1"));
    source.register(sink).await.unwrap();
    source.unregister("s1").await.unwrap();
    source.unregister("s1").await.unwrap();

    assert!(!source.is_registered("s1").await);
    assert_eq!(source.sink_count().await, 0);
}

#[tokio::test]
async fn test_late_joiner_misses_earlier_publish() {
    let source = sport_source();
    let early = Arc::new(RecordingSink::<String>::new("early"));
    source.register(early.clone()).await.unwrap();

    source
        .publish(Notification::new("first".to_string()))
        .await
        .unwrap();

    let late = Arc::new(RecordingSink::<String>::new("late"));
    source.register(late.clone()).await.unwrap();
    source
        .publish(Notification::new("second".to_string()))
        .await
        .unwrap();

    assert_eq!(early.events().await, vec!["first", "second"]);
    assert_eq!(late.events().await, vec!["second"]);
}

#[tokio::test]
async fn test_unreachable_sink_does_not_block_others() {
    let source = sport_source();
    let healthy = Arc::new(RecordingSink::<String>::new("healthy"));
    source.register(healthy.clone()).await.unwrap();
    source
        .register(Arc::new(UnreachableSink::new("gone")))
        .await
        .unwrap();

    let report = source
        .publish(Notification::new("score".to_string()))
        .await
        .unwrap();

    assert_eq!(report.delivered, vec!["healthy"]);
    assert_eq!(report.failed, vec!["gone"]);
    assert_eq!(healthy.events().await, vec!["score"]);
}

#[tokio::test]
async fn test_stalled_sink_times_out() {
    let source = sport_source().with_delivery_timeout(Duration::from_millis(50));
    let healthy = Arc::new(RecordingSink::<String>::new("healthy"));
    source.register(healthy.clone()).await.unwrap();
    source
        .register(Arc::new(StalledSink::new("stuck")))
        .await
        .unwrap();

    let report = tokio::time::timeout(
        Duration::from_secs(2),
        source.publish(Notification::new("late whistle".to_string())),
    )
    .await
    .expect("publish must not hang on a stalled sink")
    .unwrap();

    assert_eq!(report.delivered, vec!["healthy"]);
    assert_eq!(report.failed, vec!["stuck"]);
}

#[tokio::test]
async fn test_topic_and_sink_ids() {
    let source = sport_source();
    assert_eq!(source.topic().await.unwrap(), Topic::new("sport"));
    assert_eq!(source.owned_topic().code(), "sport");

    source
        .register(Arc::new(RecordingSink::<String>::new("b")))
        .await
        .unwrap();
    source
        .register(Arc::new(RecordingSink::<String>::new("a")))
        .await
        .unwrap();
    assert_eq!(source.sink_ids().await, vec!["a", "b"]);
}

#[tokio::test]
async fn test_from_config_uses_delivery_timeout() {
    let config = SourceConfig {
        delivery_timeout_ms: 40,
    };
    let source = NotificationSource::<String>::from_config(Topic::new("sport"), &config);
    source
        .register(Arc::new(StalledSink::new("stuck")))
        .await
        .unwrap();

    let report = tokio::time::timeout(
        Duration::from_secs(2),
        source.publish(Notification::new("whistle".to_string())),
    )
    .await
    .expect("configured timeout must bound the push")
    .unwrap();

    assert_eq!(report.failed, vec!["stuck"]);
}
