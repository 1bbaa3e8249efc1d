//! topic-notify-demo: In-process news feed
//!
//! Binds one source per catalogued news topic, subscribes a sink to the
//! topics named on the command line, publishes a headline on every topic and
//! prints the headlines the sink receives.
//!
//! ## Architecture
//! ```text
//! [NotificationSource x8] --bind--> [InMemoryDirectory] <--resolve-- [NotificationSink]
//!          |                                                              ^
//!          +---------------------- notify_of_event -----------------------+
//!                                                                         |
//!                                                        consumer task ---+--> stdout
//! ```
//!
//! ## Configuration
//! - TOPIC_NOTIFY_CONFIG: Path to a YAML config file (optional)
//! - TOPIC_NOTIFY__*: Overrides for individual config keys
//! - TOPIC_NOTIFY_LOG: Log filter (default: info)
//!
//! Usage: `topic-notify-demo [topic-code ...]` (default: sport technology)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use topic_notify::catalog::{colour_from_topic, NewsTopic};
use topic_notify::config::Config;
use topic_notify::utils::bootstrap::init_tracing;
use topic_notify::{
    Directory, InMemoryDirectory, Notification, NotificationSink, NotificationSource,
    SourceHandle, Topic,
};

const DEFAULT_TOPICS: [NewsTopic; 2] = [NewsTopic::Sport, NewsTopic::Technology];
const IDLE_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
struct Headline {
    topic: Topic,
    title: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::load(None)?;
    let prefix = config.directory.prefix.clone();

    let directory = Arc::new(InMemoryDirectory::<Headline>::new());
    let mut sources = HashMap::new();
    for news_topic in NewsTopic::ALL {
        let topic = news_topic.topic();
        let source = Arc::new(NotificationSource::from_config(
            topic.clone(),
            &config.source,
        ));
        directory.bind_topic(&prefix, &topic, source.clone()).await?;
        sources.insert(topic, source);
    }
    info!(sources = sources.len(), prefix = %prefix, "topic-notify-demo started");

    let requested: Vec<Topic> = std::env::args().skip(1).map(Topic::from).collect();
    let requested = if requested.is_empty() {
        DEFAULT_TOPICS.iter().map(NewsTopic::topic).collect()
    } else {
        requested
    };

    let mut sink =
        NotificationSink::from_config(directory.clone() as Arc<dyn Directory<Headline>>, &config);
    let mut deferred = Vec::new();
    for topic in &requested {
        match sink.register_to_source(topic).await {
            Ok(()) => {}
            Err(e) if e.is_retryable() => {
                warn!(topic = %topic, error = %e, "Source not reachable yet, deferring");
                deferred.push(topic.clone());
            }
            Err(e) => warn!(topic = %topic, error = %e, "Skipping topic"),
        }
    }
    for topic in &deferred {
        if let Err(e) = sink.register_to_source(topic).await {
            warn!(topic = %topic, error = %e, "Giving up on topic");
        }
    }

    let receiver = sink.receiver();
    let consumer = tokio::spawn(async move {
        let mut received = 0usize;
        while let Some(headline) = receiver.take_timeout(IDLE_TIMEOUT).await {
            let colour = colour_from_topic(&headline.topic)
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("[{}] {:<20} {}", colour, headline.topic.code(), headline.title);
            received += 1;
        }
        received
    });

    for (topic, source) in &sources {
        let headline = Headline {
            topic: topic.clone(),
            title: format!("Breaking news in {}", topic),
        };
        let report = source.publish(Notification::new(headline)).await?;
        info!(
            topic = %topic,
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "Published headline"
        );
    }

    let received = consumer.await?;
    info!(
        received,
        subscriptions = sink.subscriptions().len(),
        "Feed drained"
    );

    sink.unsubscribe_all().await?;
    Ok(())
}
