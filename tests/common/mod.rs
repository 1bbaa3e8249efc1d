//! Shared utilities for integration tests.
//!
//! Provides a news-feed fixture wired through the public API.

use std::collections::HashMap;
use std::sync::Arc;

use topic_notify::catalog::NewsTopic;
use topic_notify::utils::retry::RetryConfig;
use topic_notify::{
    Directory, InMemoryDirectory, NotificationSink, NotificationSource, SourceHandle, Topic,
};

/// Address prefix used by every fixture.
pub const PREFIX: &str = "//feed.test/";

/// Event carried by the fixture feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub topic: String,
    pub title: String,
}

impl Headline {
    pub fn new(topic: &Topic, title: &str) -> Self {
        Self {
            topic: topic.code().to_string(),
            title: title.to_string(),
        }
    }
}

/// One bound source per catalogued topic.
pub struct Feed {
    pub directory: Arc<InMemoryDirectory<Headline>>,
    pub sources: HashMap<Topic, Arc<NotificationSource<Headline>>>,
}

impl Feed {
    pub async fn new() -> Self {
        let directory = Arc::new(InMemoryDirectory::new());
        let mut sources = HashMap::new();
        for news_topic in NewsTopic::ALL {
            let topic = news_topic.topic();
            let source = Arc::new(NotificationSource::new(topic.clone()));
            directory
                .bind_topic(PREFIX, &topic, source.clone())
                .await
                .expect("catalog topics form valid addresses");
            sources.insert(topic, source);
        }
        Self { directory, sources }
    }

    pub fn source(&self, news_topic: NewsTopic) -> &Arc<NotificationSource<Headline>> {
        &self.sources[&news_topic.topic()]
    }

    /// A sink on this feed that retries without waiting.
    pub fn sink(&self) -> NotificationSink<Headline> {
        let directory: Arc<dyn Directory<Headline>> = self.directory.clone();
        NotificationSink::new(directory, PREFIX).with_retry(RetryConfig::immediate(3))
    }

    /// Publish one headline on a topic and return how many sinks took it.
    pub async fn publish(&self, news_topic: NewsTopic, title: &str) -> usize {
        let source = self.source(news_topic);
        let report = source
            .publish(topic_notify::Notification::new(Headline::new(
                source.owned_topic(),
                title,
            )))
            .await
            .expect("local publish does not fail");
        report.delivered.len()
    }
}
