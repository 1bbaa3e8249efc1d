//! Reference source implementation.
//!
//! Keeps the registration set in memory and fans each published notification
//! out to every registered sink concurrently. Each delivery is bounded by a
//! timeout so one stalled or unreachable sink cannot hold up the others.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{PublishReport, Result, SinkHandle, SourceHandle};
use crate::config::SourceConfig;
use crate::notification::Notification;
use crate::topic::Topic;

/// Default bound on a single push to a single sink.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Source owning one topic.
///
/// Registering an id that is already present replaces the stored sink
/// reference, so the set never holds more than one entry per id.
pub struct NotificationSource<E: Send + 'static> {
    topic: Topic,
    sinks: RwLock<HashMap<String, Arc<dyn SinkHandle<E>>>>,
    delivery_timeout: Duration,
}

impl<E> NotificationSource<E>
where
    E: Clone + Send + Sync + 'static,
{
    pub fn new(topic: Topic) -> Self {
        Self {
            topic,
            sinks: RwLock::new(HashMap::new()),
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }

    /// Create a source using the delivery timeout from config.
    pub fn from_config(topic: Topic, config: &SourceConfig) -> Self {
        Self::new(topic).with_delivery_timeout(config.delivery_timeout())
    }

    /// Override the per-sink delivery timeout.
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// The owned topic, without going through a remote call.
    pub fn owned_topic(&self) -> &Topic {
        &self.topic
    }

    pub async fn sink_count(&self) -> usize {
        self.sinks.read().await.len()
    }

    pub async fn is_registered(&self, sink_id: &str) -> bool {
        self.sinks.read().await.contains_key(sink_id)
    }

    /// Ids of all registered sinks, sorted.
    pub async fn sink_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sinks.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl<E> SourceHandle<E> for NotificationSource<E>
where
    E: Clone + Send + Sync + 'static,
{
    async fn register(&self, sink: Arc<dyn SinkHandle<E>>) -> Result<()> {
        let sink_id = sink.id().to_string();
        let replaced = self
            .sinks
            .write()
            .await
            .insert(sink_id.clone(), sink)
            .is_some();

        info!(
            topic = %self.topic,
            sink_id = %sink_id,
            replaced,
            "Sink registered"
        );
        Ok(())
    }

    async fn unregister(&self, sink_id: &str) -> Result<()> {
        let removed = self.sinks.write().await.remove(sink_id).is_some();
        if removed {
            info!(topic = %self.topic, sink_id = %sink_id, "Sink unregistered");
        } else {
            debug!(topic = %self.topic, sink_id = %sink_id, "Unregister for unknown sink ignored");
        }
        Ok(())
    }

    #[tracing::instrument(name = "source.publish", skip_all, fields(topic = %self.topic, notification_id = %notification.id()))]
    async fn publish(&self, notification: Notification<E>) -> Result<PublishReport> {
        // Snapshot under the read lock, release before any remote call
        let targets: Vec<(String, Arc<dyn SinkHandle<E>>)> = {
            let guard = self.sinks.read().await;
            guard
                .iter()
                .map(|(id, sink)| (id.clone(), Arc::clone(sink)))
                .collect()
        };

        let timeout = self.delivery_timeout;
        let deliveries = targets.into_iter().map(|(sink_id, sink)| {
            let notification = notification.clone();
            async move {
                let outcome = tokio::time::timeout(timeout, sink.notify_of_event(notification)).await;
                (sink_id, outcome)
            }
        });

        let mut report = PublishReport::default();
        for (sink_id, outcome) in join_all(deliveries).await {
            match outcome {
                Ok(Ok(true)) => report.delivered.push(sink_id),
                Ok(Ok(false)) => {
                    warn!(sink_id = %sink_id, "Sink did not accept notification");
                    report.rejected.push(sink_id);
                }
                Ok(Err(e)) => {
                    warn!(sink_id = %sink_id, error = %e, "Delivery to sink failed");
                    report.failed.push(sink_id);
                }
                Err(_) => {
                    warn!(sink_id = %sink_id, timeout = ?timeout, "Delivery to sink timed out");
                    report.failed.push(sink_id);
                }
            }
        }

        debug!(
            delivered = report.delivered.len(),
            rejected = report.rejected.len(),
            failed = report.failed.len(),
            "Notification fanned out"
        );

        Ok(report)
    }

    async fn topic(&self) -> Result<Topic> {
        Ok(self.topic.clone())
    }
}

#[cfg(test)]
mod tests;
