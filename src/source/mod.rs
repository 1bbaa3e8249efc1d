//! Source side of the protocol.
//!
//! This module contains:
//! - `SinkHandle` trait: the push entry point a source calls on each sink
//! - `SourceHandle` trait: registration and publish calls a sink makes on a source
//! - `PublishReport`: per-sink outcome of one fan-out
//! - `NotificationSource`: registration set plus isolated fan-out
//!
//! Every call through a handle may fail with `RpcError`, independent of the
//! application logic on the far side.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RpcError;
use crate::notification::Notification;
use crate::topic::Topic;

mod local;

pub use local::{NotificationSource, DEFAULT_DELIVERY_TIMEOUT};

/// Result type for remote calls.
pub type Result<T> = std::result::Result<T, RpcError>;

/// Remotely invocable endpoint of a sink.
#[async_trait]
pub trait SinkHandle<E: Send + 'static>: Send + Sync {
    /// Process-unique id, stable for the sink's lifetime.
    fn id(&self) -> &str;

    /// Push one notification to the sink.
    ///
    /// `Ok(true)` means the event was queued and will be handed out exactly
    /// once. `Ok(false)` means the sink could not accept it.
    async fn notify_of_event(&self, notification: Notification<E>) -> Result<bool>;
}

/// Remote reference to a source.
///
/// `register` and `unregister` must be idempotent per sink id: a sink may
/// repeat either call after a failure whose acknowledgement was lost.
#[async_trait]
pub trait SourceHandle<E: Send + 'static>: Send + Sync {
    /// Add a sink to the registration set, keyed by its id.
    async fn register(&self, sink: Arc<dyn SinkHandle<E>>) -> Result<()>;

    /// Remove the sink with this id. Absent ids are a no-op.
    async fn unregister(&self, sink_id: &str) -> Result<()>;

    /// Deliver a notification to every sink registered at the moment of fan-out.
    async fn publish(&self, notification: Notification<E>) -> Result<PublishReport>;

    /// The topic this source owns.
    async fn topic(&self) -> Result<Topic>;
}

/// Outcome of a single publish, by sink id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Sinks that queued the event.
    pub delivered: Vec<String>,
    /// Sinks that answered but did not queue the event.
    pub rejected: Vec<String>,
    /// Sinks that failed or timed out.
    pub failed: Vec<String>,
}

impl PublishReport {
    /// Number of sinks the fan-out targeted.
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.rejected.len() + self.failed.len()
    }

    /// True if every targeted sink queued the event.
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty() && self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_report_counts() {
        let report = PublishReport {
            delivered: vec!["a".to_string(), "b".to_string()],
            rejected: vec![],
            failed: vec!["c".to_string()],
        };
        assert_eq!(report.attempted(), 3);
        assert!(!report.is_complete());

        assert!(PublishReport::default().is_complete());
        assert_eq!(PublishReport::default().attempted(), 0);
    }
}
