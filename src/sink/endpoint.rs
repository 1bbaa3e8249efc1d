//! Push and pull halves of a sink's delivery queue.
//!
//! Sources push through `SinkEndpoint` from any number of tasks; consumers
//! pull through `NotificationReceiver`. The queue is an unbounded tokio mpsc
//! channel, so a push never waits and a pull waits without spinning.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::RpcError;
use crate::notification::Notification;
use crate::source::SinkHandle;

/// Generate a process-unique sink id.
pub fn generate_sink_id() -> String {
    format!("sink-{}", Uuid::new_v4())
}

/// Create a linked endpoint/receiver pair with a fresh id.
pub fn delivery_queue<E: Send + 'static>() -> (SinkEndpoint<E>, NotificationReceiver<E>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let endpoint = SinkEndpoint {
        id: generate_sink_id(),
        queue: sender,
    };
    let receiver = NotificationReceiver {
        queue: Arc::new(Mutex::new(receiver)),
    };
    (endpoint, receiver)
}

/// Remotely addressable side of a sink.
pub struct SinkEndpoint<E> {
    id: String,
    queue: mpsc::UnboundedSender<E>,
}

#[async_trait]
impl<E: Send + 'static> SinkHandle<E> for SinkEndpoint<E> {
    fn id(&self) -> &str {
        &self.id
    }

    async fn notify_of_event(&self, notification: Notification<E>) -> Result<bool, RpcError> {
        let notification_id = notification.id();
        match self.queue.send(notification.into_event()) {
            Ok(()) => {
                debug!(
                    sink_id = %self.id,
                    notification_id = %notification_id,
                    "Event queued"
                );
                Ok(true)
            }
            Err(_) => {
                // Every receiver is gone, nobody can ever take this event
                warn!(
                    sink_id = %self.id,
                    notification_id = %notification_id,
                    "Delivery queue closed, event not accepted"
                );
                Ok(false)
            }
        }
    }
}

/// Consumer side of a sink's delivery queue.
///
/// Cheap to clone; clones share the same queue, and each event is handed to
/// exactly one caller.
pub struct NotificationReceiver<E> {
    queue: Arc<Mutex<mpsc::UnboundedReceiver<E>>>,
}

impl<E> Clone for NotificationReceiver<E> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<E: Send + 'static> NotificationReceiver<E> {
    /// Wait for the oldest queued event and remove it.
    ///
    /// Cancel-safe: dropping the returned future before it completes leaves
    /// every queued event in place. Returns `None` only once the queue is
    /// closed and drained.
    pub async fn take(&self) -> Option<E> {
        let mut queue = self.queue.lock().await;
        queue.recv().await
    }

    /// Remove the oldest event if one is ready right now.
    ///
    /// Returns `None` if the queue is empty or another consumer is currently
    /// waiting on it.
    pub fn try_take(&self) -> Option<E> {
        let mut queue = self.queue.try_lock().ok()?;
        queue.try_recv().ok()
    }

    /// Like `take`, but gives up after `timeout`.
    pub async fn take_timeout(&self, timeout: Duration) -> Option<E> {
        tokio::time::timeout(timeout, self.take())
            .await
            .ok()
            .flatten()
    }
}
