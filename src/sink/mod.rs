//! Notification sink.
//!
//! A sink subscribes itself to sources through the directory, receives pushed
//! notifications on its endpoint, and buffers the events for local consumers.
//!
//! ## Lifecycle
//! ```text
//! register_to_source(topic)
//!     │
//!     ├──► directory.resolve(prefix + code) ──► source.register(endpoint)
//!     │        └── transient failure: retry, up to max_retries more attempts
//!     └──► topic added to subscriptions
//!
//! source.publish(n) ──► endpoint.notify_of_event(n) ──► queue ──► take_notification()
//! ```
//!
//! Lifecycle calls take `&mut self`, so calls on one sink are serialised by
//! the borrow checker. Consumers that run on other tasks pull through a
//! cloned [`NotificationReceiver`].

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use backon::Retryable;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::directory::{validate_address, Directory};
use crate::error::{NotifyError, ResolveError, Result, RpcError};
use crate::source::SinkHandle;
use crate::topic::Topic;
use crate::utils::retry::RetryConfig;

mod endpoint;

pub use endpoint::{delivery_queue, generate_sink_id, NotificationReceiver, SinkEndpoint};

/// Default directory address prefix.
pub const DEFAULT_ADDRESS_PREFIX: &str = "//localhost/";

/// Failure of a single resolve+call attempt.
#[derive(Debug)]
enum AttemptError {
    Resolve(ResolveError),
    Rpc(RpcError),
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptError::Resolve(e) => write!(f, "{}", e),
            AttemptError::Rpc(e) => write!(f, "{}", e),
        }
    }
}

impl AttemptError {
    /// Registration retries any failure to find or reach the source.
    fn retry_on_register(&self) -> bool {
        matches!(
            self,
            AttemptError::Resolve(ResolveError::NotBound(_) | ResolveError::Unavailable(_))
                | AttemptError::Rpc(RpcError::Connectivity(_))
        )
    }

    /// Teardown retries only connectivity; a missing source is final.
    fn retry_on_unsubscribe(&self) -> bool {
        matches!(
            self,
            AttemptError::Resolve(ResolveError::Unavailable(_))
                | AttemptError::Rpc(RpcError::Connectivity(_))
        )
    }
}

/// Sink endpoint plus subscription bookkeeping.
pub struct NotificationSink<E: Send + 'static> {
    endpoint: Arc<SinkEndpoint<E>>,
    receiver: NotificationReceiver<E>,
    topics: HashSet<Topic>,
    directory: Arc<dyn Directory<E>>,
    prefix: String,
    retry: RetryConfig,
}

impl<E: Send + 'static> NotificationSink<E> {
    /// Create a sink with a fresh id and the default retry policy.
    pub fn new(directory: Arc<dyn Directory<E>>, prefix: impl Into<String>) -> Self {
        let (endpoint, receiver) = delivery_queue();
        let sink = Self {
            endpoint: Arc::new(endpoint),
            receiver,
            topics: HashSet::new(),
            directory,
            prefix: prefix.into(),
            retry: RetryConfig::default(),
        };
        info!(sink_id = %sink.id(), prefix = %sink.prefix, "Notification sink created");
        sink
    }

    /// Create a sink using the directory prefix and retry policy from config.
    pub fn from_config(directory: Arc<dyn Directory<E>>, config: &Config) -> Self {
        Self::new(directory, config.directory.prefix.clone()).with_retry(config.retry.clone())
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn id(&self) -> &str {
        self.endpoint.id()
    }

    /// The reference sources store and push to.
    pub fn endpoint(&self) -> Arc<dyn SinkHandle<E>> {
        Arc::clone(&self.endpoint) as Arc<dyn SinkHandle<E>>
    }

    /// Handle for consumers running on other tasks.
    pub fn receiver(&self) -> NotificationReceiver<E> {
        self.receiver.clone()
    }

    /// Topics this sink believes it is registered to.
    pub fn subscriptions(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.topics.iter().cloned().collect();
        topics.sort();
        topics
    }

    pub fn is_subscribed(&self, topic: &Topic) -> bool {
        self.topics.contains(topic)
    }

    /// Subscribe to the source owning `topic`.
    ///
    /// Resolution failures and connectivity failures retry the whole
    /// resolve+register sequence. A malformed topic is rejected before the
    /// directory is contacted; any other failure is returned at once. On
    /// failure the topic leaves the subscription set.
    #[tracing::instrument(name = "sink.register", skip_all, fields(topic = %topic, sink_id = %self.id()))]
    pub async fn register_to_source(&mut self, topic: &Topic) -> Result<()> {
        let result = self.try_register(topic).await;
        match &result {
            Ok(()) => self.topics.insert(topic.clone()),
            Err(_) => self.topics.remove(topic),
        };
        result
    }

    async fn try_register(&self, topic: &Topic) -> Result<()> {
        let address = topic.address(&self.prefix);
        if let Err(e) = validate_address(&address) {
            warn!(error = %e, "Topic does not form a valid address");
            return Err(NotifyError::InvalidTopic(topic.code().to_string()));
        }
        let attempts = AtomicU32::new(0);

        let this = self;
        let address_ref = address.as_str();
        let attempts_ref = &attempts;
        let outcome = (move || async move {
            attempts_ref.fetch_add(1, Ordering::SeqCst);
            let source = this
                .directory
                .resolve(address_ref)
                .await
                .map_err(AttemptError::Resolve)?;
            source
                .register(this.endpoint())
                .await
                .map_err(AttemptError::Rpc)
        })
        .retry(self.retry.backoff())
        .when(AttemptError::retry_on_register)
        .notify(|e: &AttemptError, delay: Duration| {
            warn!(
                address = %address,
                attempt = attempts.load(Ordering::SeqCst),
                error = %e,
                delay = ?delay,
                "Registration attempt failed, retrying"
            );
        })
        .await;

        let attempts = attempts.into_inner();
        match outcome {
            Ok(()) => {
                info!(attempts, "Registered to source");
                Ok(())
            }
            Err(e) if e.retry_on_register() => {
                error!(attempts, error = %e, "Giving up on registration");
                Err(NotifyError::Connectivity {
                    topic: topic.code().to_string(),
                    attempts,
                })
            }
            Err(AttemptError::Resolve(ResolveError::Malformed(reason))) => {
                warn!(reason = %reason, "Topic does not form a valid address");
                Err(NotifyError::InvalidTopic(topic.code().to_string()))
            }
            Err(e) => {
                error!(error = %e, "Registration failed unexpectedly");
                Err(NotifyError::Unexpected {
                    topic: topic.code().to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Unsubscribe from the source owning `topic`.
    ///
    /// A missing or malformed topic fails at once; connectivity failures are
    /// retried. On success the topic leaves the subscription set.
    #[tracing::instrument(name = "sink.unsubscribe", skip_all, fields(topic = %topic, sink_id = %self.id()))]
    pub async fn unsubscribe(&mut self, topic: &Topic) -> Result<()> {
        self.unregister_from_source(topic).await?;
        self.topics.remove(topic);
        Ok(())
    }

    async fn unregister_from_source(&self, topic: &Topic) -> Result<()> {
        let address = topic.address(&self.prefix);
        if let Err(e) = validate_address(&address) {
            warn!(error = %e, "Topic does not form a valid address");
            return Err(NotifyError::InvalidTopic(topic.code().to_string()));
        }
        let attempts = AtomicU32::new(0);

        let address_ref = address.as_str();
        let attempts_ref = &attempts;
        let outcome = (move || async move {
            attempts_ref.fetch_add(1, Ordering::SeqCst);
            let source = self
                .directory
                .resolve(address_ref)
                .await
                .map_err(AttemptError::Resolve)?;
            source
                .unregister(self.id())
                .await
                .map_err(AttemptError::Rpc)
        })
        .retry(self.retry.backoff())
        .when(AttemptError::retry_on_unsubscribe)
        .notify(|e: &AttemptError, delay: Duration| {
            warn!(
                address = %address,
                attempt = attempts.load(Ordering::SeqCst),
                error = %e,
                delay = ?delay,
                "Unsubscribe attempt failed, retrying"
            );
        })
        .await;

        let attempts = attempts.into_inner();
        let code = topic.code().to_string();
        match outcome {
            Ok(()) => {
                info!(attempts, "Unsubscribed from source");
                Ok(())
            }
            Err(AttemptError::Resolve(ResolveError::NotBound(_))) => {
                Err(NotifyError::TopicNotFound(code))
            }
            Err(AttemptError::Resolve(ResolveError::Malformed(_))) => {
                Err(NotifyError::InvalidTopic(code))
            }
            Err(e) if e.retry_on_unsubscribe() => {
                error!(attempts, error = %e, "Giving up on unsubscribe");
                Err(NotifyError::SourceUnreachable {
                    topic: code,
                    attempts,
                })
            }
            Err(e) => {
                error!(error = %e, "Unsubscribe failed unexpectedly");
                Err(NotifyError::Unexpected {
                    topic: code,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Unsubscribe from every topic in the subscription set.
    ///
    /// Works on a snapshot of the set. Every topic gets exactly one
    /// `unsubscribe`; topics that fail stay subscribed, and the first failure
    /// is returned after all topics have been tried.
    pub async fn unsubscribe_all(&mut self) -> Result<()> {
        let snapshot = self.subscriptions();
        let mut first_error = None;

        for topic in snapshot {
            if let Err(e) = self.unsubscribe(&topic).await {
                warn!(topic = %topic, error = %e, "Could not unsubscribe");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Wait for the next event.
    ///
    /// Cancelling the wait (dropping the future) yields no event and loses
    /// nothing. `None` is returned only if the queue has been closed.
    pub async fn take_notification(&self) -> Option<E> {
        self.receiver.take().await
    }

    /// Next event if one is ready now.
    ///
    /// Returns `None` while another consumer is waiting in `take`, even if
    /// events are queued.
    pub fn try_take_notification(&self) -> Option<E> {
        self.receiver.try_take()
    }

    /// Wait at most `timeout` for the next event.
    pub async fn take_notification_timeout(&self, timeout: Duration) -> Option<E> {
        self.receiver.take_timeout(timeout).await
    }
}
