//! Test utilities and fault-injecting doubles.
//!
//! These wrap the real directory and source implementations so tests can
//! script transient failures, lost acknowledgements, and misbehaving sinks
//! without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::directory::{Directory, InMemoryDirectory, Result as ResolveResult};
use crate::error::{ResolveError, RpcError};
use crate::notification::Notification;
use crate::source::{
    NotificationSource, PublishReport, Result as RpcResult, SinkHandle, SourceHandle,
};
use crate::topic::Topic;

/// Directory that fails resolutions from a script before delegating.
pub struct ScriptedDirectory<E: Send + 'static> {
    inner: InMemoryDirectory<E>,
    script: Mutex<VecDeque<ResolveError>>,
    resolve_calls: AtomicU32,
}

impl<E: Send + 'static> ScriptedDirectory<E> {
    pub fn new() -> Self {
        Self {
            inner: InMemoryDirectory::new(),
            script: Mutex::new(VecDeque::new()),
            resolve_calls: AtomicU32::new(0),
        }
    }

    /// The underlying directory, for binding sources.
    pub fn inner(&self) -> &InMemoryDirectory<E> {
        &self.inner
    }

    /// Make the next `count` resolutions fail with `error`.
    pub async fn fail_next(&self, error: ResolveError, count: usize) {
        let mut script = self.script.lock().await;
        for _ in 0..count {
            script.push_back(error.clone());
        }
    }

    pub fn resolve_calls(&self) -> u32 {
        self.resolve_calls.load(Ordering::SeqCst)
    }
}

impl<E: Send + 'static> Default for ScriptedDirectory<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Send + 'static> Directory<E> for ScriptedDirectory<E> {
    async fn resolve(&self, address: &str) -> ResolveResult<Arc<dyn SourceHandle<E>>> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.script.lock().await.pop_front() {
            debug!(address = %address, error = %error, "Injected resolve failure");
            return Err(error);
        }
        self.inner.resolve(address).await
    }
}

/// Source wrapper that fails a scripted number of calls.
///
/// With lost acknowledgements enabled, a failing call is applied to the real
/// source first and only the reply is lost.
pub struct FlakySource<E: Clone + Send + Sync + 'static> {
    inner: Arc<NotificationSource<E>>,
    register_failures: AtomicU32,
    unregister_failures: AtomicU32,
    lose_acks: AtomicBool,
    register_calls: AtomicU32,
    unregister_calls: AtomicU32,
}

impl<E: Clone + Send + Sync + 'static> FlakySource<E> {
    pub fn new(inner: Arc<NotificationSource<E>>) -> Self {
        Self {
            inner,
            register_failures: AtomicU32::new(0),
            unregister_failures: AtomicU32::new(0),
            lose_acks: AtomicBool::new(false),
            register_calls: AtomicU32::new(0),
            unregister_calls: AtomicU32::new(0),
        }
    }

    /// A source whose calls never get through.
    pub fn unreachable(inner: Arc<NotificationSource<E>>) -> Self {
        let source = Self::new(inner);
        source.fail_register(u32::MAX);
        source.fail_unregister(u32::MAX);
        source
    }

    pub fn fail_register(&self, count: u32) {
        self.register_failures.store(count, Ordering::SeqCst);
    }

    pub fn fail_unregister(&self, count: u32) {
        self.unregister_failures.store(count, Ordering::SeqCst);
    }

    pub fn lose_acks(&self, lose: bool) {
        self.lose_acks.store(lose, Ordering::SeqCst);
    }

    pub fn register_calls(&self) -> u32 {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn unregister_calls(&self) -> u32 {
        self.unregister_calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &Arc<NotificationSource<E>> {
        &self.inner
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn injected() -> RpcError {
        RpcError::Connectivity("injected failure".to_string())
    }
}

#[async_trait]
impl<E: Clone + Send + Sync + 'static> SourceHandle<E> for FlakySource<E> {
    async fn register(&self, sink: Arc<dyn SinkHandle<E>>) -> RpcResult<()> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.register_failures) {
            if self.lose_acks.load(Ordering::SeqCst) {
                self.inner.register(sink).await?;
            }
            return Err(Self::injected());
        }
        self.inner.register(sink).await
    }

    async fn unregister(&self, sink_id: &str) -> RpcResult<()> {
        self.unregister_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.unregister_failures) {
            if self.lose_acks.load(Ordering::SeqCst) {
                self.inner.unregister(sink_id).await?;
            }
            return Err(Self::injected());
        }
        self.inner.unregister(sink_id).await
    }

    async fn publish(&self, notification: Notification<E>) -> RpcResult<PublishReport> {
        self.inner.publish(notification).await
    }

    async fn topic(&self) -> RpcResult<Topic> {
        self.inner.topic().await
    }
}

/// Sink that records every event it is pushed.
pub struct RecordingSink<E> {
    id: String,
    events: RwLock<Vec<E>>,
}

impl<E: Clone + Send + Sync + 'static> RecordingSink<E> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            events: RwLock::new(Vec::new()),
        }
    }

    pub async fn events(&self) -> Vec<E> {
        self.events.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl<E: Clone + Send + Sync + 'static> SinkHandle<E> for RecordingSink<E> {
    fn id(&self) -> &str {
        &self.id
    }

    async fn notify_of_event(&self, notification: Notification<E>) -> RpcResult<bool> {
        self.events.write().await.push(notification.into_event());
        Ok(true)
    }
}

/// Sink whose push calls always fail at the transport level.
pub struct UnreachableSink {
    id: String,
}

impl UnreachableSink {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl<E: Send + 'static> SinkHandle<E> for UnreachableSink {
    fn id(&self) -> &str {
        &self.id
    }

    async fn notify_of_event(&self, _notification: Notification<E>) -> RpcResult<bool> {
        Err(RpcError::Connectivity(format!("{} unreachable", self.id)))
    }
}

/// Sink whose push calls never complete.
pub struct StalledSink {
    id: String,
}

impl StalledSink {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl<E: Send + 'static> SinkHandle<E> for StalledSink {
    fn id(&self) -> &str {
        &self.id
    }

    async fn notify_of_event(&self, _notification: Notification<E>) -> RpcResult<bool> {
        std::future::pending::<()>().await;
        Ok(false)
    }
}
