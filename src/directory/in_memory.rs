//! Process-local directory.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{validate_address, Directory, Result};
use crate::error::ResolveError;
use crate::source::SourceHandle;
use crate::topic::Topic;

/// Thread-safe map of address -> source.
pub struct InMemoryDirectory<E: Send + 'static> {
    entries: RwLock<HashMap<String, Arc<dyn SourceHandle<E>>>>,
}

impl<E: Send + 'static> InMemoryDirectory<E> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Bind a source under an address. Fails if the address is taken.
    pub async fn bind(&self, address: &str, source: Arc<dyn SourceHandle<E>>) -> Result<()> {
        validate_address(address)?;

        let mut entries = self.entries.write().await;
        if entries.contains_key(address) {
            return Err(ResolveError::AlreadyBound(address.to_string()));
        }
        entries.insert(address.to_string(), source);
        info!(address = %address, "Bound source");
        Ok(())
    }

    /// Bind a source under an address, replacing any existing binding.
    pub async fn rebind(&self, address: &str, source: Arc<dyn SourceHandle<E>>) -> Result<()> {
        validate_address(address)?;

        let replaced = self
            .entries
            .write()
            .await
            .insert(address.to_string(), source)
            .is_some();
        info!(address = %address, replaced, "Rebound source");
        Ok(())
    }

    /// Bind a source under the address of its topic.
    pub async fn bind_topic(
        &self,
        prefix: &str,
        topic: &Topic,
        source: Arc<dyn SourceHandle<E>>,
    ) -> Result<()> {
        self.bind(&topic.address(prefix), source).await
    }

    /// Remove a binding.
    pub async fn unbind(&self, address: &str) -> Result<()> {
        validate_address(address)?;

        match self.entries.write().await.remove(address) {
            Some(_) => {
                info!(address = %address, "Unbound source");
                Ok(())
            }
            None => Err(ResolveError::NotBound(address.to_string())),
        }
    }

    /// All bound addresses.
    pub async fn list(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self.entries.read().await.keys().cloned().collect();
        addresses.sort();
        addresses
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<E: Send + 'static> Default for InMemoryDirectory<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Send + 'static> Directory<E> for InMemoryDirectory<E> {
    async fn resolve(&self, address: &str) -> Result<Arc<dyn SourceHandle<E>>> {
        validate_address(address)?;

        let entries = self.entries.read().await;
        match entries.get(address) {
            Some(source) => {
                debug!(address = %address, "Resolved source");
                Ok(Arc::clone(source))
            }
            None => Err(ResolveError::NotBound(address.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::NotificationSource;

    fn source(code: &str) -> Arc<dyn SourceHandle<String>> {
        Arc::new(NotificationSource::<String>::new(Topic::new(code)))
    }

    #[tokio::test]
    async fn test_bind_and_resolve() {
        let directory = InMemoryDirectory::new();
        directory
            .bind("//localhost/sport", source("sport"))
            .await
            .unwrap();

        let resolved = directory.resolve("//localhost/sport").await.unwrap();
        assert_eq!(resolved.topic().await.unwrap(), Topic::new("sport"));
    }

    #[tokio::test]
    async fn test_resolve_unknown_is_not_bound() {
        let directory: InMemoryDirectory<String> = InMemoryDirectory::new();

        let result = directory.resolve("//localhost/weather").await;
        assert!(matches!(result, Err(ResolveError::NotBound(_))));
    }

    #[tokio::test]
    async fn test_resolve_malformed_independent_of_bindings() {
        let directory = InMemoryDirectory::new();
        directory
            .bind("//localhost/sport", source("sport"))
            .await
            .unwrap();

        let result = directory.resolve("//localhost/sp ort").await;
        assert!(matches!(result, Err(ResolveError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_bind_twice_fails_rebind_replaces() {
        let directory = InMemoryDirectory::new();
        directory
            .bind("//localhost/music", source("music"))
            .await
            .unwrap();

        let again = directory.bind("//localhost/music", source("music")).await;
        assert!(matches!(again, Err(ResolveError::AlreadyBound(_))));

        directory
            .rebind("//localhost/music", source("gaming"))
            .await
            .unwrap();
        let resolved = directory.resolve("//localhost/music").await.unwrap();
        assert_eq!(resolved.topic().await.unwrap(), Topic::new("gaming"));
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn test_bind_topic_and_unbind() {
        let directory = InMemoryDirectory::new();
        let topic = Topic::new("technology");
        directory
            .bind_topic("//localhost/", &topic, source("technology"))
            .await
            .unwrap();
        assert_eq!(directory.list().await, vec!["//localhost/technology"]);

        directory.unbind("//localhost/technology").await.unwrap();
        assert!(directory.is_empty().await);
        assert!(matches!(
            directory.unbind("//localhost/technology").await,
            Err(ResolveError::NotBound(_))
        ));
    }
}
