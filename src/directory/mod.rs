//! Directory (naming service) for locating sources.
//!
//! This module contains:
//! - `Directory` trait: resolve an address string to a live source reference
//! - Address validation shared by all implementations
//! - `InMemoryDirectory`: process-local implementation

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ResolveError;
use crate::source::SourceHandle;

mod in_memory;

pub use in_memory::InMemoryDirectory;

/// Result type for directory operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Maps a source address to a live reference of the bound source.
///
/// Implementations:
/// - `InMemoryDirectory`: process-local bindings
#[async_trait]
pub trait Directory<E: Send + 'static>: Send + Sync {
    /// Resolve an address.
    ///
    /// Fails with `NotBound` when nothing is bound under the address,
    /// `Malformed` when the string is not a valid address, and
    /// `Unavailable` when the directory itself cannot be reached.
    async fn resolve(&self, address: &str) -> Result<Arc<dyn SourceHandle<E>>>;
}

/// Check that an address names something.
///
/// Accepted form is `[//host[:port]/]name`, where the name is non-empty and
/// every character is in `[A-Za-z0-9._~/:-]`.
pub fn validate_address(address: &str) -> Result<()> {
    if address.is_empty() {
        return Err(ResolveError::Malformed("empty address".to_string()));
    }

    if let Some(bad) = address
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '~' | '/' | ':' | '-')))
    {
        return Err(ResolveError::Malformed(format!(
            "illegal character {:?} in '{}'",
            bad, address
        )));
    }

    let name = address.rsplit('/').next().unwrap_or_default();
    if name.is_empty() {
        return Err(ResolveError::Malformed(format!(
            "no name in '{}'",
            address
        )));
    }

    Ok(())
}
