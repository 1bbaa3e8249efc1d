//! Error types for the notification protocol.
//!
//! Two layers:
//! - `ResolveError` / `RpcError`: failures reported by the collaborators
//!   (directory lookups and remote calls).
//! - `NotifyError`: what sink lifecycle operations surface to their callers
//!   once the retry policy has been applied.

/// Result type for sink lifecycle operations.
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Errors surfaced by subscription lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    /// Directory or source could not be reached within the retry budget.
    #[error("Could not connect to registry or source for topic '{topic}' after {attempts} attempts")]
    Connectivity { topic: String, attempts: u32 },

    /// The directory has no source bound for this topic.
    #[error("Topic '{0}' does not exist or has been taken down")]
    TopicNotFound(String),

    /// The topic code does not form a valid directory address.
    #[error("Topic '{0}' contains illegal characters")]
    InvalidTopic(String),

    /// The source stayed unreachable for the whole teardown retry budget.
    #[error("Source for topic '{topic}' is unreachable, presumed taken down after {attempts} attempts")]
    SourceUnreachable { topic: String, attempts: u32 },

    /// Anything the protocol does not classify. Never retried.
    #[error("Unexpected failure for topic '{topic}': {message}")]
    Unexpected { topic: String, message: String },
}

impl NotifyError {
    /// Whether the error is transient (a later call may succeed).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NotifyError::Connectivity { .. } | NotifyError::SourceUnreachable { .. }
        )
    }
}

/// Errors from the directory/naming service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Address not bound: {0}")]
    NotBound(String),

    #[error("Malformed address: {0}")]
    Malformed(String),

    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    #[error("Address already bound: {0}")]
    AlreadyBound(String),
}

/// Errors from the remote call substrate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcError {
    /// Transport-level failure; the remote side may or may not have run the call.
    #[error("Connection failed: {0}")]
    Connectivity(String),

    /// The remote side refused the call for an application reason.
    #[error("Call rejected: {0}")]
    Rejected(String),
}

impl RpcError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, RpcError::Connectivity(_))
    }
}
