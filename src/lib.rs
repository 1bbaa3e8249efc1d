//! topic-notify - topic-based publish/subscribe notifications
//!
//! Publishers run one source per topic and bind it in a directory under the
//! topic's address. Subscribers create a sink, register it with the sources of
//! the topics they care about, and pull delivered events from the sink's queue.

pub mod catalog;
pub mod config;
pub mod directory;
pub mod error;
pub mod notification;
pub mod sink;
pub mod source;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod topic;
pub mod utils;

pub use directory::{Directory, InMemoryDirectory};
pub use error::{NotifyError, ResolveError, Result, RpcError};
pub use notification::Notification;
pub use sink::{NotificationReceiver, NotificationSink};
pub use source::{NotificationSource, PublishReport, SinkHandle, SourceHandle};
pub use topic::Topic;
