//! Notification envelope.
//!
//! A notification carries exactly one event across a remote call. The topic
//! and sender are implied by the channel it arrives on, so the envelope only
//! adds transit metadata. Sinks unwrap it on receipt and queue the event.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Envelope pairing an event payload with transit metadata.
///
/// `E` is any payload type; the framework moves events without inspecting them.
#[derive(Debug, Clone)]
pub struct Notification<E> {
    id: Uuid,
    created_at: DateTime<Utc>,
    event: E,
}

impl<E> Notification<E> {
    pub fn new(event: E) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            event,
        }
    }

    /// Unique id for tracing a notification through fan-out.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn event(&self) -> &E {
        &self.event
    }

    /// Unwrap the envelope, discarding the metadata.
    pub fn into_event(self) -> E {
        self.event
    }
}
