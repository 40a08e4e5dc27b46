use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// An event that can be written to and read back from the audit log.
///
/// The type tag is stored next to the payload rather than inside it, so
/// decoding dispatches on the tag and then deserializes the payload for
/// that variant.
pub trait RecordedEvent: Sized + Send + Sync {
    /// The stable type tag (e.g., "customer.created").
    fn event_type(&self) -> &'static str;

    /// When the event occurred.
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Serializes the variant-specific payload.
    fn to_payload(&self) -> serde_json::Result<serde_json::Value>;

    /// Rebuilds an event from a stored tag and payload.
    ///
    /// Returns `EventStoreError::UnknownEventType` for tags this type does
    /// not recognise.
    fn decode(event_type: &str, payload: serde_json::Value) -> Result<Self>;
}

/// One insert-only row of the audit log.
///
/// This is the storage shape shared by every backend:
/// `{event_type, occurred_at, event_data}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// The type tag used for indexing and decoding.
    pub event_type: String,

    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,

    /// The serialized payload.
    pub event_data: serde_json::Value,
}

impl EventRecord {
    /// Creates a record from raw parts.
    pub fn new(
        event_type: impl Into<String>,
        occurred_at: DateTime<Utc>,
        event_data: serde_json::Value,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            occurred_at,
            event_data,
        }
    }

    /// Serializes a typed event into a record.
    pub fn from_event<E: RecordedEvent>(event: &E) -> Result<Self> {
        Ok(Self {
            event_type: event.event_type().to_string(),
            occurred_at: event.occurred_at(),
            event_data: event.to_payload()?,
        })
    }

    /// Decodes this record into a typed event.
    pub fn decode<E: RecordedEvent>(&self) -> Result<E> {
        E::decode(&self.event_type, self.event_data.clone())
    }
}
