use std::sync::Arc;

use async_trait::async_trait;
use common::Context;

use crate::{EventRecord, RecordedEvent, Result};

/// Core trait for event store implementations.
///
/// An event store is an append-only audit log. Records are never updated or
/// removed, and nothing in the system rebuilds entity state from them.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends a single record.
    ///
    /// The append is atomic on its own; there is no multi-record transaction.
    async fn append(&self, ctx: &Context, record: EventRecord) -> Result<()>;

    /// Retrieves all records with the given type tag.
    ///
    /// Records are returned in ascending `occurred_at` order; records with
    /// equal timestamps keep their insertion order.
    async fn records_by_type(&self, ctx: &Context, event_type: &str) -> Result<Vec<EventRecord>>;
}

#[async_trait]
impl<T: EventStore + ?Sized> EventStore for Arc<T> {
    async fn append(&self, ctx: &Context, record: EventRecord) -> Result<()> {
        (**self).append(ctx, record).await
    }

    async fn records_by_type(&self, ctx: &Context, event_type: &str) -> Result<Vec<EventRecord>> {
        (**self).records_by_type(ctx, event_type).await
    }
}

/// Extension trait providing typed access to any event store.
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Serializes and appends a typed event.
    async fn store_event<E: RecordedEvent>(&self, ctx: &Context, event: &E) -> Result<()> {
        let record = EventRecord::from_event(event)?;
        self.append(ctx, record).await?;
        tracing::debug!(event_type = event.event_type(), "event stored");
        Ok(())
    }

    /// Retrieves and decodes all events with the given type tag.
    ///
    /// Records that cannot be decoded are logged and skipped.
    async fn get_events<E: RecordedEvent>(&self, ctx: &Context, event_type: &str) -> Result<Vec<E>> {
        let records = self.records_by_type(ctx, event_type).await?;
        Ok(decode_records(records))
    }
}

// Blanket implementation for all EventStore implementations
impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Decodes records in order, dropping the ones that fail.
pub fn decode_records<E: RecordedEvent>(records: Vec<EventRecord>) -> Vec<E> {
    records
        .into_iter()
        .filter_map(|record| match record.decode::<E>() {
            Ok(event) => Some(event),
            Err(error) => {
                tracing::error!(
                    event_type = %record.event_type,
                    %error,
                    "failed to decode stored event, skipping"
                );
                metrics::counter!("event_store_decode_failures_total").increment(1);
                None
            }
        })
        .collect()
}
