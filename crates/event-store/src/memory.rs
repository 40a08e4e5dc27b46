use std::sync::Arc;

use async_trait::async_trait;
use common::Context;
use tokio::sync::Mutex;

use crate::{EventRecord, Result, store::EventStore};

/// In-memory event store implementation.
///
/// A single mutex guards the log for both appends and filtered reads, so
/// readers always see a consistent prefix of the appended records.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    records: Arc<Mutex<Vec<EventRecord>>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of records stored.
    pub async fn event_count(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Returns a copy of every record in insertion order.
    pub async fn all_records(&self) -> Vec<EventRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, ctx: &Context, record: EventRecord) -> Result<()> {
        let mut log = ctx.run(self.records.lock()).await?;
        log.push(record);
        Ok(())
    }

    async fn records_by_type(&self, ctx: &Context, event_type: &str) -> Result<Vec<EventRecord>> {
        let log = ctx.run(self.records.lock()).await?;
        let mut records: Vec<_> = log
            .iter()
            .filter(|r| r.event_type == event_type)
            .cloned()
            .collect();
        drop(log);

        // Stable sort keeps insertion order for equal timestamps.
        records.sort_by_key(|r| r.occurred_at);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::{EventStoreError, EventStoreExt, RecordedEvent};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Noted {
        note: String,
        occurred_at: chrono::DateTime<Utc>,
    }

    impl RecordedEvent for Noted {
        fn event_type(&self) -> &'static str {
            "test.noted"
        }

        fn occurred_at(&self) -> chrono::DateTime<Utc> {
            self.occurred_at
        }

        fn to_payload(&self) -> serde_json::Result<serde_json::Value> {
            serde_json::to_value(self)
        }

        fn decode(event_type: &str, payload: serde_json::Value) -> Result<Self> {
            match event_type {
                "test.noted" => Ok(serde_json::from_value(payload)?),
                other => Err(EventStoreError::UnknownEventType(other.to_string())),
            }
        }
    }

    fn noted(note: &str) -> Noted {
        Noted {
            note: note.to_string(),
            occurred_at: Utc::now(),
        }
    }

    fn create_test_record(event_type: &str, offset_secs: i64) -> EventRecord {
        EventRecord::new(
            event_type,
            Utc::now() + Duration::seconds(offset_secs),
            serde_json::json!({"test": true}),
        )
    }

    #[tokio::test]
    async fn append_single_record() {
        let store = InMemoryEventStore::new();
        let ctx = Context::background();

        store
            .append(&ctx, create_test_record("test.event", 0))
            .await
            .unwrap();

        assert_eq!(store.event_count().await, 1);
        let records = store.records_by_type(&ctx, "test.event").await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn records_by_type_filters_and_orders() {
        let store = InMemoryEventStore::new();
        let ctx = Context::background();

        store.append(&ctx, create_test_record("order.created", 20)).await.unwrap();
        store.append(&ctx, create_test_record("order.deleted", 0)).await.unwrap();
        store.append(&ctx, create_test_record("order.created", 10)).await.unwrap();

        let created = store.records_by_type(&ctx, "order.created").await.unwrap();
        assert_eq!(created.len(), 2);
        assert!(created[0].occurred_at < created[1].occurred_at);

        let deleted = store.records_by_type(&ctx, "order.deleted").await.unwrap();
        assert_eq!(deleted.len(), 1);

        let none = store.records_by_type(&ctx, "order.updated").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn all_records_keeps_insertion_order_across_types() {
        let store = InMemoryEventStore::new();
        let ctx = Context::background();

        store.append(&ctx, create_test_record("order.created", 20)).await.unwrap();
        store.append(&ctx, create_test_record("customer.deleted", 0)).await.unwrap();
        store.append(&ctx, create_test_record("order.created", 10)).await.unwrap();

        let types: Vec<_> = store
            .all_records()
            .await
            .into_iter()
            .map(|r| r.event_type)
            .collect();
        assert_eq!(types, vec!["order.created", "customer.deleted", "order.created"]);
    }

    #[tokio::test]
    async fn typed_store_and_get_events() {
        let store = InMemoryEventStore::new();
        let ctx = Context::background();

        store.store_event(&ctx, &noted("first")).await.unwrap();
        store.store_event(&ctx, &noted("second")).await.unwrap();

        let events: Vec<Noted> = store.get_events(&ctx, "test.noted").await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].note, "first");
        assert_eq!(events[1].note, "second");
    }

    #[tokio::test]
    async fn get_events_skips_undecodable_records() {
        let store = InMemoryEventStore::new();
        let ctx = Context::background();

        store.store_event(&ctx, &noted("kept")).await.unwrap();
        store
            .append(
                &ctx,
                EventRecord::new("test.noted", Utc::now(), serde_json::json!({"bogus": 1})),
            )
            .await
            .unwrap();

        let events: Vec<Noted> = store.get_events(&ctx, "test.noted").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].note, "kept");
    }

    #[tokio::test]
    async fn unknown_tag_yields_no_events() {
        let store = InMemoryEventStore::new();
        let ctx = Context::background();

        store.append(&ctx, create_test_record("test.legacy", 0)).await.unwrap();

        let events: Vec<Noted> = store.get_events(&ctx, "test.legacy").await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn cancelled_context_rejects_append() {
        let store = InMemoryEventStore::new();
        let (ctx, handle) = Context::background().with_cancel();
        handle.cancel();

        let result = store.append(&ctx, create_test_record("test.event", 0)).await;

        assert!(matches!(result, Err(EventStoreError::Aborted(_))));
        assert_eq!(store.event_count().await, 0);
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_kept() {
        let store = InMemoryEventStore::new();

        let mut tasks = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let ctx = Context::background();
                store.store_event(&ctx, &noted(&format!("n{i}"))).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.event_count().await, 50);
        let events: Vec<Noted> = store
            .get_events(&Context::background(), "test.noted")
            .await
            .unwrap();
        assert_eq!(events.len(), 50);
    }

    #[tokio::test]
    async fn shared_trait_object_writes_to_same_log() {
        let store = InMemoryEventStore::new();
        let shared: Arc<dyn EventStore> = Arc::new(store.clone());
        let ctx = Context::background();

        shared.store_event(&ctx, &noted("via arc")).await.unwrap();

        assert_eq!(store.event_count().await, 1);
        let events: Vec<Noted> = shared.get_events(&ctx, "test.noted").await.unwrap();
        assert_eq!(events[0].note, "via arc");
    }
}
