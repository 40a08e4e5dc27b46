use async_trait::async_trait;
use common::Context;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{EventRecord, Result, store::EventStore};

/// PostgreSQL-backed event store implementation.
///
/// Each event is one insert-only row in the `events` table; the single-row
/// insert is the unit of atomicity, so no explicit transaction is opened.
#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Creates a new PostgreSQL event store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_record(row: PgRow) -> Result<EventRecord> {
        Ok(EventRecord {
            event_type: row.try_get("event_type")?,
            occurred_at: row.try_get("occurred_at")?,
            event_data: row.try_get("event_data")?,
        })
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn append(&self, ctx: &Context, record: EventRecord) -> Result<()> {
        let insert = sqlx::query(
            r#"
            INSERT INTO events (event_type, occurred_at, event_data)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&record.event_type)
        .bind(record.occurred_at)
        .bind(&record.event_data)
        .execute(&self.pool);

        ctx.run(insert).await??;
        Ok(())
    }

    async fn records_by_type(&self, ctx: &Context, event_type: &str) -> Result<Vec<EventRecord>> {
        let select = sqlx::query(
            r#"
            SELECT event_type, occurred_at, event_data
            FROM events
            WHERE event_type = $1
            ORDER BY occurred_at ASC, id ASC
            "#,
        )
        .bind(event_type)
        .fetch_all(&self.pool);

        let rows = ctx.run(select).await??;
        rows.into_iter().map(Self::row_to_record).collect()
    }
}
