pub mod error;
pub mod event;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{EventStoreError, Result};
pub use event::{EventRecord, RecordedEvent};
pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use store::{EventStore, EventStoreExt, decode_records};
