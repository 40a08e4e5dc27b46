//! Wiring for the customer/order core.
//!
//! Loads configuration, installs logging and builds the use-case services
//! over either the in-memory or the PostgreSQL adapters.

pub mod config;
pub mod error;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use common::Context;
use domain::{CustomerRepository, CustomerService, OrderRepository, OrderService};
use event_store::{EventStore, InMemoryEventStore, PostgresEventStore};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use storage::{InMemoryDatabase, PostgresCustomerRepository, PostgresOrderRepository};

pub use config::{Config, ConfigError, LogFormat};
pub use error::AppError;

pub type SharedCustomerRepository = Arc<dyn CustomerRepository>;
pub type SharedOrderRepository = Arc<dyn OrderRepository>;
pub type SharedEventStore = Arc<dyn EventStore>;

pub type Customers = CustomerService<SharedCustomerRepository, SharedEventStore>;
pub type Orders = OrderService<SharedOrderRepository, SharedCustomerRepository, SharedEventStore>;

/// The use-case services over one set of adapters.
///
/// Both services share the same customer repository and audit log.
pub struct Services {
    pub customers: Customers,
    pub orders: Orders,
    backend: &'static str,
    request_timeout: Duration,
}

impl Services {
    /// Builds services over explicit adapters.
    pub fn new(
        customers: SharedCustomerRepository,
        orders: SharedOrderRepository,
        events: SharedEventStore,
        request_timeout: Duration,
    ) -> Self {
        Self {
            customers: CustomerService::new(Arc::clone(&customers), Arc::clone(&events)),
            orders: OrderService::new(orders, customers, events),
            backend: "custom",
            request_timeout,
        }
    }

    /// Builds services over fresh in-memory adapters.
    pub fn in_memory(request_timeout: Duration) -> Self {
        let db = InMemoryDatabase::new();
        Self {
            backend: "memory",
            ..Self::new(
                Arc::new(db.customers()),
                Arc::new(db.orders()),
                Arc::new(InMemoryEventStore::new()),
                request_timeout,
            )
        }
    }

    /// Builds services over a PostgreSQL pool.
    pub fn postgres(pool: PgPool, request_timeout: Duration) -> Self {
        Self {
            backend: "postgres",
            ..Self::new(
                Arc::new(PostgresCustomerRepository::new(pool.clone())),
                Arc::new(PostgresOrderRepository::new(pool.clone())),
                Arc::new(PostgresEventStore::new(pool)),
                request_timeout,
            )
        }
    }

    /// Builds services for the given configuration.
    ///
    /// With a database URL this connects, applies pending migrations and
    /// uses the PostgreSQL adapters. Otherwise everything stays in memory.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let Some(url) = config.database_url.as_deref() else {
            return Ok(Self::in_memory(config.request_timeout));
        };

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await?;
        migrate(&pool).await?;

        Ok(Self::postgres(pool, config.request_timeout))
    }

    /// Returns a fresh context bounded by the configured request timeout.
    pub fn request_context(&self) -> Context {
        Context::background().with_timeout(self.request_timeout)
    }

    /// Returns the name of the storage backend in use.
    pub fn backend(&self) -> &'static str {
        self.backend
    }
}

/// Applies the embedded schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}
