//! Repository adapters for the customer and order ports.
//!
//! - [`InMemoryDatabase`] keeps both tables behind one lock and mirrors the
//!   relational constraints of the durable schema.
//! - [`PostgresCustomerRepository`] and [`PostgresOrderRepository`] run
//!   plain SQL over a shared `PgPool`.

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryCustomerRepository, InMemoryDatabase, InMemoryOrderRepository};
pub use postgres::{PostgresCustomerRepository, PostgresOrderRepository};

/// Name of the unique constraint on customer emails.
pub const CUSTOMERS_EMAIL_KEY: &str = "customers_email_key";

/// Name of the foreign key from orders to customers.
pub const ORDERS_CUSTOMER_ID_FKEY: &str = "orders_customer_id_fkey";
