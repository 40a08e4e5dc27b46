//! Shared types for the customer/order core.

pub mod context;
pub mod types;

pub use context::{CancelHandle, Context, ContextError};
pub use types::{CustomerId, OrderId};
