//! Order entity, commands and use-case service.

mod aggregate;
mod commands;
mod service;

pub use aggregate::Order;
pub use commands::{AssignCustomer, CreateOrder, UpdateOrder};
pub use service::OrderService;
