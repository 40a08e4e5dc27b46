//! Customer entity, commands and use-case service.

mod aggregate;
mod commands;
mod service;

pub use aggregate::{Customer, is_valid_email};
pub use commands::{CreateCustomer, UpdateCustomer};
pub use service::CustomerService;
