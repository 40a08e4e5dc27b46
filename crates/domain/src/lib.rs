//! Use-case core for customers and orders.
//!
//! This crate provides:
//! - Customer and Order entities with their validation rules
//! - Repository ports the entities are persisted through
//! - Domain events appended to the audit log after each mutation
//! - CustomerService and OrderService use-cases

pub mod customer;
pub mod error;
pub mod events;
pub mod order;
pub mod ports;

pub use customer::{CreateCustomer, Customer, CustomerService, UpdateCustomer, is_valid_email};
pub use error::{DomainError, ErrorKind, ValidationError};
pub use events::{
    CustomerAssignedData, CustomerData, CustomerDeletedData, DomainEvent, OrderData,
    OrderDeletedData, event_types,
};
pub use order::{AssignCustomer, CreateOrder, Order, OrderService, UpdateOrder};
pub use ports::{CustomerRepository, OrderRepository, RepositoryError, RepositoryResult};
