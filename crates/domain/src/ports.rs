//! Repository ports consumed by the use-case services.
//!
//! A lookup that finds nothing returns `Ok(None)`; every other failure is a
//! [`RepositoryError`]. Callers branch on both.

use std::sync::Arc;

use async_trait::async_trait;
use common::{Context, ContextError, CustomerId, OrderId};
use thiserror::Error;

use crate::customer::Customer;
use crate::order::Order;

/// Storage-agnostic repository failure.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the write.
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A foreign-key constraint rejected the write.
    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// An update targeted a row that does not exist.
    #[error("Row not found")]
    RowNotFound,

    /// An update or delete was issued for an entity without an id.
    #[error("Entity has no id")]
    MissingId,

    /// The caller's context finished before the call completed.
    #[error("Repository call aborted: {0}")]
    Cancelled(#[from] ContextError),

    /// Any other backend failure.
    #[error("{0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    /// Wraps an arbitrary backend error.
    pub fn backend(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        RepositoryError::Backend(error.into())
    }
}

/// Result type for repository calls.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistence port for customers.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Inserts a new customer and returns the assigned id.
    async fn create(&self, ctx: &Context, customer: &Customer) -> RepositoryResult<CustomerId>;

    async fn get_by_id(&self, ctx: &Context, id: CustomerId) -> RepositoryResult<Option<Customer>>;

    async fn get_by_email(&self, ctx: &Context, email: &str) -> RepositoryResult<Option<Customer>>;

    /// Replaces every mutable field of the stored customer. Fails with
    /// [`RepositoryError::RowNotFound`] when no row has the customer's id.
    async fn update(&self, ctx: &Context, customer: &Customer) -> RepositoryResult<()>;

    async fn delete(&self, ctx: &Context, id: CustomerId) -> RepositoryResult<()>;

    /// Lists customers ordered by id.
    async fn list(&self, ctx: &Context, limit: u32, offset: u32) -> RepositoryResult<Vec<Customer>>;
}

/// Persistence port for orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts a new order and returns the assigned id.
    async fn create(&self, ctx: &Context, order: &Order) -> RepositoryResult<OrderId>;

    async fn get_by_id(&self, ctx: &Context, id: OrderId) -> RepositoryResult<Option<Order>>;

    /// Returns every order referencing the customer, ordered by id.
    async fn get_by_customer_id(
        &self,
        ctx: &Context,
        customer_id: CustomerId,
    ) -> RepositoryResult<Vec<Order>>;

    /// Replaces every mutable field of the stored order. Fails with
    /// [`RepositoryError::RowNotFound`] when no row has the order's id.
    async fn update(&self, ctx: &Context, order: &Order) -> RepositoryResult<()>;

    async fn delete(&self, ctx: &Context, id: OrderId) -> RepositoryResult<()>;

    /// Lists orders ordered by id.
    async fn list(&self, ctx: &Context, limit: u32, offset: u32) -> RepositoryResult<Vec<Order>>;
}

#[async_trait]
impl<T: CustomerRepository + ?Sized> CustomerRepository for Arc<T> {
    async fn create(&self, ctx: &Context, customer: &Customer) -> RepositoryResult<CustomerId> {
        (**self).create(ctx, customer).await
    }

    async fn get_by_id(&self, ctx: &Context, id: CustomerId) -> RepositoryResult<Option<Customer>> {
        (**self).get_by_id(ctx, id).await
    }

    async fn get_by_email(&self, ctx: &Context, email: &str) -> RepositoryResult<Option<Customer>> {
        (**self).get_by_email(ctx, email).await
    }

    async fn update(&self, ctx: &Context, customer: &Customer) -> RepositoryResult<()> {
        (**self).update(ctx, customer).await
    }

    async fn delete(&self, ctx: &Context, id: CustomerId) -> RepositoryResult<()> {
        (**self).delete(ctx, id).await
    }

    async fn list(&self, ctx: &Context, limit: u32, offset: u32) -> RepositoryResult<Vec<Customer>> {
        (**self).list(ctx, limit, offset).await
    }
}

#[async_trait]
impl<T: OrderRepository + ?Sized> OrderRepository for Arc<T> {
    async fn create(&self, ctx: &Context, order: &Order) -> RepositoryResult<OrderId> {
        (**self).create(ctx, order).await
    }

    async fn get_by_id(&self, ctx: &Context, id: OrderId) -> RepositoryResult<Option<Order>> {
        (**self).get_by_id(ctx, id).await
    }

    async fn get_by_customer_id(
        &self,
        ctx: &Context,
        customer_id: CustomerId,
    ) -> RepositoryResult<Vec<Order>> {
        (**self).get_by_customer_id(ctx, customer_id).await
    }

    async fn update(&self, ctx: &Context, order: &Order) -> RepositoryResult<()> {
        (**self).update(ctx, order).await
    }

    async fn delete(&self, ctx: &Context, id: OrderId) -> RepositoryResult<()> {
        (**self).delete(ctx, id).await
    }

    async fn list(&self, ctx: &Context, limit: u32, offset: u32) -> RepositoryResult<Vec<Order>> {
        (**self).list(ctx, limit, offset).await
    }
}
