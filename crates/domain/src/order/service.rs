//! Order use-cases.

use common::{Context, CustomerId, OrderId};
use event_store::EventStore;

use crate::customer::Customer;
use crate::error::DomainError;
use crate::events::{DomainEvent, record_event};
use crate::ports::{CustomerRepository, OrderRepository, RepositoryError};

use super::{AssignCustomer, CreateOrder, Order, UpdateOrder};

/// Maps a failed order write. A rejected customer reference means the
/// customer was deleted after it was checked, and a missing row means the
/// order itself was.
fn write_error(operation: &'static str, order: &Order, error: RepositoryError) -> DomainError {
    if let (RepositoryError::ForeignKeyViolation { .. }, Some(customer_id)) =
        (&error, order.customer_id())
    {
        return DomainError::not_found("customer", customer_id);
    }
    if let (RepositoryError::RowNotFound, Some(id)) = (&error, order.id()) {
        return DomainError::not_found("order", id);
    }
    DomainError::database(operation, error)
}

/// Service for managing orders.
///
/// Customer references are checked against the customer repository before
/// they are stored on an order.
pub struct OrderService<O, C, S> {
    orders: O,
    customers: C,
    store: S,
}

impl<O, C, S> OrderService<O, C, S>
where
    O: OrderRepository,
    C: CustomerRepository,
    S: EventStore,
{
    /// Creates a new order service.
    pub fn new(orders: O, customers: C, store: S) -> Self {
        Self {
            orders,
            customers,
            store,
        }
    }

    /// Returns the audit log this service writes to.
    pub fn event_store(&self) -> &S {
        &self.store
    }

    /// Creates an order, optionally linked to an existing customer.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn create_order(&self, ctx: &Context, cmd: CreateOrder) -> Result<Order, DomainError> {
        ctx.check()?;
        let mut order = Order::new(cmd.product, cmd.quantity)?;

        if let Some(customer_id) = cmd.customer_id {
            order.assign_customer(customer_id)?;
            self.require_customer(ctx, customer_id).await?;
        }

        let id = self
            .orders
            .create(ctx, &order)
            .await
            .map_err(|e| write_error("create order", &order, e))?;

        let created = self.fetch(ctx, id).await?;
        tracing::info!(order_id = %id, "order created");

        record_event(&self.store, ctx, DomainEvent::order_created(id, &created)).await;
        Ok(created)
    }

    /// Returns the order with the given id.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn get_order(&self, ctx: &Context, id: OrderId) -> Result<Order, DomainError> {
        ctx.check()?;
        self.fetch(ctx, id).await
    }

    /// Replaces an order's product and quantity.
    ///
    /// A customer id in the command relinks the order; without one the
    /// current link is kept.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn update_order(&self, ctx: &Context, cmd: UpdateOrder) -> Result<Order, DomainError> {
        ctx.check()?;
        let id = cmd.order_id;
        let mut order = self.fetch(ctx, id).await?;

        order.update(cmd.product, cmd.quantity)?;
        if let Some(customer_id) = cmd.customer_id {
            order.assign_customer(customer_id)?;
            self.require_customer(ctx, customer_id).await?;
        }

        self.orders
            .update(ctx, &order)
            .await
            .map_err(|e| write_error("update order", &order, e))?;
        tracing::info!(order_id = %id, "order updated");

        record_event(&self.store, ctx, DomainEvent::order_updated(id, &order)).await;
        Ok(order)
    }

    /// Deletes an existing order.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn delete_order(&self, ctx: &Context, id: OrderId) -> Result<(), DomainError> {
        ctx.check()?;
        self.fetch(ctx, id).await?;

        self.orders
            .delete(ctx, id)
            .await
            .map_err(|e| DomainError::database("delete order", e))?;
        tracing::info!(order_id = %id, "order deleted");

        record_event(&self.store, ctx, DomainEvent::order_deleted(id)).await;
        Ok(())
    }

    /// Links an existing order to an existing customer.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn assign_customer_to_order(
        &self,
        ctx: &Context,
        cmd: AssignCustomer,
    ) -> Result<Order, DomainError> {
        ctx.check()?;
        let mut order = self.fetch(ctx, cmd.order_id).await?;
        order.assign_customer(cmd.customer_id)?;
        self.require_customer(ctx, cmd.customer_id).await?;

        self.orders
            .update(ctx, &order)
            .await
            .map_err(|e| write_error("assign customer to order", &order, e))?;
        tracing::info!(
            order_id = %cmd.order_id,
            customer_id = %cmd.customer_id,
            "customer assigned to order"
        );

        record_event(
            &self.store,
            ctx,
            DomainEvent::customer_assigned(cmd.order_id, cmd.customer_id),
        )
        .await;
        Ok(order)
    }

    /// Lists orders ordered by id.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn list_orders(
        &self,
        ctx: &Context,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Order>, DomainError> {
        ctx.check()?;
        self.orders
            .list(ctx, limit, offset)
            .await
            .map_err(|e| DomainError::database("list orders", e))
    }

    /// Lists the orders linked to an existing customer.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn list_orders_for_customer(
        &self,
        ctx: &Context,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, DomainError> {
        ctx.check()?;
        self.require_customer(ctx, customer_id).await?;

        self.orders
            .get_by_customer_id(ctx, customer_id)
            .await
            .map_err(|e| DomainError::database("get orders by customer", e))
    }

    async fn fetch(&self, ctx: &Context, id: OrderId) -> Result<Order, DomainError> {
        self.orders
            .get_by_id(ctx, id)
            .await
            .map_err(|e| DomainError::database("get order", e))?
            .ok_or_else(|| DomainError::not_found("order", id))
    }

    async fn require_customer(
        &self,
        ctx: &Context,
        id: CustomerId,
    ) -> Result<Customer, DomainError> {
        self.customers
            .get_by_id(ctx, id)
            .await
            .map_err(|e| DomainError::database("get customer", e))?
            .ok_or_else(|| DomainError::not_found("customer", id))
    }
}
