use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{Context, CustomerId, OrderId};
use domain::{Customer, CustomerRepository, Order, OrderRepository, RepositoryError, RepositoryResult};
use tokio::sync::RwLock;

use crate::{CUSTOMERS_EMAIL_KEY, ORDERS_CUSTOMER_ID_FKEY};

#[derive(Default)]
struct Tables {
    customers: BTreeMap<i64, Customer>,
    orders: BTreeMap<i64, Order>,
    customer_seq: i64,
    order_seq: i64,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<CustomerId>) -> bool {
        self.customers
            .values()
            .any(|c| c.email() == email && c.id() != except)
    }

    fn check_customer_ref(&self, customer_id: Option<CustomerId>) -> RepositoryResult<()> {
        match customer_id {
            Some(id) if !self.customers.contains_key(&id.as_i64()) => {
                Err(RepositoryError::ForeignKeyViolation {
                    constraint: ORDERS_CUSTOMER_ID_FKEY.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

fn page<T: Clone>(rows: &BTreeMap<i64, T>, limit: u32, offset: u32) -> Vec<T> {
    rows.values()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect()
}

/// In-memory customer and order tables.
///
/// Both repositories handed out by one database share a single lock, so
/// cross-table rules hold the way they do in the durable schema: emails are
/// unique, orders may only reference existing customers, and deleting a
/// customer unlinks its orders.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    /// Creates a new empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a customer repository over this database.
    pub fn customers(&self) -> InMemoryCustomerRepository {
        InMemoryCustomerRepository {
            tables: Arc::clone(&self.tables),
        }
    }

    /// Returns an order repository over this database.
    pub fn orders(&self) -> InMemoryOrderRepository {
        InMemoryOrderRepository {
            tables: Arc::clone(&self.tables),
        }
    }
}

/// Customer repository backed by an [`InMemoryDatabase`].
#[derive(Clone)]
pub struct InMemoryCustomerRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn create(&self, ctx: &Context, customer: &Customer) -> RepositoryResult<CustomerId> {
        let mut tables = ctx.run(self.tables.write()).await?;
        if tables.email_taken(customer.email(), None) {
            return Err(RepositoryError::UniqueViolation {
                constraint: CUSTOMERS_EMAIL_KEY.to_string(),
            });
        }

        tables.customer_seq += 1;
        let id = CustomerId::new(tables.customer_seq);
        tables.customers.insert(
            id.as_i64(),
            Customer::restore(id, customer.name(), customer.email()),
        );
        Ok(id)
    }

    async fn get_by_id(&self, ctx: &Context, id: CustomerId) -> RepositoryResult<Option<Customer>> {
        let tables = ctx.run(self.tables.read()).await?;
        Ok(tables.customers.get(&id.as_i64()).cloned())
    }

    async fn get_by_email(&self, ctx: &Context, email: &str) -> RepositoryResult<Option<Customer>> {
        let tables = ctx.run(self.tables.read()).await?;
        Ok(tables.customers.values().find(|c| c.email() == email).cloned())
    }

    async fn update(&self, ctx: &Context, customer: &Customer) -> RepositoryResult<()> {
        let id = customer.id().ok_or(RepositoryError::MissingId)?;
        let mut tables = ctx.run(self.tables.write()).await?;
        if tables.email_taken(customer.email(), Some(id)) {
            return Err(RepositoryError::UniqueViolation {
                constraint: CUSTOMERS_EMAIL_KEY.to_string(),
            });
        }

        let row = tables
            .customers
            .get_mut(&id.as_i64())
            .ok_or(RepositoryError::RowNotFound)?;
        *row = customer.clone();
        Ok(())
    }

    async fn delete(&self, ctx: &Context, id: CustomerId) -> RepositoryResult<()> {
        let mut tables = ctx.run(self.tables.write()).await?;
        if tables.customers.remove(&id.as_i64()).is_none() {
            return Ok(());
        }

        // ON DELETE SET NULL
        for (order_id, order) in tables.orders.iter_mut() {
            if order.customer_id() == Some(id) {
                *order = Order::restore(OrderId::new(*order_id), None, order.product(), order.quantity());
            }
        }
        Ok(())
    }

    async fn list(&self, ctx: &Context, limit: u32, offset: u32) -> RepositoryResult<Vec<Customer>> {
        let tables = ctx.run(self.tables.read()).await?;
        Ok(page(&tables.customers, limit, offset))
    }
}

/// Order repository backed by an [`InMemoryDatabase`].
#[derive(Clone)]
pub struct InMemoryOrderRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, ctx: &Context, order: &Order) -> RepositoryResult<OrderId> {
        let mut tables = ctx.run(self.tables.write()).await?;
        tables.check_customer_ref(order.customer_id())?;

        tables.order_seq += 1;
        let id = OrderId::new(tables.order_seq);
        tables.orders.insert(
            id.as_i64(),
            Order::restore(id, order.customer_id(), order.product(), order.quantity()),
        );
        Ok(id)
    }

    async fn get_by_id(&self, ctx: &Context, id: OrderId) -> RepositoryResult<Option<Order>> {
        let tables = ctx.run(self.tables.read()).await?;
        Ok(tables.orders.get(&id.as_i64()).cloned())
    }

    async fn get_by_customer_id(
        &self,
        ctx: &Context,
        customer_id: CustomerId,
    ) -> RepositoryResult<Vec<Order>> {
        let tables = ctx.run(self.tables.read()).await?;
        Ok(tables
            .orders
            .values()
            .filter(|o| o.customer_id() == Some(customer_id))
            .cloned()
            .collect())
    }

    async fn update(&self, ctx: &Context, order: &Order) -> RepositoryResult<()> {
        let id = order.id().ok_or(RepositoryError::MissingId)?;
        let mut tables = ctx.run(self.tables.write()).await?;
        tables.check_customer_ref(order.customer_id())?;

        let row = tables
            .orders
            .get_mut(&id.as_i64())
            .ok_or(RepositoryError::RowNotFound)?;
        *row = order.clone();
        Ok(())
    }

    async fn delete(&self, ctx: &Context, id: OrderId) -> RepositoryResult<()> {
        let mut tables = ctx.run(self.tables.write()).await?;
        tables.orders.remove(&id.as_i64());
        Ok(())
    }

    async fn list(&self, ctx: &Context, limit: u32, offset: u32) -> RepositoryResult<Vec<Order>> {
        let tables = ctx.run(self.tables.read()).await?;
        Ok(page(&tables.orders, limit, offset))
    }
}

#[cfg(test)]
mod tests {
    use common::ContextError;

    use super::*;

    fn customer(name: &str, email: &str) -> Customer {
        Customer::new(name, email).unwrap()
    }

    #[tokio::test]
    async fn ids_are_assigned_in_sequence() {
        let db = InMemoryDatabase::new();
        let ctx = Context::background();
        let customers = db.customers();

        let first = customers.create(&ctx, &customer("A", "a@example.com")).await.unwrap();
        let second = customers.create(&ctx, &customer("B", "b@example.com")).await.unwrap();

        assert_eq!(first, CustomerId::new(1));
        assert_eq!(second, CustomerId::new(2));

        let stored = customers.get_by_id(&ctx, second).await.unwrap().unwrap();
        assert_eq!(stored.id(), Some(second));
        assert_eq!(stored.email(), "b@example.com");
    }

    #[tokio::test]
    async fn lookups_of_missing_rows_return_none() {
        let db = InMemoryDatabase::new();
        let ctx = Context::background();

        assert!(db.customers().get_by_id(&ctx, CustomerId::new(1)).await.unwrap().is_none());
        assert!(db.customers().get_by_email(&ctx, "x@example.com").await.unwrap().is_none());
        assert!(db.orders().get_by_id(&ctx, OrderId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_violates_unique_constraint() {
        let db = InMemoryDatabase::new();
        let ctx = Context::background();
        let customers = db.customers();
        customers.create(&ctx, &customer("A", "a@example.com")).await.unwrap();
        let b = customers.create(&ctx, &customer("B", "b@example.com")).await.unwrap();

        let err = customers
            .create(&ctx, &customer("A2", "a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueViolation { ref constraint } if constraint == CUSTOMERS_EMAIL_KEY));

        let err = customers
            .update(&ctx, &Customer::restore(b, "B", "a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueViolation { .. }));

        customers
            .update(&ctx, &Customer::restore(b, "Bee", "b@example.com"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_without_id_is_rejected() {
        let db = InMemoryDatabase::new();
        let ctx = Context::background();

        let err = db
            .customers()
            .update(&ctx, &customer("A", "a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::MissingId));

        let err = db
            .orders()
            .update(&ctx, &Order::new("Widget", 1).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::MissingId));
    }

    #[tokio::test]
    async fn order_must_reference_existing_customer() {
        let db = InMemoryDatabase::new();
        let ctx = Context::background();
        let mut order = Order::new("Widget", 1).unwrap();
        order.assign_customer(CustomerId::new(5)).unwrap();

        let err = db.orders().create(&ctx, &order).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::ForeignKeyViolation { ref constraint } if constraint == ORDERS_CUSTOMER_ID_FKEY
        ));

        let id = db.orders().create(&ctx, &Order::new("Widget", 1).unwrap()).await.unwrap();
        let err = db
            .orders()
            .update(&ctx, &Order::restore(id, Some(CustomerId::new(5)), "Widget", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation { .. }));
        assert_eq!(db.orders().get_by_id(&ctx, id).await.unwrap().unwrap().customer_id(), None);
    }

    #[tokio::test]
    async fn update_of_vanished_row_is_reported() {
        let db = InMemoryDatabase::new();
        let ctx = Context::background();

        let err = db
            .customers()
            .update(&ctx, &Customer::restore(CustomerId::new(3), "A", "a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::RowNotFound));

        let err = db
            .orders()
            .update(&ctx, &Order::restore(OrderId::new(3), None, "Widget", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::RowNotFound));

        assert!(db.customers().list(&ctx, 10, 0).await.unwrap().is_empty());
        assert!(db.orders().list(&ctx, 10, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_customer_unlinks_orders() {
        let db = InMemoryDatabase::new();
        let ctx = Context::background();
        let customer_id = db
            .customers()
            .create(&ctx, &customer("A", "a@example.com"))
            .await
            .unwrap();
        let mut order = Order::new("Widget", 2).unwrap();
        order.assign_customer(customer_id).unwrap();
        let order_id = db.orders().create(&ctx, &order).await.unwrap();

        db.customers().delete(&ctx, customer_id).await.unwrap();

        let stored = db.orders().get_by_id(&ctx, order_id).await.unwrap().unwrap();
        assert_eq!(stored.customer_id(), None);
        assert_eq!(stored.product(), "Widget");
        assert!(db.orders().get_by_customer_id(&ctx, customer_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_is_ordered_by_id_and_paginated() {
        let db = InMemoryDatabase::new();
        let ctx = Context::background();
        let orders = db.orders();
        for product in ["A", "B", "C", "D"] {
            orders.create(&ctx, &Order::new(product, 1).unwrap()).await.unwrap();
        }

        let page: Vec<_> = orders
            .list(&ctx, 2, 1)
            .await
            .unwrap()
            .iter()
            .map(|o| o.product().to_string())
            .collect();
        assert_eq!(page, vec!["B", "C"]);

        assert_eq!(orders.list(&ctx, 10, 0).await.unwrap().len(), 4);
        assert!(orders.list(&ctx, 0, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancelled_context_rejects_calls() {
        let db = InMemoryDatabase::new();
        let (ctx, handle) = Context::background().with_cancel();
        handle.cancel();

        let err = db
            .customers()
            .create(&ctx, &customer("A", "a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Cancelled(ContextError::Cancelled)));

        let all = db.customers().list(&Context::background(), 10, 0).await.unwrap();
        assert!(all.is_empty());
    }
}
