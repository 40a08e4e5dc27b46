//! Test doubles for the repository ports and the event store.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::{Context, ContextError, CustomerId, OrderId};
use domain::{Customer, CustomerRepository, Order, OrderRepository, RepositoryError, RepositoryResult};
use event_store::{EventRecord, EventStore, EventStoreError};

type Failure = (&'static str, fn() -> RepositoryError);

struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
    calls: Vec<&'static str>,
    failure: Option<Failure>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 0,
            calls: Vec::new(),
            failure: None,
        }
    }
}

impl<T: Clone> Table<T> {
    fn enter(&mut self, ctx: &Context, call: &'static str) -> RepositoryResult<()> {
        ctx.check()?;
        self.calls.push(call);
        match self.failure {
            Some((op, make)) if op == call => Err(make()),
            _ => Ok(()),
        }
    }

    fn insert(&mut self, build: impl FnOnce(i64) -> T) -> i64 {
        self.next_id += 1;
        let id = self.next_id;
        self.rows.insert(id, build(id));
        id
    }

    fn page(&self, limit: u32, offset: u32) -> Vec<T> {
        self.rows
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect()
    }
}

/// Customer repository that records every call it receives.
#[derive(Clone, Default)]
pub struct RecordingCustomers {
    table: Arc<Mutex<Table<Customer>>>,
}

impl RecordingCustomers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the named call fail with the given error.
    pub fn fail_on(&self, call: &'static str, make: fn() -> RepositoryError) {
        self.table.lock().unwrap().failure = Some((call, make));
    }

    /// Stores a customer directly, bypassing the service.
    pub fn seed(&self, name: &str, email: &str) -> CustomerId {
        let id = self
            .table
            .lock()
            .unwrap()
            .insert(|id| Customer::restore(CustomerId::new(id), name, email));
        CustomerId::new(id)
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.table.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    pub fn len(&self) -> usize {
        self.table.lock().unwrap().rows.len()
    }
}

#[async_trait]
impl CustomerRepository for RecordingCustomers {
    async fn create(&self, ctx: &Context, customer: &Customer) -> RepositoryResult<CustomerId> {
        let mut table = self.table.lock().unwrap();
        table.enter(ctx, "create")?;
        let id = table.insert(|id| {
            Customer::restore(CustomerId::new(id), customer.name(), customer.email())
        });
        Ok(CustomerId::new(id))
    }

    async fn get_by_id(&self, ctx: &Context, id: CustomerId) -> RepositoryResult<Option<Customer>> {
        let mut table = self.table.lock().unwrap();
        table.enter(ctx, "get_by_id")?;
        Ok(table.rows.get(&id.as_i64()).cloned())
    }

    async fn get_by_email(&self, ctx: &Context, email: &str) -> RepositoryResult<Option<Customer>> {
        let mut table = self.table.lock().unwrap();
        table.enter(ctx, "get_by_email")?;
        Ok(table.rows.values().find(|c| c.email() == email).cloned())
    }

    async fn update(&self, ctx: &Context, customer: &Customer) -> RepositoryResult<()> {
        let mut table = self.table.lock().unwrap();
        table.enter(ctx, "update")?;
        let id = customer.id().ok_or(RepositoryError::MissingId)?;
        table.rows.insert(id.as_i64(), customer.clone());
        Ok(())
    }

    async fn delete(&self, ctx: &Context, id: CustomerId) -> RepositoryResult<()> {
        let mut table = self.table.lock().unwrap();
        table.enter(ctx, "delete")?;
        table.rows.remove(&id.as_i64());
        Ok(())
    }

    async fn list(&self, ctx: &Context, limit: u32, offset: u32) -> RepositoryResult<Vec<Customer>> {
        let mut table = self.table.lock().unwrap();
        table.enter(ctx, "list")?;
        Ok(table.page(limit, offset))
    }
}

/// Order repository that records every call it receives.
#[derive(Clone, Default)]
pub struct RecordingOrders {
    table: Arc<Mutex<Table<Order>>>,
}

impl RecordingOrders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the named call fail with the given error.
    pub fn fail_on(&self, call: &'static str, make: fn() -> RepositoryError) {
        self.table.lock().unwrap().failure = Some((call, make));
    }

    /// Stores an order directly, bypassing the service.
    pub fn seed(&self, product: &str, quantity: i32, customer_id: Option<CustomerId>) -> OrderId {
        let id = self
            .table
            .lock()
            .unwrap()
            .insert(|id| Order::restore(OrderId::new(id), customer_id, product, quantity));
        OrderId::new(id)
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.table.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    pub fn len(&self) -> usize {
        self.table.lock().unwrap().rows.len()
    }
}

#[async_trait]
impl OrderRepository for RecordingOrders {
    async fn create(&self, ctx: &Context, order: &Order) -> RepositoryResult<OrderId> {
        let mut table = self.table.lock().unwrap();
        table.enter(ctx, "create")?;
        let id = table.insert(|id| {
            Order::restore(
                OrderId::new(id),
                order.customer_id(),
                order.product(),
                order.quantity(),
            )
        });
        Ok(OrderId::new(id))
    }

    async fn get_by_id(&self, ctx: &Context, id: OrderId) -> RepositoryResult<Option<Order>> {
        let mut table = self.table.lock().unwrap();
        table.enter(ctx, "get_by_id")?;
        Ok(table.rows.get(&id.as_i64()).cloned())
    }

    async fn get_by_customer_id(
        &self,
        ctx: &Context,
        customer_id: CustomerId,
    ) -> RepositoryResult<Vec<Order>> {
        let mut table = self.table.lock().unwrap();
        table.enter(ctx, "get_by_customer_id")?;
        Ok(table
            .rows
            .values()
            .filter(|o| o.customer_id() == Some(customer_id))
            .cloned()
            .collect())
    }

    async fn update(&self, ctx: &Context, order: &Order) -> RepositoryResult<()> {
        let mut table = self.table.lock().unwrap();
        table.enter(ctx, "update")?;
        let id = order.id().ok_or(RepositoryError::MissingId)?;
        table.rows.insert(id.as_i64(), order.clone());
        Ok(())
    }

    async fn delete(&self, ctx: &Context, id: OrderId) -> RepositoryResult<()> {
        let mut table = self.table.lock().unwrap();
        table.enter(ctx, "delete")?;
        table.rows.remove(&id.as_i64());
        Ok(())
    }

    async fn list(&self, ctx: &Context, limit: u32, offset: u32) -> RepositoryResult<Vec<Order>> {
        let mut table = self.table.lock().unwrap();
        table.enter(ctx, "list")?;
        Ok(table.page(limit, offset))
    }
}

/// Event store whose appends always fail.
#[derive(Clone, Default)]
pub struct FailingEventStore {
    attempts: Arc<Mutex<usize>>,
    aborted: bool,
}

impl FailingEventStore {
    /// Store whose appends fail as if the caller's context was cancelled
    /// after the repository write committed.
    pub fn aborted() -> Self {
        Self {
            aborted: true,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl EventStore for FailingEventStore {
    async fn append(&self, _ctx: &Context, _record: EventRecord) -> event_store::Result<()> {
        *self.attempts.lock().unwrap() += 1;
        if self.aborted {
            return Err(EventStoreError::Aborted(ContextError::Cancelled));
        }
        Err(EventStoreError::UnknownEventType("store offline".to_string()))
    }

    async fn records_by_type(
        &self,
        _ctx: &Context,
        _event_type: &str,
    ) -> event_store::Result<Vec<EventRecord>> {
        Ok(Vec::new())
    }
}

pub fn backend_failure() -> RepositoryError {
    RepositoryError::backend("connection refused")
}

pub fn email_conflict() -> RepositoryError {
    RepositoryError::UniqueViolation {
        constraint: "customers_email_key".to_string(),
    }
}

pub fn customer_reference_violation() -> RepositoryError {
    RepositoryError::ForeignKeyViolation {
        constraint: "orders_customer_id_fkey".to_string(),
    }
}

pub fn row_vanished() -> RepositoryError {
    RepositoryError::RowNotFound
}
