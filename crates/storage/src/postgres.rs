use async_trait::async_trait;
use common::{Context, CustomerId, OrderId};
use domain::{Customer, CustomerRepository, Order, OrderRepository, RepositoryError, RepositoryResult};
use sqlx::{PgPool, Row, postgres::PgRow};

/// Maps a driver error into the storage-agnostic repository error.
fn db_error(error: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db) = &error {
        let constraint = db.constraint().unwrap_or_default().to_string();
        if db.is_unique_violation() {
            return RepositoryError::UniqueViolation { constraint };
        }
        if db.is_foreign_key_violation() {
            return RepositoryError::ForeignKeyViolation { constraint };
        }
    }
    RepositoryError::backend(error)
}

/// PostgreSQL-backed customer repository.
#[derive(Clone)]
pub struct PostgresCustomerRepository {
    pool: PgPool,
}

impl PostgresCustomerRepository {
    /// Creates a new repository over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_customer(row: PgRow) -> Result<Customer, sqlx::Error> {
        Ok(Customer::restore(
            CustomerId::new(row.try_get("id")?),
            row.try_get::<String, _>("name")?,
            row.try_get::<String, _>("email")?,
        ))
    }
}

#[async_trait]
impl CustomerRepository for PostgresCustomerRepository {
    async fn create(&self, ctx: &Context, customer: &Customer) -> RepositoryResult<CustomerId> {
        let insert = sqlx::query_scalar::<_, i64>(
            "INSERT INTO customers (name, email) VALUES ($1, $2) RETURNING id",
        )
        .bind(customer.name())
        .bind(customer.email())
        .fetch_one(&self.pool);

        let id = ctx.run(insert).await?.map_err(db_error)?;
        tracing::debug!(customer_id = id, "inserted customer row");
        Ok(CustomerId::new(id))
    }

    async fn get_by_id(&self, ctx: &Context, id: CustomerId) -> RepositoryResult<Option<Customer>> {
        let select = sqlx::query("SELECT id, name, email FROM customers WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool);

        let row = ctx.run(select).await?.map_err(db_error)?;
        row.map(Self::row_to_customer).transpose().map_err(db_error)
    }

    async fn get_by_email(&self, ctx: &Context, email: &str) -> RepositoryResult<Option<Customer>> {
        let select = sqlx::query("SELECT id, name, email FROM customers WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool);

        let row = ctx.run(select).await?.map_err(db_error)?;
        row.map(Self::row_to_customer).transpose().map_err(db_error)
    }

    async fn update(&self, ctx: &Context, customer: &Customer) -> RepositoryResult<()> {
        let id = customer.id().ok_or(RepositoryError::MissingId)?;
        let update = sqlx::query("UPDATE customers SET name = $1, email = $2 WHERE id = $3")
            .bind(customer.name())
            .bind(customer.email())
            .bind(id.as_i64())
            .execute(&self.pool);

        let result = ctx.run(update).await?.map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::RowNotFound);
        }
        Ok(())
    }

    async fn delete(&self, ctx: &Context, id: CustomerId) -> RepositoryResult<()> {
        let delete = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool);

        ctx.run(delete).await?.map_err(db_error)?;
        Ok(())
    }

    async fn list(&self, ctx: &Context, limit: u32, offset: u32) -> RepositoryResult<Vec<Customer>> {
        let select =
            sqlx::query("SELECT id, name, email FROM customers ORDER BY id LIMIT $1 OFFSET $2")
                .bind(i64::from(limit))
                .bind(i64::from(offset))
                .fetch_all(&self.pool);

        let rows = ctx.run(select).await?.map_err(db_error)?;
        rows.into_iter()
            .map(Self::row_to_customer)
            .collect::<Result<_, _>>()
            .map_err(db_error)
    }
}

/// PostgreSQL-backed order repository.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new repository over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_order(row: PgRow) -> Result<Order, sqlx::Error> {
        let customer_id: Option<i64> = row.try_get("customer_id")?;
        Ok(Order::restore(
            OrderId::new(row.try_get("id")?),
            customer_id.map(CustomerId::new),
            row.try_get::<String, _>("product")?,
            row.try_get("quantity")?,
        ))
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, ctx: &Context, order: &Order) -> RepositoryResult<OrderId> {
        let insert = sqlx::query_scalar::<_, i64>(
            "INSERT INTO orders (customer_id, product, quantity) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(order.customer_id().map(|c| c.as_i64()))
        .bind(order.product())
        .bind(order.quantity())
        .fetch_one(&self.pool);

        let id = ctx.run(insert).await?.map_err(db_error)?;
        tracing::debug!(order_id = id, "inserted order row");
        Ok(OrderId::new(id))
    }

    async fn get_by_id(&self, ctx: &Context, id: OrderId) -> RepositoryResult<Option<Order>> {
        let select =
            sqlx::query("SELECT id, customer_id, product, quantity FROM orders WHERE id = $1")
                .bind(id.as_i64())
                .fetch_optional(&self.pool);

        let row = ctx.run(select).await?.map_err(db_error)?;
        row.map(Self::row_to_order).transpose().map_err(db_error)
    }

    async fn get_by_customer_id(
        &self,
        ctx: &Context,
        customer_id: CustomerId,
    ) -> RepositoryResult<Vec<Order>> {
        let select = sqlx::query(
            "SELECT id, customer_id, product, quantity FROM orders WHERE customer_id = $1 ORDER BY id",
        )
        .bind(customer_id.as_i64())
        .fetch_all(&self.pool);

        let rows = ctx.run(select).await?.map_err(db_error)?;
        rows.into_iter()
            .map(Self::row_to_order)
            .collect::<Result<_, _>>()
            .map_err(db_error)
    }

    async fn update(&self, ctx: &Context, order: &Order) -> RepositoryResult<()> {
        let id = order.id().ok_or(RepositoryError::MissingId)?;
        let update = sqlx::query(
            "UPDATE orders SET customer_id = $1, product = $2, quantity = $3 WHERE id = $4",
        )
        .bind(order.customer_id().map(|c| c.as_i64()))
        .bind(order.product())
        .bind(order.quantity())
        .bind(id.as_i64())
        .execute(&self.pool);

        let result = ctx.run(update).await?.map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::RowNotFound);
        }
        Ok(())
    }

    async fn delete(&self, ctx: &Context, id: OrderId) -> RepositoryResult<()> {
        let delete = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool);

        ctx.run(delete).await?.map_err(db_error)?;
        Ok(())
    }

    async fn list(&self, ctx: &Context, limit: u32, offset: u32) -> RepositoryResult<Vec<Order>> {
        let select = sqlx::query(
            "SELECT id, customer_id, product, quantity FROM orders ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool);

        let rows = ctx.run(select).await?.map_err(db_error)?;
        rows.into_iter()
            .map(Self::row_to_order)
            .collect::<Result<_, _>>()
            .map_err(db_error)
    }
}
