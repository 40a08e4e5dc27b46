//! Customer use-cases.

use common::{Context, CustomerId};
use event_store::EventStore;

use crate::error::DomainError;
use crate::events::{DomainEvent, record_event};
use crate::ports::{CustomerRepository, RepositoryError};

use super::{CreateCustomer, Customer, UpdateCustomer};

const ENTITY: &str = "customer";

/// Maps a failed customer write, turning a uniqueness violation into a
/// duplicate-email error and a vanished row into not-found.
fn write_error(operation: &'static str, customer: &Customer, error: RepositoryError) -> DomainError {
    match (error, customer.id()) {
        (RepositoryError::UniqueViolation { .. }, _) => DomainError::DuplicateEmail {
            email: customer.email().to_string(),
        },
        (RepositoryError::RowNotFound, Some(id)) => DomainError::not_found(ENTITY, id),
        (other, _) => DomainError::database(operation, other),
    }
}

/// Service for managing customers.
///
/// Reads and writes go through the repository. Every successful mutation
/// is followed by a best-effort append to the audit log.
pub struct CustomerService<R, S> {
    repository: R,
    store: S,
}

impl<R: CustomerRepository, S: EventStore> CustomerService<R, S> {
    /// Creates a new customer service.
    pub fn new(repository: R, store: S) -> Self {
        Self { repository, store }
    }

    /// Returns the audit log this service writes to.
    pub fn event_store(&self) -> &S {
        &self.store
    }

    /// Creates a customer with a unique email.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn create_customer(
        &self,
        ctx: &Context,
        cmd: CreateCustomer,
    ) -> Result<Customer, DomainError> {
        ctx.check()?;
        let customer = Customer::new(cmd.name, cmd.email)?;

        let existing = self
            .repository
            .get_by_email(ctx, customer.email())
            .await
            .map_err(|e| DomainError::database("get customer by email", e))?;
        if existing.is_some() {
            return Err(DomainError::DuplicateEmail {
                email: customer.email().to_string(),
            });
        }

        let id = self
            .repository
            .create(ctx, &customer)
            .await
            .map_err(|e| write_error("create customer", &customer, e))?;

        let created = self.fetch(ctx, id).await?;
        tracing::info!(customer_id = %id, "customer created");

        record_event(&self.store, ctx, DomainEvent::customer_created(id, &created)).await;
        Ok(created)
    }

    /// Returns the customer with the given id.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn get_customer(&self, ctx: &Context, id: CustomerId) -> Result<Customer, DomainError> {
        ctx.check()?;
        self.fetch(ctx, id).await
    }

    /// Replaces a customer's name and email.
    ///
    /// The email is checked against other customers only when it changes.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn update_customer(
        &self,
        ctx: &Context,
        cmd: UpdateCustomer,
    ) -> Result<Customer, DomainError> {
        ctx.check()?;
        let id = cmd.customer_id;
        let mut customer = self.fetch(ctx, id).await?;
        let email_changed = customer.email() != cmd.email;

        customer.update(cmd.name, cmd.email)?;

        if email_changed
            && let Some(other) = self
                .repository
                .get_by_email(ctx, customer.email())
                .await
                .map_err(|e| DomainError::database("get customer by email", e))?
            && other.id() != Some(id)
        {
            return Err(DomainError::DuplicateEmail {
                email: customer.email().to_string(),
            });
        }

        self.repository
            .update(ctx, &customer)
            .await
            .map_err(|e| write_error("update customer", &customer, e))?;
        tracing::info!(customer_id = %id, "customer updated");

        record_event(&self.store, ctx, DomainEvent::customer_updated(id, &customer)).await;
        Ok(customer)
    }

    /// Deletes an existing customer.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn delete_customer(&self, ctx: &Context, id: CustomerId) -> Result<(), DomainError> {
        ctx.check()?;
        self.fetch(ctx, id).await?;

        self.repository
            .delete(ctx, id)
            .await
            .map_err(|e| DomainError::database("delete customer", e))?;
        tracing::info!(customer_id = %id, "customer deleted");

        record_event(&self.store, ctx, DomainEvent::customer_deleted(id)).await;
        Ok(())
    }

    /// Lists customers ordered by id.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn list_customers(
        &self,
        ctx: &Context,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Customer>, DomainError> {
        ctx.check()?;
        self.repository
            .list(ctx, limit, offset)
            .await
            .map_err(|e| DomainError::database("list customers", e))
    }

    async fn fetch(&self, ctx: &Context, id: CustomerId) -> Result<Customer, DomainError> {
        self.repository
            .get_by_id(ctx, id)
            .await
            .map_err(|e| DomainError::database("get customer", e))?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }
}
