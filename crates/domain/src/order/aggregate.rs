//! Order entity.

use common::{CustomerId, OrderId};
use serde::Serialize;

use crate::error::ValidationError;

fn validate(product: &str, quantity: i32) -> Result<(), ValidationError> {
    if product.is_empty() {
        return Err(ValidationError::EmptyProduct);
    }
    if quantity <= 0 {
        return Err(ValidationError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// An order for a quantity of one product, optionally linked to a customer.
///
/// The id is `None` until the repository assigns one on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    id: Option<OrderId>,
    customer_id: Option<CustomerId>,
    product: String,
    quantity: i32,
}

impl Order {
    /// Creates a validated, unassigned and not yet persisted order.
    pub fn new(product: impl Into<String>, quantity: i32) -> Result<Self, ValidationError> {
        let product = product.into();
        validate(&product, quantity)?;

        Ok(Self {
            id: None,
            customer_id: None,
            product,
            quantity,
        })
    }

    /// Rebuilds an order from a stored row without validation.
    pub fn restore(
        id: OrderId,
        customer_id: Option<CustomerId>,
        product: impl Into<String>,
        quantity: i32,
    ) -> Self {
        Self {
            id: Some(id),
            customer_id,
            product: product.into(),
            quantity,
        }
    }

    /// Links the order to a customer.
    pub fn assign_customer(&mut self, customer_id: CustomerId) -> Result<(), ValidationError> {
        if !customer_id.is_valid() {
            return Err(ValidationError::InvalidCustomerId(customer_id.as_i64()));
        }
        self.customer_id = Some(customer_id);
        Ok(())
    }

    /// Replaces product and quantity. The customer link is kept.
    pub fn update(&mut self, product: impl Into<String>, quantity: i32) -> Result<(), ValidationError> {
        let product = product.into();
        validate(&product, quantity)?;

        self.product = product;
        self.quantity = quantity;
        Ok(())
    }

    pub fn id(&self) -> Option<OrderId> {
        self.id
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }
}
