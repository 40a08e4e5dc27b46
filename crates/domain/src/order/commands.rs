//! Order commands.

use common::{CustomerId, OrderId};

/// Command to create a new order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub product: String,
    pub quantity: i32,

    /// The customer to link, if any. Must already exist.
    pub customer_id: Option<CustomerId>,
}

impl CreateOrder {
    /// Creates a new CreateOrder command without a customer.
    pub fn new(product: impl Into<String>, quantity: i32) -> Self {
        Self {
            product: product.into(),
            quantity,
            customer_id: None,
        }
    }

    /// Creates a new CreateOrder command linked to a customer.
    pub fn for_customer(product: impl Into<String>, quantity: i32, customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Self::new(product, quantity)
        }
    }
}

/// Command to replace an order's product and quantity.
#[derive(Debug, Clone)]
pub struct UpdateOrder {
    /// The order to update.
    pub order_id: OrderId,

    pub product: String,
    pub quantity: i32,

    /// A new customer link. `None` keeps the current one.
    pub customer_id: Option<CustomerId>,
}

impl UpdateOrder {
    /// Creates a new UpdateOrder command that keeps the customer link.
    pub fn new(order_id: OrderId, product: impl Into<String>, quantity: i32) -> Self {
        Self {
            order_id,
            product: product.into(),
            quantity,
            customer_id: None,
        }
    }

    /// Sets the customer to link the order to.
    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }
}

/// Command to link an existing order to an existing customer.
#[derive(Debug, Clone, Copy)]
pub struct AssignCustomer {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
}

impl AssignCustomer {
    pub fn new(order_id: OrderId, customer_id: CustomerId) -> Self {
        Self {
            order_id,
            customer_id,
        }
    }
}
