//! Commands for customer use-cases.

use common::CustomerId;

/// Command to create a new customer.
#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub name: String,
    pub email: String,
}

impl CreateCustomer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Command to replace a customer's name and email.
#[derive(Debug, Clone)]
pub struct UpdateCustomer {
    /// The customer to update.
    pub customer_id: CustomerId,

    pub name: String,
    pub email: String,
}

impl UpdateCustomer {
    pub fn new(customer_id: CustomerId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            customer_id,
            name: name.into(),
            email: email.into(),
        }
    }
}
