//! Customer entity.

use std::sync::LazyLock;

use common::CustomerId;
use regex::Regex;
use serde::Serialize;

use crate::error::ValidationError;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern compiles")
});

/// Returns true if the email matches the accepted address pattern.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

fn validate(name: &str, email: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

/// A customer as seen by the use-case layer.
///
/// The id is `None` until the repository assigns one on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    id: Option<CustomerId>,
    name: String,
    email: String,
}

impl Customer {
    /// Creates a validated, not yet persisted customer.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let email = email.into();
        validate(&name, &email)?;

        Ok(Self {
            id: None,
            name,
            email,
        })
    }

    /// Rebuilds a customer from a stored row without validation.
    pub fn restore(id: CustomerId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            email: email.into(),
        }
    }

    /// Replaces name and email. On failure the customer is left unchanged.
    pub fn update(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let name = name.into();
        let email = email.into();
        validate(&name, &email)?;

        self.name = name;
        self.email = email;
        Ok(())
    }

    pub fn id(&self) -> Option<CustomerId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}
