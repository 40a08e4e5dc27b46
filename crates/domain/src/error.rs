//! Domain error types.

use common::ContextError;
use thiserror::Error;

use crate::ports::RepositoryError;

/// A field failed an entity invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Customer name is empty.
    #[error("Customer name cannot be empty")]
    EmptyName,

    /// Email does not match the accepted pattern.
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    /// Order product is empty.
    #[error("Product cannot be empty")]
    EmptyProduct,

    /// Order quantity is zero or negative.
    #[error("Invalid quantity: {0} (must be greater than 0)")]
    InvalidQuantity(i32),

    /// A referenced customer id is zero or negative.
    #[error("Invalid customer id: {0} (must be greater than 0)")]
    InvalidCustomerId(i64),
}

/// Coarse classification of a [`DomainError`].
///
/// Outer layers branch on this instead of matching individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Duplicate,
    Database,
    Cancelled,
}

impl ErrorKind {
    /// Returns true if the caller supplied bad input or referenced a missing entity.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::Validation | ErrorKind::NotFound | ErrorKind::Duplicate
        )
    }

    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::Database => "database",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur during use-case operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Input failed entity validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced entity has no stored row.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The email is already used by another customer.
    #[error("Email already in use by another customer: {email}")]
    DuplicateEmail { email: String },

    /// The repository failed.
    #[error("Database error during {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: RepositoryError,
    },

    /// The caller's context finished before the operation completed.
    #[error("Operation cancelled: {0}")]
    Cancelled(#[from] ContextError),
}

impl DomainError {
    /// Creates a not-found error for the given entity name and id.
    pub fn not_found(entity: &'static str, id: impl Into<i64>) -> Self {
        DomainError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Wraps a repository failure with the name of the failing operation.
    ///
    /// Cancellation is surfaced as [`DomainError::Cancelled`], not as a
    /// database failure.
    pub fn database(operation: &'static str, source: RepositoryError) -> Self {
        match source {
            RepositoryError::Cancelled(reason) => DomainError::Cancelled(reason),
            source => DomainError::Database { operation, source },
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::DuplicateEmail { .. } => ErrorKind::Duplicate,
            DomainError::Database { .. } => ErrorKind::Database,
            DomainError::Cancelled(_) => ErrorKind::Cancelled,
        }
    }

    /// Returns true for validation failures, including duplicate emails.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::Duplicate)
    }
}
