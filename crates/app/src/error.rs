//! Startup error type.

use domain::DomainError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that stop the application from starting.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Startup check failed: {0}")]
    Domain(#[from] DomainError),
}
