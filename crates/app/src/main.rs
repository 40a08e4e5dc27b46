//! Application entry point.
//!
//! Loads configuration, installs logging, connects the storage backend and
//! applies migrations, then runs a read-only startup check.

use app::{AppError, Config, Services, telemetry};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load configuration
    let config = Config::from_env()?;

    // 2. Initialize tracing
    telemetry::init(&config);
    tracing::info!(backend = config.backend(), "starting");

    // 3. Build services (connects and migrates when a database is configured)
    let services = Services::connect(&config).await?;

    // 4. Check the storage round trip
    let ctx = services.request_context();
    let customers = services.customers.list_customers(&ctx, 1, 0).await?;
    let orders = services.orders.list_orders(&ctx, 1, 0).await?;
    tracing::info!(
        backend = services.backend(),
        has_customers = !customers.is_empty(),
        has_orders = !orders.is_empty(),
        "services ready"
    );

    Ok(())
}
