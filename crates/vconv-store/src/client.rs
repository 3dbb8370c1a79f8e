//! Pool bootstrap.

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::StoreConfig;
use crate::error::StoreResult;

/// Open a connection pool and verify the database answers.
pub async fn connect(config: &StoreConfig) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout)
        .connect_with(config.connect_options()?)
        .await?;

    ping(&pool).await?;
    info!(url = %config.redacted_url(), "Connected to Postgres");
    Ok(pool)
}

/// Round-trip a trivial query.
pub async fn ping(pool: &PgPool) -> StoreResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
