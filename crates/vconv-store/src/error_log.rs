//! Append-only failure log.

use async_trait::async_trait;
use sqlx::PgPool;

use vconv_models::ErrorLogRecord;

use crate::error::StoreResult;

/// Destination for structured failure records.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait ErrorLogStore: Send + Sync {
    async fn append(&self, record: &ErrorLogRecord) -> StoreResult<()>;
}

/// [`ErrorLogStore`] over the `process_errors_log` table.
#[derive(Debug, Clone)]
pub struct PgErrorLogStore {
    pool: PgPool,
}

impl PgErrorLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ErrorLogStore for PgErrorLogStore {
    async fn append(&self, record: &ErrorLogRecord) -> StoreResult<()> {
        let details = serde_json::to_value(&record.details)?;

        sqlx::query(
            r#"
            INSERT INTO process_errors_log (video_id, error_details, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(record.video_id.as_i64())
        .bind(details)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
