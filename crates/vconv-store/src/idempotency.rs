//! Success markers for converted videos.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, info};

use vconv_models::{ProcessStatus, ProcessedVideoRecord, VideoId};

use crate::error::StoreResult;

/// Durable record of which videos finished converting.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Whether a success record exists for `video_id`.
    ///
    /// Errors are returned as-is; whether a failed lookup counts as
    /// "not processed" is the caller's policy.
    async fn check_processed(&self, video_id: VideoId) -> StoreResult<bool>;

    /// Insert the success record for `video_id`.
    ///
    /// Returns `false` when a record already existed.
    async fn mark_success(&self, video_id: VideoId) -> StoreResult<bool>;
}

/// [`IdempotencyStore`] over the `processed_videos` table.
#[derive(Debug, Clone)]
pub struct PgIdempotencyStore {
    pool: PgPool,
}

impl PgIdempotencyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdempotencyStore for PgIdempotencyStore {
    async fn check_processed(&self, video_id: VideoId) -> StoreResult<bool> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM processed_videos WHERE video_id = $1 AND status = $2
            ) AS exists
            "#,
        )
        .bind(video_id.as_i64())
        .bind(ProcessStatus::Success.as_str())
        .fetch_one(&self.pool)
        .await?;

        let exists: bool = row.try_get("exists")?;
        if exists {
            debug!(video_id = %video_id, "Video already processed");
        }
        Ok(exists)
    }

    async fn mark_success(&self, video_id: VideoId) -> StoreResult<bool> {
        let record = ProcessedVideoRecord::success(video_id);
        let result = sqlx::query(
            r#"
            INSERT INTO processed_videos (video_id, status, processed_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (video_id) DO NOTHING
            "#,
        )
        .bind(record.video_id.as_i64())
        .bind(record.status.as_str())
        .bind(record.processed_at)
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() > 0;
        if inserted {
            info!(video_id = %video_id, "Video marked as processed");
        } else {
            debug!(video_id = %video_id, "Video was already marked as processed");
        }
        Ok(inserted)
    }
}
