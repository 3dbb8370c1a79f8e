//! Table bootstrap.
//!
//! Every statement is idempotent, so this is safe to run on each start.

use sqlx::PgPool;
use tracing::info;

use crate::error::StoreResult;

pub const PROCESSED_VIDEOS_TABLE: &str = "processed_videos";
pub const ERROR_LOG_TABLE: &str = "process_errors_log";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS processed_videos (
        video_id     BIGINT PRIMARY KEY,
        status       TEXT NOT NULL,
        processed_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS process_errors_log (
        id            BIGSERIAL PRIMARY KEY,
        video_id      BIGINT,
        error_details JSONB NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_process_errors_log_video_id
        ON process_errors_log (video_id)
    "#,
];

/// Create the tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> StoreResult<()> {
    for statement in SCHEMA {
        sqlx::query(*statement).execute(pool).await?;
    }
    info!(
        tables = ?[PROCESSED_VIDEOS_TABLE, ERROR_LOG_TABLE],
        "Schema ready"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_covers_both_tables() {
        let joined = SCHEMA.join("\n");
        assert!(joined.contains(&format!("CREATE TABLE IF NOT EXISTS {PROCESSED_VIDEOS_TABLE}")));
        assert!(joined.contains(&format!("CREATE TABLE IF NOT EXISTS {ERROR_LOG_TABLE}")));
        assert!(SCHEMA.iter().all(|s| s.contains("IF NOT EXISTS")));
    }
}
