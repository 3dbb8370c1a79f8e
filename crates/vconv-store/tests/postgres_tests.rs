//! Postgres integration tests.
//!
//! Uses the same `POSTGRES_*` variables as the worker (a `.env` file is honoured).

use sqlx::{PgPool, Row};

use vconv_models::{ErrorDocument, ErrorLogRecord, VideoId, VideoTask};
use vconv_store::{
    connect, ensure_schema, ErrorLogStore, IdempotencyStore, PgErrorLogStore, PgIdempotencyStore,
    StoreConfig,
};

async fn test_pool() -> PgPool {
    dotenvy::dotenv().ok();
    let config = StoreConfig::from_env().expect("Invalid store config");
    let pool = connect(&config).await.expect("Failed to connect to Postgres");
    ensure_schema(&pool).await.expect("Failed to create schema");
    pool
}

/// A video id unlikely to collide with other test runs.
fn unique_video_id() -> VideoId {
    VideoId(-chrono::Utc::now().timestamp_micros())
}

/// Test success marking and lookup round-trip.
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_mark_and_check_processed() {
    let pool = test_pool().await;
    let store = PgIdempotencyStore::new(pool.clone());
    let video_id = unique_video_id();

    assert!(!store.check_processed(video_id).await.unwrap());

    assert!(store.mark_success(video_id).await.unwrap());
    assert!(store.check_processed(video_id).await.unwrap());

    // A second mark keeps exactly one row.
    assert!(!store.mark_success(video_id).await.unwrap());
    let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM processed_videos WHERE video_id = $1")
        .bind(video_id.as_i64())
        .fetch_one(&pool)
        .await
        .unwrap()
        .get("n");
    assert_eq!(count, 1);
}

/// Test that error rows are attributable to their video.
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_append_error_log() {
    let pool = test_pool().await;
    let store = PgErrorLogStore::new(pool.clone());
    let video_id = unique_video_id();
    let task = VideoTask::new(video_id, "/media/uploads/test");

    for message in ["failed to merge chunks", "failed to merge chunks"] {
        let doc = ErrorDocument::new(&task, message, "No such file or directory");
        store.append(&ErrorLogRecord::from(doc)).await.unwrap();
    }

    let rows = sqlx::query(
        "SELECT error_details FROM process_errors_log WHERE video_id = $1 ORDER BY id",
    )
    .bind(video_id.as_i64())
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 2);
    let details: serde_json::Value = rows[0].get("error_details");
    assert_eq!(details["video_id"], video_id.as_i64());
    assert_eq!(details["error"], "failed to merge chunks");
    assert_eq!(details["details"], "No such file or directory");
    assert!(details["time"].is_string());
}
