//! Best-effort failure recording.

use std::error::Error as StdError;

use tracing::error;

use vconv_models::{ErrorDocument, ErrorLogRecord, VideoTask};
use vconv_store::ErrorLogStore;

/// Logs failures and appends them to the error log.
///
/// Recording never fails from the caller's point of view: if the error log
/// cannot be written, that is logged and the task's own failure stands.
pub struct ErrorRecorder<L> {
    store: L,
}

impl<L: ErrorLogStore> ErrorRecorder<L> {
    pub fn new(store: L) -> Self {
        Self { store }
    }

    /// Record a failure of `task`.
    pub async fn record(
        &self,
        task: &VideoTask,
        message: &str,
        cause: &(dyn StdError + Send + Sync),
    ) {
        let document = ErrorDocument::new(task, message, cause.to_string());
        error!(
            video_id = %task.video_id,
            error_details = %document.to_json(),
            "Processing error"
        );

        if let Err(e) = self.store.append(&ErrorLogRecord::from(document)).await {
            error!(
                video_id = %task.video_id,
                original_error = message,
                error = %e,
                "Failed to persist error record"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use vconv_models::VideoId;
    use vconv_store::{MockErrorLogStore, StoreError};

    #[tokio::test]
    async fn test_record_persists_document() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);

        let mut store = MockErrorLogStore::new();
        store.expect_append().times(1).returning(move |record| {
            sink.lock().unwrap().push(ErrorLogRecord::clone(record));
            Ok(())
        });

        let recorder = ErrorRecorder::new(store);
        let task = VideoTask::new(VideoId(9), "/media/uploads/9");
        let cause = std::io::Error::other("disk full");
        recorder.record(&task, "failed to merge chunks", &cause).await;

        let records = captured.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].video_id, task.video_id);
        assert_eq!(records[0].details.error, "failed to merge chunks");
        assert_eq!(records[0].details.details, "disk full");
    }

    #[tokio::test]
    async fn test_record_swallows_persistence_failure() {
        let mut store = MockErrorLogStore::new();
        store
            .expect_append()
            .times(1)
            .returning(|_| Err(StoreError::config("connection refused")));

        let recorder = ErrorRecorder::new(store);
        let task = VideoTask::new(VideoId(9), "/media/uploads/9");
        let cause = std::io::Error::other("boom");

        // Completes without panicking or surfacing the store error.
        recorder.record(&task, "failed to convert to mpeg-dash", &cause).await;
    }
}
