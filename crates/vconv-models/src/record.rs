//! Persisted records: success markers and error log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{VideoId, VideoTask};

/// Processing status stored in `processed_videos.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    #[default]
    Success,
}

impl ProcessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Success => "success",
        }
    }
}

impl std::fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable marker that a video finished converting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedVideoRecord {
    pub video_id: VideoId,
    pub status: ProcessStatus,
    pub processed_at: DateTime<Utc>,
}

impl ProcessedVideoRecord {
    /// A success record stamped with the current time.
    pub fn success(video_id: VideoId) -> Self {
        Self {
            video_id,
            status: ProcessStatus::Success,
            processed_at: Utc::now(),
        }
    }
}

/// Structured description of a failure, as logged and persisted.
///
/// Serializes to `{"video_id", "error", "details", "time"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDocument {
    pub video_id: VideoId,
    /// Short headline of what the pipeline was doing.
    pub error: String,
    /// Description of the underlying cause.
    pub details: String,
    pub time: DateTime<Utc>,
}

impl ErrorDocument {
    pub fn new(task: &VideoTask, error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            video_id: task.video_id,
            error: error.into(),
            details: details.into(),
            time: Utc::now(),
        }
    }

    /// JSON rendering used for both logs and storage.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "video_id": self.video_id,
            "error": self.error,
            "details": self.details,
            "time": self.time,
        })
    }
}

/// Append-only error log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLogRecord {
    pub video_id: VideoId,
    pub details: ErrorDocument,
    pub created_at: DateTime<Utc>,
}

impl From<ErrorDocument> for ErrorLogRecord {
    fn from(details: ErrorDocument) -> Self {
        Self {
            video_id: details.video_id,
            created_at: details.time,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(ProcessStatus::Success.as_str(), "success");
        assert_eq!(
            serde_json::to_string(&ProcessStatus::Success).unwrap(),
            "\"success\""
        );
    }

    #[test]
    fn test_error_document_shape() {
        let task = VideoTask::new(VideoId(42), "/media/uploads/42");
        let doc = ErrorDocument::new(&task, "failed to merge chunks", "disk full");
        let json = doc.to_json();

        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert_eq!(obj["video_id"], 42);
        assert_eq!(obj["error"], "failed to merge chunks");
        assert_eq!(obj["details"], "disk full");
        assert!(obj["time"].is_string());

        // Serde derive and the explicit rendering agree.
        assert_eq!(serde_json::to_value(&doc).unwrap(), json);
    }

    #[test]
    fn test_error_log_record_from_document() {
        let task = VideoTask::new(VideoId(5), "/tmp/5");
        let doc = ErrorDocument::new(&task, "failed to encode", "exit 1");
        let record = ErrorLogRecord::from(doc.clone());
        assert_eq!(record.video_id, VideoId(5));
        assert_eq!(record.created_at, doc.time);
        assert_eq!(record.details, doc);
    }
}
