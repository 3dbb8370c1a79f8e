//! Inbound conversion task.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{ModelError, ModelResult};

/// File name of the merged artifact inside a task directory.
pub const MERGED_FILE_NAME: &str = "merged.mp4";

/// Directory (relative to the task directory) holding the DASH package.
pub const DASH_DIR_NAME: &str = "mpeg-dash";

/// Identifier of an uploaded video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub i64);

impl VideoId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for VideoId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A single conversion request delivered by the upload pipeline.
///
/// `path` is the directory holding the video's `*.chunk` files. The worker
/// writes the merged artifact and the DASH package underneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoTask {
    pub video_id: VideoId,
    pub path: PathBuf,
}

impl VideoTask {
    pub fn new(video_id: VideoId, path: impl Into<PathBuf>) -> Self {
        Self {
            video_id,
            path: path.into(),
        }
    }

    /// Decode a task from its JSON payload.
    pub fn decode(payload: &[u8]) -> ModelResult<Self> {
        let task: VideoTask = serde_json::from_slice(payload)?;
        if task.path.as_os_str().is_empty() {
            return Err(ModelError::invalid_task("path must not be empty"));
        }
        Ok(task)
    }

    /// Chunk directory for this task.
    pub fn chunk_dir(&self) -> &Path {
        &self.path
    }

    /// Location of the merged artifact (`path/merged.mp4`).
    pub fn merged_file(&self) -> PathBuf {
        self.path.join(MERGED_FILE_NAME)
    }

    /// Output directory for the DASH package (`path/mpeg-dash`).
    pub fn dash_dir(&self) -> PathBuf {
        self.path.join(DASH_DIR_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_task() {
        let task = VideoTask::decode(br#"{"video_id":1,"path":"/media/uploads/1"}"#).unwrap();
        assert_eq!(task.video_id, VideoId(1));
        assert_eq!(task.path, PathBuf::from("/media/uploads/1"));
    }

    #[test]
    fn test_decode_rejects_malformed_payload() {
        assert!(matches!(
            VideoTask::decode(b"not json"),
            Err(ModelError::Decode(_))
        ));
        assert!(matches!(
            VideoTask::decode(br#"{"video_id":"one","path":"/x"}"#),
            Err(ModelError::Decode(_))
        ));
        assert!(matches!(
            VideoTask::decode(br#"{"path":"/x"}"#),
            Err(ModelError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_empty_path() {
        assert!(matches!(
            VideoTask::decode(br#"{"video_id":3,"path":""}"#),
            Err(ModelError::InvalidTask(_))
        ));
    }

    #[test]
    fn test_task_layout() {
        let task = VideoTask::new(VideoId(7), "/media/uploads/7");
        assert_eq!(task.merged_file(), PathBuf::from("/media/uploads/7/merged.mp4"));
        assert_eq!(task.dash_dir(), PathBuf::from("/media/uploads/7/mpeg-dash"));
        assert_eq!(task.chunk_dir(), Path::new("/media/uploads/7"));
    }
}
