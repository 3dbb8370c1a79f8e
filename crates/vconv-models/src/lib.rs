//! Shared data models for the video converter.
//!
//! This crate provides Serde-serializable types for:
//! - Conversion tasks and their on-disk layout
//! - Success markers and error log records

pub mod error;
pub mod record;
pub mod task;

// Re-export common types
pub use error::{ModelError, ModelResult};
pub use record::{ErrorDocument, ErrorLogRecord, ProcessStatus, ProcessedVideoRecord};
pub use task::{VideoId, VideoTask, DASH_DIR_NAME, MERGED_FILE_NAME};
