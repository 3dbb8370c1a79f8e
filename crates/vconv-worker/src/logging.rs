//! Structured task logging utilities.
//!
//! Provides consistent, structured logging for task processing with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};
use vconv_models::VideoId;

use crate::stage::PipelineStage;

/// Task logger for structured logging with consistent formatting.
///
/// Every event carries the video ID and the operation name.
#[derive(Debug, Clone)]
pub struct TaskLogger {
    video_id: VideoId,
    operation: String,
}

impl TaskLogger {
    /// Create a new task logger for a specific video and operation.
    ///
    /// # Arguments
    /// * `video_id` - The video being converted
    /// * `operation` - The type of operation (e.g., "convert")
    pub fn new(video_id: VideoId, operation: &str) -> Self {
        Self {
            video_id,
            operation: operation.to_string(),
        }
    }

    /// Log the start of a task.
    pub fn log_start(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            operation = %self.operation,
            stage = PipelineStage::Received.as_str(),
            "Task started: {}", message
        );
    }

    /// Log entry into a pipeline stage.
    pub fn log_stage(&self, stage: PipelineStage, message: &str) {
        info!(
            video_id = %self.video_id,
            operation = %self.operation,
            stage = stage.as_str(),
            "{}", message
        );
    }

    /// Log a warning during task execution.
    pub fn log_warning(&self, message: &str) {
        warn!(
            video_id = %self.video_id,
            operation = %self.operation,
            "Task warning: {}", message
        );
    }

    /// Log the failure of a task.
    pub fn log_failure(&self, stage: PipelineStage, message: &str) {
        error!(
            video_id = %self.video_id,
            operation = %self.operation,
            stage = PipelineStage::Failed.as_str(),
            failed_stage = stage.as_str(),
            "Task failed: {}", message
        );
    }

    /// Log the completion of a task.
    pub fn log_completion(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            operation = %self.operation,
            stage = PipelineStage::Done.as_str(),
            "Task completed: {}", message
        );
    }

    pub fn video_id(&self) -> VideoId {
        self.video_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this task.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "task",
            video_id = %self.video_id,
            operation = %self.operation
        )
    }
}
