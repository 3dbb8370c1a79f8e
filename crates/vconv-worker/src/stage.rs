//! Pipeline stages and task outcomes.

use std::fmt;
use std::path::PathBuf;

use vconv_models::VideoId;

use crate::error::WorkerError;

/// Position of a task in the conversion pipeline.
///
/// `Received -> Gate -> Merging -> Encoding -> CleaningUp -> MarkingProcessed -> Done`,
/// with `Failed` reachable from every non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Received,
    Gate,
    Merging,
    Encoding,
    CleaningUp,
    MarkingProcessed,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "received",
            PipelineStage::Gate => "gate",
            PipelineStage::Merging => "merging",
            PipelineStage::Encoding => "encoding",
            PipelineStage::CleaningUp => "cleaning_up",
            PipelineStage::MarkingProcessed => "marking_processed",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a completed conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub video_id: VideoId,
    pub chunk_count: usize,
    pub bytes_merged: u64,
    pub manifest: PathBuf,
    /// `false` if another run had already written the success record.
    pub newly_marked: bool,
}

/// How a task ended.
#[derive(Debug)]
pub enum TaskOutcome {
    /// A success record existed; nothing was done.
    AlreadyProcessed,
    Completed(TaskReport),
    /// The stage that failed and the error that was recorded.
    Failed {
        stage: PipelineStage,
        error: WorkerError,
    },
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, TaskOutcome::Failed { .. })
    }

    /// The stage this outcome terminated in.
    pub fn final_stage(&self) -> PipelineStage {
        match self {
            TaskOutcome::AlreadyProcessed | TaskOutcome::Completed(_) => PipelineStage::Done,
            TaskOutcome::Failed { .. } => PipelineStage::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(PipelineStage::MarkingProcessed.as_str(), "marking_processed");
        assert_eq!(PipelineStage::CleaningUp.to_string(), "cleaning_up");
        assert!(PipelineStage::Done.is_terminal());
        assert!(PipelineStage::Failed.is_terminal());
        assert!(!PipelineStage::Encoding.is_terminal());
    }

    #[test]
    fn test_outcome_success() {
        assert!(TaskOutcome::AlreadyProcessed.is_success());
        assert_eq!(TaskOutcome::AlreadyProcessed.final_stage(), PipelineStage::Done);

        let failed = TaskOutcome::Failed {
            stage: PipelineStage::Encoding,
            error: WorkerError::Encode(vconv_media::EncodeError::Timeout(
                std::time::Duration::from_secs(5),
            )),
        };
        assert!(!failed.is_success());
        assert_eq!(failed.final_stage(), PipelineStage::Failed);
    }
}
