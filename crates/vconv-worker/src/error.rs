//! Worker error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::stage::PipelineStage;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Everything that can stop a task.
///
/// `Display` describes the underlying cause; [`WorkerError::headline`] names
/// what the pipeline was doing when it failed.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Decode(#[from] vconv_models::ModelError),

    #[error(transparent)]
    StoreRead(vconv_store::StoreError),

    #[error(transparent)]
    Merge(#[from] vconv_media::MergeError),

    #[error("{path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Encode(#[from] vconv_media::EncodeError),

    #[error("{path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    StoreWrite(vconv_store::StoreError),
}

impl WorkerError {
    /// The stage in which this error occurs.
    pub fn stage(&self) -> PipelineStage {
        match self {
            WorkerError::Decode(_) => PipelineStage::Received,
            WorkerError::StoreRead(_) => PipelineStage::Gate,
            WorkerError::Merge(_) => PipelineStage::Merging,
            WorkerError::DirectoryCreate { .. } | WorkerError::Encode(_) => {
                PipelineStage::Encoding
            }
            WorkerError::Cleanup { .. } => PipelineStage::CleaningUp,
            WorkerError::StoreWrite(_) => PipelineStage::MarkingProcessed,
        }
    }

    /// Short description recorded under `error` in the error log.
    pub fn headline(&self) -> &'static str {
        match self {
            WorkerError::Decode(_) => "failed to decode task",
            WorkerError::StoreRead(_) => "failed to check processed status",
            WorkerError::Merge(_) => "failed to merge chunks",
            WorkerError::DirectoryCreate { .. } => "failed to create mpeg-dash directory",
            WorkerError::Encode(_) => "failed to convert to mpeg-dash",
            WorkerError::Cleanup { .. } => "failed to remove merged file",
            WorkerError::StoreWrite(_) => "failed to mark video as processed",
        }
    }
}
