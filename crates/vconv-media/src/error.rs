//! Error types for media operations.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for chunk merging.
pub type MergeResult<T> = Result<T, MergeError>;

/// Result type for encoding.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Errors that can occur while reassembling chunks.
///
/// When a merge fails the output file may exist on disk but is never valid.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("failed to list chunks in {dir}: {source}")]
    ChunkEnumeration {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output file {path}: {source}")]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open chunk {chunk}: {source}")]
    ChunkOpen {
        chunk: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read chunk {chunk}: {source}")]
    ChunkRead {
        chunk: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to flush output file {path}: {source}")]
    OutputFlush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MergeError {
    /// The chunk that caused the failure, if the failure is chunk-specific.
    pub fn chunk(&self) -> Option<&PathBuf> {
        match self {
            MergeError::ChunkOpen { chunk, .. } | MergeError::ChunkRead { chunk, .. } => {
                Some(chunk)
            }
            _ => None,
        }
    }
}

/// Errors that can occur while producing the DASH package.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn FFmpeg: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("FFmpeg exited with {}: {output}", exit_label(.exit_code))]
    Failed {
        exit_code: Option<i32>,
        /// Combined stdout and stderr, verbatim.
        output: String,
    },

    #[error("FFmpeg timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("status {code}"),
        None => "signal".to_string(),
    }
}

impl EncodeError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(exit_code: Option<i32>, output: impl Into<String>) -> Self {
        Self::Failed {
            exit_code,
            output: output.into(),
        }
    }

    /// Captured program output, when the program ran to completion.
    pub fn output(&self) -> Option<&str> {
        match self {
            EncodeError::Failed { output, .. } => Some(output),
            _ => None,
        }
    }
}
