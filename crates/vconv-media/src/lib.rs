//! Chunk reassembly and FFmpeg DASH packaging.
//!
//! This crate provides:
//! - Order-correct merging of uploaded `*.chunk` files
//! - Type-safe FFmpeg command building
//! - A [`DashEncoder`] port with an FFmpeg-backed implementation
//! - Artifact filesystem helpers

pub mod command;
pub mod encode;
pub mod error;
pub mod fs_utils;
pub mod merge;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
#[cfg(any(test, feature = "mocks"))]
pub use encode::MockDashEncoder;
pub use encode::{DashEncoder, EncodedPackage, FfmpegDashEncoder, MANIFEST_FILE_NAME};
pub use error::{EncodeError, EncodeResult, MergeError, MergeResult};
pub use merge::{chunk_sort_key, list_chunks, merge_chunks, ChunkFile, ChunkMerger, MergedArtifact};
