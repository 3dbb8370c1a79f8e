//! Ordered reassembly of uploaded chunks into a single media file.
//!
//! Chunks are the `*.chunk` files of a task directory. Each carries a
//! sequence number: the first run of ASCII digits in its file name.
//! Chunks are concatenated byte-for-byte in ascending sequence order.
//!
//! Ordering policy:
//! - chunks without a sequence number sort before every numbered chunk
//! - numbered chunks sort by their number, not lexicographically
//! - chunks sharing a number are ordered by file name

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::{MergeError, MergeResult};

/// File name suffix identifying chunk files.
pub const CHUNK_SUFFIX: &str = ".chunk";

// `\d` would also match non-ASCII digits.
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit run pattern is valid"));

/// Sequence number of a chunk: the first digit run of its base name.
///
/// Returns `None` when the name has no digits or the run does not fit in a `u64`.
pub fn chunk_sort_key(path: &Path) -> Option<u64> {
    let name = path.file_name()?.to_string_lossy();
    DIGIT_RUN
        .find(&name)
        .and_then(|m| m.as_str().parse().ok())
}

/// A chunk file together with its ordering key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFile {
    pub path: PathBuf,
    pub key: Option<u64>,
    name: String,
}

impl ChunkFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            key: chunk_sort_key(&path),
            path,
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Ord for ChunkFile {
    fn cmp(&self, other: &Self) -> Ordering {
        // `None < Some(_)`, so keyless chunks come first.
        self.key
            .cmp(&other.key)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialOrd for ChunkFile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of a successful merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedArtifact {
    pub path: PathBuf,
    pub chunk_count: usize,
    pub bytes_written: u64,
}

/// List the chunk files of `dir` in merge order.
pub async fn list_chunks(dir: &Path) -> MergeResult<Vec<ChunkFile>> {
    let enumeration = |source| MergeError::ChunkEnumeration {
        dir: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir).await.map_err(enumeration)?;
    let mut chunks = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(enumeration)? {
        let name = entry.file_name();
        if !name.to_string_lossy().ends_with(CHUNK_SUFFIX) {
            continue;
        }
        let path = entry.path();
        // Follows symlinks. A chunk that cannot be inspected fails the merge;
        // only entries known not to be regular files are passed over.
        let metadata = fs::metadata(&path)
            .await
            .map_err(|source| MergeError::ChunkOpen {
                chunk: path.clone(),
                source,
            })?;
        if metadata.is_file() {
            chunks.push(ChunkFile::new(path));
        }
    }

    chunks.sort();
    Ok(chunks)
}

/// Concatenate every chunk of `dir` into `output`.
///
/// Each chunk is opened, drained and closed before the next is opened. On
/// error the merge stops immediately; whatever was written to `output` must
/// be treated as invalid.
pub async fn merge_chunks(dir: &Path, output: &Path) -> MergeResult<MergedArtifact> {
    let chunks = list_chunks(dir).await?;
    debug!(dir = %dir.display(), chunks = chunks.len(), "Merging chunks");

    let mut out = File::create(output)
        .await
        .map_err(|source| MergeError::OutputCreate {
            path: output.to_path_buf(),
            source,
        })?;

    let mut bytes_written = 0u64;
    for chunk in &chunks {
        let mut input = File::open(&chunk.path)
            .await
            .map_err(|source| MergeError::ChunkOpen {
                chunk: chunk.path.clone(),
                source,
            })?;

        bytes_written += tokio::io::copy(&mut input, &mut out)
            .await
            .map_err(|source| MergeError::ChunkRead {
                chunk: chunk.path.clone(),
                source,
            })?;
    }

    out.flush().await.map_err(|source| MergeError::OutputFlush {
        path: output.to_path_buf(),
        source,
    })?;

    Ok(MergedArtifact {
        path: output.to_path_buf(),
        chunk_count: chunks.len(),
        bytes_written,
    })
}

/// Merges a task directory's chunks into a single file.
#[derive(Debug, Clone, Default)]
pub struct ChunkMerger;

impl ChunkMerger {
    pub fn new() -> Self {
        Self
    }

    pub async fn merge(&self, dir: &Path, output: &Path) -> MergeResult<MergedArtifact> {
        let artifact = merge_chunks(dir, output).await.inspect_err(|e| {
            if let Some(chunk) = e.chunk() {
                warn!(chunk = %chunk.display(), "Merge aborted on chunk");
            }
        })?;
        info!(
            path = %artifact.path.display(),
            chunks = artifact.chunk_count,
            bytes = artifact.bytes_written,
            "Chunks merged"
        );
        Ok(artifact)
    }
}
