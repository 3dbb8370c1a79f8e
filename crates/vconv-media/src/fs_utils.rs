//! Filesystem helpers for task artifacts.

use std::path::Path;
use tokio::fs;

/// Create `dir` and any missing parents.
pub async fn ensure_dir(dir: impl AsRef<Path>) -> std::io::Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).await?;
    tracing::debug!("Ensured directory exists: {}", dir.display());
    Ok(())
}

/// Delete an intermediate artifact.
///
/// A missing file is an error: the artifact is expected to exist at cleanup.
pub async fn remove_artifact(path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    fs::remove_file(path).await?;
    tracing::debug!("Removed artifact: {}", path.display());
    Ok(())
}
