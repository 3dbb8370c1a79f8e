//! DASH packaging of the merged artifact.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use crate::command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
use crate::error::{EncodeError, EncodeResult};

/// Manifest file name written into the output directory.
pub const MANIFEST_FILE_NAME: &str = "output.mpd";

/// A manifest plus its segment files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPackage {
    pub output_dir: PathBuf,
    pub manifest: PathBuf,
}

impl EncodedPackage {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        let output_dir = output_dir.into();
        Self {
            manifest: output_dir.join(MANIFEST_FILE_NAME),
            output_dir,
        }
    }
}

/// Transcodes a media file into an adaptive-bitrate package.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait DashEncoder: Send + Sync {
    /// Produce `output_dir/output.mpd` and its segments from `input`.
    async fn encode(&self, input: &Path, output_dir: &Path) -> EncodeResult<EncodedPackage>;
}

/// [`DashEncoder`] backed by the `ffmpeg` CLI.
#[derive(Debug, Clone)]
pub struct FfmpegDashEncoder {
    log_level: String,
    timeout: Option<Duration>,
}

impl Default for FfmpegDashEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegDashEncoder {
    pub fn new() -> Self {
        Self {
            log_level: "error".to_string(),
            timeout: None,
        }
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Bound the FFmpeg run. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The command used to package `input` into `output_dir`.
    pub fn command(&self, input: &Path, output_dir: &Path) -> FfmpegCommand {
        FfmpegCommand::new(input, output_dir.join(MANIFEST_FILE_NAME))
            .log_level(self.log_level.clone())
            .format("dash")
    }
}

#[async_trait]
impl DashEncoder for FfmpegDashEncoder {
    async fn encode(&self, input: &Path, output_dir: &Path) -> EncodeResult<EncodedPackage> {
        let program = check_ffmpeg()?;

        fs::create_dir_all(output_dir)
            .await
            .map_err(|source| EncodeError::OutputDir {
                path: output_dir.to_path_buf(),
                source,
            })?;

        let cmd = self.command(input, output_dir);
        FfmpegRunner::new()
            .with_program(program)
            .with_timeout(self.timeout)
            .run(&cmd)
            .await?;

        let package = EncodedPackage::new(output_dir);
        info!(manifest = %package.manifest.display(), "DASH package written");
        Ok(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_package_layout() {
        let package = EncodedPackage::new("/up/1/mpeg-dash");
        assert_eq!(package.manifest, PathBuf::from("/up/1/mpeg-dash/output.mpd"));
    }

    #[test]
    fn test_dash_command() {
        let encoder = FfmpegDashEncoder::new().with_log_level("warning");
        let args = encoder
            .command(Path::new("/up/1/merged.mp4"), Path::new("/up/1/mpeg-dash"))
            .build_args();

        assert_eq!(
            args,
            vec![
                "-y",
                "-v",
                "warning",
                "-i",
                "/up/1/merged.mp4",
                "-f",
                "dash",
                "/up/1/mpeg-dash/output.mpd",
            ]
        );
    }

    #[tokio::test]
    async fn test_mock_encoder() {
        let mut encoder = MockDashEncoder::new();
        encoder
            .expect_encode()
            .times(1)
            .returning(|_, _| Err(EncodeError::ffmpeg_failed(Some(1), "boom")));

        let err = encoder
            .encode(Path::new("in.mp4"), Path::new("out"))
            .await
            .unwrap_err();
        assert_eq!(err.output(), Some("boom"));
    }

    // Needs a real ffmpeg on PATH.
    #[tokio::test]
    #[ignore = "requires ffmpeg"]
    async fn test_ffmpeg_encodes_to_dash() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("merged.mp4");
        let source = FfmpegCommand::new("testsrc=duration=2:size=160x120:rate=10", &input)
            .input_arg("-f")
            .input_arg("lavfi")
            .output_args(["-pix_fmt", "yuv420p"]);
        FfmpegRunner::new().run(&source).await.unwrap();

        let out = dir.path().join("mpeg-dash");
        let package = FfmpegDashEncoder::new().encode(&input, &out).await.unwrap();
        assert!(package.manifest.exists());
    }
}
