//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{EncodeError, EncodeResult};

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            log_level: "error".to_string(),
        }
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the output container format (`-f`).
    pub fn format(self, format: impl Into<String>) -> Self {
        self.output_arg("-f").output_arg(format)
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments. Existing output is always overwritten.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string()];

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        args.extend(self.input_args.clone());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands.
///
/// Stdout and stderr are captured into one buffer in arrival order. Without a
/// timeout the runner waits as long as the process runs.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a new runner for `ffmpeg` on PATH.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            timeout: None,
        }
    }

    /// Use a specific program instead of `ffmpeg` from PATH.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run an FFmpeg command, returning its combined output on success.
    pub async fn run(&self, cmd: &FfmpegCommand) -> EncodeResult<String> {
        self.run_args(cmd.build_args()).await
    }

    /// Run the program with raw arguments.
    pub async fn run_args(&self, args: Vec<String>) -> EncodeResult<String> {
        debug!("Running {}: {}", self.program.display(), args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(EncodeError::Spawn)?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, tx));
        }
        // The channel closes once both pipes hit EOF.
        let collector = tokio::spawn(async move {
            let mut output = String::new();
            while let Some(line) = rx.recv().await {
                output.push_str(&line);
            }
            output
        });

        let status = self.wait_for_completion(&mut child).await?;
        let output = match collector.await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "Output collector failed, captured output is lost");
                String::new()
            }
        };

        if status.success() {
            Ok(output)
        } else {
            Err(EncodeError::ffmpeg_failed(status.code(), output))
        }
    }

    /// Wait for child process with the optional timeout.
    async fn wait_for_completion(
        &self,
        child: &mut Child,
    ) -> EncodeResult<std::process::ExitStatus> {
        let Some(timeout) = self.timeout else {
            return Ok(child.wait().await?);
        };

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => Ok(status?),
            Err(_) => {
                warn!(
                    "{} timed out after {:?}, killing process",
                    self.program.display(),
                    timeout
                );
                let _ = child.kill().await;
                Err(EncodeError::Timeout(timeout))
            }
        }
    }
}

/// Forward every line (with its terminator) of a pipe into the shared buffer.
async fn forward_lines<R>(pipe: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                if tx.send(String::from_utf8_lossy(&buf).into_owned()).is_err() {
                    break;
                }
            }
        }
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> EncodeResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| EncodeError::FfmpegNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd =
            FfmpegCommand::new("/up/1/merged.mp4", "/up/1/mpeg-dash/output.mpd").format("dash");

        let args = cmd.build_args();
        assert_eq!(
            args,
            vec![
                "-y",
                "-v",
                "error",
                "-i",
                "/up/1/merged.mp4",
                "-f",
                "dash",
                "/up/1/mpeg-dash/output.mpd",
            ]
        );
    }

    #[test]
    fn test_command_builder_options() {
        let cmd = FfmpegCommand::new("in.mp4", "out.mpd")
            .log_level("info")
            .input_arg("-nostdin")
            .output_args(["-seg_duration", "4"]);

        let args = cmd.build_args();
        assert_eq!(&args[..4], &["-y", "-v", "info", "-nostdin"]);
        assert_eq!(args.last().map(String::as_str), Some("out.mpd"));
        assert!(args.windows(2).any(|w| w == ["-seg_duration", "4"]));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runner_captures_combined_output() {
        let runner = FfmpegRunner::new().with_program("sh");
        let output = runner
            .run_args(vec!["-c".into(), "echo out; echo err 1>&2".into()])
            .await
            .unwrap();

        assert!(output.contains("out\n"));
        assert!(output.contains("err\n"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runner_failure_carries_output() {
        let runner = FfmpegRunner::new().with_program("sh");
        let err = runner
            .run_args(vec!["-c".into(), "echo 'Invalid data found' 1>&2; exit 3".into()])
            .await
            .unwrap_err();

        match err {
            EncodeError::Failed { exit_code, output } => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(output, "Invalid data found\n");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runner_timeout_kills_process() {
        let runner = FfmpegRunner::new()
            .with_program("sleep")
            .with_timeout(Some(Duration::from_millis(200)));

        let err = runner.run_args(vec!["5".into()]).await.unwrap_err();
        match err {
            EncodeError::Timeout(after) => assert_eq!(after, Duration::from_millis(200)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_runner_spawn_failure() {
        let runner = FfmpegRunner::new().with_program("/nonexistent/ffmpeg-binary");
        let err = runner.run_args(vec![]).await.unwrap_err();
        assert!(matches!(err, EncodeError::Spawn(_)));
    }
}
