//! Video conversion worker binary.
//!
//! Usage: `vconv-worker '<task json>'`, `vconv-worker -` (payload on stdin),
//! or no argument with the payload in `VCONV_TASK`.

use std::io::Read;
use std::process::ExitCode;

use anyhow::{bail, Context};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vconv_media::FfmpegDashEncoder;
use vconv_store::{connect, ensure_schema, PgErrorLogStore, PgIdempotencyStore, StoreConfig};
use vconv_worker::{TaskDispatcher, TaskOutcome, WorkerConfig};

const USAGE: &str =
    "usage: vconv-worker <task-json> | vconv-worker - | VCONV_TASK=<task-json> vconv-worker";

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting vconv-worker");

    let payload = match read_payload() {
        Ok(Some(p)) => p,
        Ok(None) => {
            error!("{}", USAGE);
            return ExitCode::from(2);
        }
        Err(e) => {
            error!("Failed to read task payload: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let store_config = match StoreConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid store configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pool = match connect(&store_config).await {
        Ok(p) => p,
        Err(e) => {
            error!(url = %store_config.redacted_url(), "Failed to connect to Postgres: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.bootstrap_schema {
        if let Err(e) = ensure_schema(&pool).await {
            error!("Failed to create schema: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let encoder = FfmpegDashEncoder::new()
        .with_log_level(config.ffmpeg_log_level.clone())
        .with_timeout(config.encode_timeout);

    let dispatcher = TaskDispatcher::new(
        config,
        PgIdempotencyStore::new(pool.clone()),
        encoder,
        PgErrorLogStore::new(pool.clone()),
    );

    let code = match dispatcher.handle(&payload).await {
        Ok(outcome) => {
            match &outcome {
                TaskOutcome::Completed(report) => info!(
                    video_id = %report.video_id,
                    manifest = %report.manifest.display(),
                    "Video processing completed"
                ),
                TaskOutcome::AlreadyProcessed => info!("Video already processed, nothing to do"),
                TaskOutcome::Failed { stage, .. } => {
                    error!(stage = stage.as_str(), "Video processing failed")
                }
            }
            info!(final_stage = %outcome.final_stage(), "Task finished");

            if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("Rejected task payload: {}", e);
            ExitCode::FAILURE
        }
    };

    pool.close().await;
    info!("Worker shutdown complete");
    code
}

/// Colored output for dev, JSON for production.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vconv=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Payload from argv, stdin (`-`) or `VCONV_TASK`, in that order.
fn read_payload() -> anyhow::Result<Option<Vec<u8>>> {
    match std::env::args().nth(1).as_deref() {
        Some("-") => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            if buf.iter().all(u8::is_ascii_whitespace) {
                bail!("empty payload on stdin");
            }
            Ok(Some(buf))
        }
        Some("-h") | Some("--help") => Ok(None),
        Some(arg) => Ok(Some(arg.as_bytes().to_vec())),
        None => Ok(std::env::var("VCONV_TASK").ok().map(String::into_bytes)),
    }
}
