//! End-to-end conversion of a single task.
//!
//! The dispatcher gates on the success marker, merges chunks, encodes the
//! DASH package, removes the merged file and writes the success marker, in
//! that order. The first error aborts the remaining stages and is recorded
//! exactly once.
//!
//! If encoding fails the merged file is kept for inspection. Cleanup and
//! marking happen after the package is written; a failure there leaves the
//! package in place, and a later run for the same video converts it again.

use tracing::{warn, Instrument};

use vconv_media::fs_utils::{ensure_dir, remove_artifact};
use vconv_media::{ChunkMerger, DashEncoder};
use vconv_models::VideoTask;
use vconv_store::{ErrorLogStore, IdempotencyStore};

use crate::config::{IdempotencyPolicy, WorkerConfig};
use crate::error::{WorkerError, WorkerResult};
use crate::logging::TaskLogger;
use crate::recorder::ErrorRecorder;
use crate::stage::{PipelineStage, TaskOutcome, TaskReport};

/// Runs conversion tasks against a store, an encoder and an error log.
pub struct TaskDispatcher<S, E, L> {
    config: WorkerConfig,
    store: S,
    encoder: E,
    recorder: ErrorRecorder<L>,
    merger: ChunkMerger,
}

impl<S, E, L> TaskDispatcher<S, E, L>
where
    S: IdempotencyStore,
    E: DashEncoder,
    L: ErrorLogStore,
{
    pub fn new(config: WorkerConfig, store: S, encoder: E, error_log: L) -> Self {
        Self {
            config,
            store,
            encoder,
            recorder: ErrorRecorder::new(error_log),
            merger: ChunkMerger::new(),
        }
    }

    /// Decode a raw payload and process it.
    ///
    /// Only a payload that fails to decode is returned as `Err`; it is not
    /// recorded in the error log.
    pub async fn handle(&self, payload: &[u8]) -> WorkerResult<TaskOutcome> {
        let task = VideoTask::decode(payload)?;
        Ok(self.process(&task).await)
    }

    /// Process a decoded task.
    pub async fn process(&self, task: &VideoTask) -> TaskOutcome {
        let logger = TaskLogger::new(task.video_id, "convert");
        let span = logger.create_span();
        self.run(task, &logger).instrument(span).await
    }

    async fn run(&self, task: &VideoTask, logger: &TaskLogger) -> TaskOutcome {
        logger.log_start(&task.path.display().to_string());

        match self.gate(task, logger).await {
            Ok(true) => {
                logger.log_warning("video already processed");
                return TaskOutcome::AlreadyProcessed;
            }
            Ok(false) => {}
            Err(e) => return self.fail(task, logger, e).await,
        }

        match self.convert(task, logger).await {
            Ok(report) => {
                logger.log_completion("video marked as processed");
                TaskOutcome::Completed(report)
            }
            Err(e) => self.fail(task, logger, e).await,
        }
    }

    /// `true` when the video already has a success record.
    async fn gate(&self, task: &VideoTask, logger: &TaskLogger) -> WorkerResult<bool> {
        logger.log_stage(PipelineStage::Gate, "Checking processed status");

        match self.store.check_processed(task.video_id).await {
            Ok(processed) => Ok(processed),
            Err(e) => match self.config.idempotency {
                IdempotencyPolicy::FailOpen => {
                    warn!(
                        video_id = %task.video_id,
                        error = %e,
                        "Processed-status lookup failed, treating video as unprocessed"
                    );
                    Ok(false)
                }
                IdempotencyPolicy::FailClosed => Err(WorkerError::StoreRead(e)),
            },
        }
    }

    async fn convert(&self, task: &VideoTask, logger: &TaskLogger) -> WorkerResult<TaskReport> {
        logger.log_stage(PipelineStage::Merging, "Merging chunks");
        let artifact = self.merger.merge(task.chunk_dir(), &task.merged_file()).await?;

        logger.log_stage(PipelineStage::Encoding, "Converting to mpeg-dash");
        let dash_dir = task.dash_dir();
        ensure_dir(&dash_dir)
            .await
            .map_err(|source| WorkerError::DirectoryCreate {
                path: dash_dir.clone(),
                source,
            })?;
        let package = self.encoder.encode(&artifact.path, &dash_dir).await?;

        logger.log_stage(PipelineStage::CleaningUp, "Removing merged file");
        remove_artifact(&artifact.path)
            .await
            .map_err(|source| WorkerError::Cleanup {
                path: artifact.path.clone(),
                source,
            })?;

        logger.log_stage(PipelineStage::MarkingProcessed, "Marking video as processed");
        let newly_marked = self
            .store
            .mark_success(task.video_id)
            .await
            .map_err(WorkerError::StoreWrite)?;

        Ok(TaskReport {
            video_id: task.video_id,
            chunk_count: artifact.chunk_count,
            bytes_merged: artifact.bytes_written,
            manifest: package.manifest,
            newly_marked,
        })
    }

    async fn fail(&self, task: &VideoTask, logger: &TaskLogger, error: WorkerError) -> TaskOutcome {
        let stage = error.stage();
        logger.log_failure(stage, error.headline());
        self.recorder.record(task, error.headline(), &error).await;
        TaskOutcome::Failed { stage, error }
    }
}
