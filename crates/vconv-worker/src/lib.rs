//! Video conversion worker.
//!
//! This crate provides:
//! - The task dispatcher (idempotency gate, merge, DASH encode, cleanup, success marker)
//! - Best-effort error recording
//! - Structured task logging
//! - Environment-driven configuration

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod recorder;
pub mod stage;

pub use config::{IdempotencyPolicy, WorkerConfig};
pub use dispatcher::TaskDispatcher;
pub use error::{WorkerError, WorkerResult};
pub use logging::TaskLogger;
pub use recorder::ErrorRecorder;
pub use stage::{PipelineStage, TaskOutcome, TaskReport};
