//! Postgres-backed persistence for the video converter.
//!
//! This crate provides:
//! - `POSTGRES_*` configuration and pool bootstrap
//! - Idempotent table creation
//! - The [`IdempotencyStore`] and [`ErrorLogStore`] ports with Postgres implementations

pub mod client;
pub mod config;
pub mod error;
pub mod error_log;
pub mod idempotency;
pub mod schema;

pub use client::{connect, ping};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
#[cfg(any(test, feature = "mocks"))]
pub use error_log::MockErrorLogStore;
pub use error_log::{ErrorLogStore, PgErrorLogStore};
#[cfg(any(test, feature = "mocks"))]
pub use idempotency::MockIdempotencyStore;
pub use idempotency::{IdempotencyStore, PgIdempotencyStore};
pub use schema::ensure_schema;
