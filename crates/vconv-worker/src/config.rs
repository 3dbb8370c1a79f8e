//! Worker configuration.

use std::time::Duration;

/// What to do when the success-marker lookup itself fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdempotencyPolicy {
    /// Treat the video as not yet processed and convert it (risking a duplicate).
    #[default]
    FailOpen,
    /// Fail the task and record the lookup error.
    FailClosed,
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Behaviour on success-marker lookup errors
    pub idempotency: IdempotencyPolicy,
    /// Upper bound on a single FFmpeg run; `None` waits indefinitely
    pub encode_timeout: Option<Duration>,
    /// FFmpeg `-v` level
    pub ffmpeg_log_level: String,
    /// Create the tables on startup
    pub bootstrap_schema: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            idempotency: IdempotencyPolicy::FailOpen,
            encode_timeout: None,
            ffmpeg_log_level: "error".to_string(),
            bootstrap_schema: true,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flag = |key: &str| lookup(key).and_then(|v| parse_bool(&v));

        Self {
            idempotency: match flag("IDEMPOTENCY_FAIL_CLOSED") {
                Some(true) => IdempotencyPolicy::FailClosed,
                _ => IdempotencyPolicy::FailOpen,
            },
            encode_timeout: lookup("ENCODE_TIMEOUT_SECS")
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            ffmpeg_log_level: lookup("FFMPEG_LOG_LEVEL").unwrap_or(defaults.ffmpeg_log_level),
            bootstrap_schema: flag("STORE_BOOTSTRAP_SCHEMA").unwrap_or(defaults.bootstrap_schema),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> WorkerConfig {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        WorkerConfig::from_lookup(|key| map.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.idempotency, IdempotencyPolicy::FailOpen);
        assert_eq!(config.encode_timeout, None);
        assert_eq!(config.ffmpeg_log_level, "error");
        assert!(config.bootstrap_schema);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("IDEMPOTENCY_FAIL_CLOSED", "true"),
            ("ENCODE_TIMEOUT_SECS", "900"),
            ("FFMPEG_LOG_LEVEL", "warning"),
            ("STORE_BOOTSTRAP_SCHEMA", "off"),
        ]);
        assert_eq!(config.idempotency, IdempotencyPolicy::FailClosed);
        assert_eq!(config.encode_timeout, Some(Duration::from_secs(900)));
        assert_eq!(config.ffmpeg_log_level, "warning");
        assert!(!config.bootstrap_schema);
    }

    #[test]
    fn test_zero_or_garbage_timeout_means_unbounded() {
        assert_eq!(config_from(&[("ENCODE_TIMEOUT_SECS", "0")]).encode_timeout, None);
        assert_eq!(config_from(&[("ENCODE_TIMEOUT_SECS", "soon")]).encode_timeout, None);
    }
}
