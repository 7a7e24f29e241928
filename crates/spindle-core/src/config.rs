//! Configuration: scheduler tuning, search backend endpoint, logging.
//!
//! Every numeric knob accepts "unset or non-positive" and falls back to its
//! default, so a zeroed struct is a valid configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::observability::{LoggerConfig, LoggerFormat};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_BATCH_SIZE: usize = 200;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_INDEX_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(2);

const ENV_PREFIX: &str = "SPINDLE_";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub search: SearchConfig,
    pub logging: LoggerConfig,
}

/// Scheduler tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Tick interval between reconciliation passes.
    pub interval_ms: i64,
    /// Page size of the catch-up scan.
    pub batch_size: i64,
    pub max_retries: i64,
    /// Notification buffer. Twice the batch size when unset.
    pub queue_capacity: i64,
    /// Upper bound for any single store or index call made during a pass.
    pub call_timeout_ms: i64,
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        positive_millis(self.interval_ms).unwrap_or(DEFAULT_INTERVAL)
    }

    pub fn batch_size(&self) -> usize {
        positive(self.batch_size).unwrap_or(DEFAULT_BATCH_SIZE)
    }

    pub fn max_retries(&self) -> u32 {
        positive(self.max_retries)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(DEFAULT_MAX_RETRIES)
    }

    pub fn queue_capacity(&self) -> usize {
        positive(self.queue_capacity).unwrap_or_else(|| self.batch_size().saturating_mul(2))
    }

    pub fn call_timeout(&self) -> Duration {
        positive_millis(self.call_timeout_ms).unwrap_or(DEFAULT_CALL_TIMEOUT)
    }
}

/// Search backend endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// e.g. `http://search:8080`. Empty disables the HTTP client.
    pub base_url: String,
    pub index_timeout_ms: i64,
    pub search_timeout_ms: i64,
}

impl SearchConfig {
    pub fn index_timeout(&self) -> Duration {
        positive_millis(self.index_timeout_ms).unwrap_or(DEFAULT_INDEX_TIMEOUT)
    }

    pub fn search_timeout(&self) -> Duration {
        positive_millis(self.search_timeout_ms).unwrap_or(DEFAULT_SEARCH_TIMEOUT)
    }

    pub fn is_enabled(&self) -> bool {
        !self.base_url.trim().is_empty()
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Apply `SPINDLE_*` overrides from the process environment.
    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(std::env::vars())
    }

    /// Apply `SPINDLE_*` overrides from an arbitrary key/value source.
    ///
    /// Recognized keys: `SEARCH_BASE_URL`, `SEARCH_INDEX_TIMEOUT_MS`,
    /// `SEARCH_SEARCH_TIMEOUT_MS`, `SCHEDULER_INTERVAL_MS`,
    /// `SCHEDULER_BATCH_SIZE`, `SCHEDULER_MAX_RETRIES`,
    /// `SCHEDULER_QUEUE_CAPACITY`, `SCHEDULER_CALL_TIMEOUT_MS`, `LOG_LEVEL`,
    /// `LOG_FORMAT`. Unknown keys are ignored.
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let int = || {
                value.trim().parse::<i64>().map_err(|_| ConfigError::InvalidEnv {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            };

            match name {
                "SEARCH_BASE_URL" => self.search.base_url = value.trim().to_string(),
                "SEARCH_INDEX_TIMEOUT_MS" => self.search.index_timeout_ms = int()?,
                "SEARCH_SEARCH_TIMEOUT_MS" => self.search.search_timeout_ms = int()?,
                "SCHEDULER_INTERVAL_MS" => self.scheduler.interval_ms = int()?,
                "SCHEDULER_BATCH_SIZE" => self.scheduler.batch_size = int()?,
                "SCHEDULER_MAX_RETRIES" => self.scheduler.max_retries = int()?,
                "SCHEDULER_QUEUE_CAPACITY" => self.scheduler.queue_capacity = int()?,
                "SCHEDULER_CALL_TIMEOUT_MS" => self.scheduler.call_timeout_ms = int()?,
                "LOG_LEVEL" => self.logging.level = value.trim().to_string(),
                "LOG_FORMAT" => {
                    self.logging.format =
                        value
                            .parse::<LoggerFormat>()
                            .map_err(|_| ConfigError::InvalidEnv {
                                key: key.to_string(),
                                value: value.to_string(),
                            })?
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn positive(n: i64) -> Option<usize> {
    if n > 0 { usize::try_from(n).ok() } else { None }
}

fn positive_millis(ms: i64) -> Option<Duration> {
    if ms > 0 {
        Some(Duration::from_millis(ms as u64))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn zeroed_config_uses_defaults() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.interval(), Duration::from_secs(30));
        assert_eq!(cfg.batch_size(), 200);
        assert_eq!(cfg.max_retries(), 3);
        assert_eq!(cfg.queue_capacity(), 400);
        assert_eq!(cfg.call_timeout(), Duration::from_secs(10));
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(-500)]
    fn non_positive_values_fall_back(#[case] n: i64) {
        let cfg = SchedulerConfig {
            interval_ms: n,
            batch_size: n,
            max_retries: n,
            queue_capacity: n,
            call_timeout_ms: n,
        };
        assert_eq!(cfg.interval(), DEFAULT_INTERVAL);
        assert_eq!(cfg.batch_size(), DEFAULT_BATCH_SIZE);
        assert_eq!(cfg.max_retries(), DEFAULT_MAX_RETRIES);
        assert_eq!(cfg.queue_capacity(), DEFAULT_BATCH_SIZE * 2);
    }

    #[test]
    fn queue_capacity_follows_batch_size() {
        let cfg = SchedulerConfig {
            batch_size: 5,
            ..Default::default()
        };
        assert_eq!(cfg.queue_capacity(), 10);

        let cfg = SchedulerConfig {
            batch_size: 5,
            queue_capacity: 3,
            ..Default::default()
        };
        assert_eq!(cfg.queue_capacity(), 3);
    }

    #[test]
    fn parses_toml_sections() {
        let cfg = Config::from_toml_str(
            r#"
            [scheduler]
            interval_ms = 1500
            batch_size = 50
            max_retries = 5

            [search]
            base_url = "http://search:8080"
            index_timeout_ms = 750

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.scheduler.interval(), Duration::from_millis(1500));
        assert_eq!(cfg.scheduler.batch_size(), 50);
        assert_eq!(cfg.scheduler.max_retries(), 5);
        assert_eq!(cfg.search.base_url, "http://search:8080");
        assert_eq!(cfg.search.index_timeout(), Duration::from_millis(750));
        assert_eq!(cfg.search.search_timeout(), DEFAULT_SEARCH_TIMEOUT);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.format, LoggerFormat::Json);
    }

    #[test]
    fn empty_toml_is_valid() {
        let cfg = Config::from_toml_str("").unwrap();
        assert!(!cfg.search.is_enabled());
        assert_eq!(cfg.scheduler.batch_size(), DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::from_toml_str("[scheduler]\nbatch_size = 50\n").unwrap();
        cfg.apply_env([
            ("SPINDLE_SCHEDULER_BATCH_SIZE", "10"),
            ("SPINDLE_SEARCH_BASE_URL", " http://localhost:9000 "),
            ("SPINDLE_LOG_FORMAT", "json"),
            ("HOME", "/root"),
        ])
        .unwrap();

        assert_eq!(cfg.scheduler.batch_size(), 10);
        assert_eq!(cfg.search.base_url, "http://localhost:9000");
        assert_eq!(cfg.logging.format, LoggerFormat::Json);
    }

    #[test]
    fn env_rejects_garbage_numbers() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_env([("SPINDLE_SCHEDULER_MAX_RETRIES", "three")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key, .. } if key == "SPINDLE_SCHEDULER_MAX_RETRIES"));
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
