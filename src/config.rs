//! Configuration module for downtime-probe.
//!
//! The CLI layer fills a [`TestConfig`]; once validated it is never mutated.

use crate::analysis::TrailingDowntime;
use crate::probe::DEFAULT_PROBE_TIMEOUT;

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Configuration error types.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("target URL must not be empty")]
    EmptyUrl,
    #[error("output prefix must not be empty")]
    EmptyOutput,
    #[error("interval must be a non-negative, representable number of seconds, got {0}")]
    Interval(f64),
    #[error("probe timeout must be a positive, representable number of seconds, got {0}")]
    Timeout(f64),
}

/// Settings for one availability test run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestConfig {
    /// Service URL to probe
    pub target_url: String,
    /// Total wall-clock budget for the test (default: 300)
    pub duration_seconds: u64,
    /// Pause between the end of one probe and the start of the next (default: 0.1)
    pub interval_seconds: f64,
    /// `interval_seconds` as a `Duration`, kept in step by `with_interval_secs`
    #[serde(skip)]
    pub interval: Duration,
    /// Report files are written as `{output_prefix}_analysis.*`
    pub output_prefix: String,
    /// Per-request timeout (default: 1s)
    #[serde(skip)]
    pub probe_timeout: Duration,
    #[serde(skip)]
    pub trailing_downtime: TrailingDowntime,
    #[serde(skip)]
    pub write_json: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            duration_seconds: 300,
            interval_seconds: 0.1,
            interval: Duration::from_millis(100),
            output_prefix: String::new(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            trailing_downtime: TrailingDowntime::Drop,
            write_json: false,
        }
    }
}

impl TestConfig {
    pub fn new(target_url: &str, output_prefix: &str) -> Self {
        Self {
            target_url: target_url.to_string(),
            output_prefix: output_prefix.to_string(),
            ..Default::default()
        }
    }

    /// Set the pause between probes from fractional seconds.
    pub fn with_interval_secs(mut self, secs: f64) -> Result<Self, ConfigError> {
        self.interval =
            Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::Interval(secs))?;
        self.interval_seconds = secs;
        Ok(self)
    }

    /// Set the probe timeout from fractional seconds.
    pub fn with_timeout_secs(mut self, secs: f64) -> Result<Self, ConfigError> {
        let timeout =
            Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::Timeout(secs))?;
        if timeout.is_zero() {
            return Err(ConfigError::Timeout(secs));
        }
        self.probe_timeout = timeout;
        Ok(self)
    }

    /// Reject values the sampler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        if self.output_prefix.is_empty() {
            return Err(ConfigError::EmptyOutput);
        }
        match Duration::try_from_secs_f64(self.interval_seconds) {
            Ok(interval) if interval == self.interval => {}
            _ => return Err(ConfigError::Interval(self.interval_seconds)),
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::Timeout(0.0));
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_seconds)
    }
}
