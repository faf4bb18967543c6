//! Probe module for availability checks.
//!
//! A probe is one GET request whose outcome is always recorded as data:
//! transport errors and non-200 responses become failed results, never errors.

mod http;

pub use http::*;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Status code recorded when no response was received.
pub const NO_RESPONSE: u16 = 0;

/// Default per-probe timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Probe error types.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Outcome of a single probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub timestamp: DateTime<Utc>,
    /// HTTP status, or [`NO_RESPONSE`] for transport failures
    pub status_code: u16,
    pub success: bool,
    #[serde(with = "latency_millis")]
    pub latency: Duration,
}

impl ProbeResult {
    /// Classify a response status. Only 200 counts as up.
    pub fn from_status(status_code: u16, latency: Duration) -> Self {
        Self {
            timestamp: Utc::now(),
            status_code,
            success: status_code == 200,
            latency,
        }
    }

    /// A probe that never got a response.
    pub fn no_response(latency: Duration) -> Self {
        Self {
            timestamp: Utc::now(),
            status_code: NO_RESPONSE,
            success: false,
            latency,
        }
    }
}

/// Something that can issue a GET and report the response status.
///
/// The production implementation is [`HttpTransport`]; tests swap in
/// scripted transports.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<u16, ProbeError>;
}

/// Run a single probe against `url`.
///
/// Never fails. Any error from the transport is folded into a result with
/// status [`NO_RESPONSE`].
pub async fn probe<T: Transport + ?Sized>(
    transport: &T,
    url: &str,
    timeout: Duration,
) -> ProbeResult {
    let start = Instant::now();
    let outcome = transport.get(url, timeout).await;
    let latency = start.elapsed();

    match outcome {
        Ok(status) => ProbeResult::from_status(status, latency),
        Err(e) => {
            tracing::debug!("Probe of {} failed: {}", url, e);
            ProbeResult::no_response(latency)
        }
    }
}

mod latency_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(latency: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(latency.as_secs_f64() * 1000.0)
    }
}
