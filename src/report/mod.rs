//! Report rendering and output.
//!
//! The text report is the primary artifact; a JSON document with the same
//! numbers can be written next to it.

use crate::analysis::Analysis;
use crate::config::TestConfig;

use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Report error types.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Destination for rendered reports, addressed by artifact name.
pub trait ReportSink {
    /// Write `contents` as the artifact `name` and return where it went.
    fn write(&self, name: &str, contents: &str) -> Result<String, ReportError>;
}

/// Writes artifacts as `{prefix}_{name}` files.
#[derive(Debug, Clone)]
pub struct FileSink {
    prefix: String,
}

impl FileSink {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        PathBuf::from(format!("{}_{}", self.prefix, name))
    }
}

impl ReportSink for FileSink {
    fn write(&self, name: &str, contents: &str) -> Result<String, ReportError> {
        let path = self.path_for(name);
        fs::write(&path, contents)?;
        Ok(path.display().to_string())
    }
}

pub const TEXT_ARTIFACT: &str = "analysis.txt";
pub const JSON_ARTIFACT: &str = "analysis.json";

/// Render the plain-text summary.
pub fn render(config: &TestConfig, analysis: &Analysis) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "Test Results for {}", config.target_url);
    let _ = writeln!(out, "Duration: {} seconds", config.duration_seconds);
    let interval = format_seconds(config.interval_seconds);
    let _ = writeln!(out, "Request Interval: {} seconds", interval);
    out.push('\n');

    let _ = writeln!(out, "Total Requests: {}", analysis.total_requests);
    let _ = writeln!(out, "Failed Requests: {}", analysis.failed_requests);
    match analysis.success_rate_percent {
        Some(rate) => {
            let _ = writeln!(out, "Success Rate: {:.2}%", rate);
        }
        None => out.push_str("Success Rate: N/A\n"),
    }
    out.push('\n');

    out.push_str("Downtime Periods:\n");
    for period in &analysis.downtime_periods {
        let _ = writeln!(out, "- {:.2} seconds", period.duration_seconds);
    }
    let _ = writeln!(out, "Total Downtime: {:.2} seconds", analysis.total_downtime_seconds);
    out.push('\n');

    out
}

/// Print a seconds value the way a float literal reads: `1.0`, `0.1`, `2.5`.
///
/// Magnitudes below 1e-4 or from 1e16 up switch to exponent form with a
/// signed two-digit exponent (`1e-05`, `1.5e+16`).
fn format_seconds(secs: f64) -> String {
    if !secs.is_finite() {
        return secs.to_string();
    }

    let sci = format!("{:e}", secs);
    if let Some((mantissa, exp)) = sci.split_once('e') {
        if let Ok(exp) = exp.parse::<i32>() {
            if exp < -4 || exp >= 16 {
                let sign = if exp < 0 { '-' } else { '+' };
                return format!("{}e{}{:02}", mantissa, sign, exp.abs());
            }
        }
    }

    if secs.fract() == 0.0 {
        format!("{:.1}", secs)
    } else {
        secs.to_string()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    config: &'a TestConfig,
    probe_timeout_seconds: f64,
    analysis: &'a Analysis,
}

/// Render the analysis as pretty-printed JSON.
pub fn render_json(config: &TestConfig, analysis: &Analysis) -> Result<String, ReportError> {
    let report = JsonReport {
        config,
        probe_timeout_seconds: config.probe_timeout.as_secs_f64(),
        analysis,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Render and write every artifact the configuration asks for.
///
/// Returns the locations written, text report first.
pub fn write_report<S: ReportSink + ?Sized>(
    sink: &S,
    config: &TestConfig,
    analysis: &Analysis,
) -> Result<Vec<String>, ReportError> {
    let mut written = vec![sink.write(TEXT_ARTIFACT, &render(config, analysis))?];

    if config.write_json {
        written.push(sink.write(JSON_ARTIFACT, &render_json(config, analysis)?)?);
    }

    Ok(written)
}
