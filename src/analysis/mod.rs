//! Downtime analysis over a completed probe sequence.

use crate::probe::ProbeResult;

use serde::Serialize;

/// What to do with a failure run that is still open when the sequence ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingDowntime {
    /// Leave it out of the periods and the total; it is only kept in
    /// [`Analysis::trailing_downtime`].
    #[default]
    Drop,
    /// Close it at the last probe like any other run.
    Close,
}

/// One maximal run of consecutive failed probes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DowntimePeriod {
    /// Index of the first failed probe (inclusive)
    pub start_index: usize,
    /// Index of the last failed probe (inclusive)
    pub end_index: usize,
    /// `(end_index - start_index) * interval`, not the timestamp delta
    pub duration_seconds: f64,
}

impl DowntimePeriod {
    fn new(start_index: usize, end_index: usize, interval_seconds: f64) -> Self {
        Self {
            start_index,
            end_index,
            duration_seconds: (end_index - start_index) as f64 * interval_seconds,
        }
    }
}

/// Summary of one test run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub total_requests: usize,
    pub failed_requests: usize,
    /// `None` when no probe was issued
    pub success_rate_percent: Option<f64>,
    pub downtime_periods: Vec<DowntimePeriod>,
    pub total_downtime_seconds: f64,
    /// Failure run still open at the end, unless it was closed into
    /// `downtime_periods`
    pub trailing_downtime: Option<DowntimePeriod>,
}

impl Analysis {
    pub fn successful_requests(&self) -> usize {
        self.total_requests - self.failed_requests
    }
}

/// Analyze a sequence, dropping a trailing open failure run.
pub fn analyze(sequence: &[ProbeResult], interval_seconds: f64) -> Analysis {
    analyze_with(sequence, interval_seconds, TrailingDowntime::Drop)
}

/// Analyze a sequence with an explicit policy for a trailing failure run.
pub fn analyze_with(
    sequence: &[ProbeResult],
    interval_seconds: f64,
    trailing: TrailingDowntime,
) -> Analysis {
    let total_requests = sequence.len();
    let failed_requests = sequence.iter().filter(|r| !r.success).count();

    let success_rate_percent = if total_requests == 0 {
        None
    } else {
        Some((total_requests - failed_requests) as f64 / total_requests as f64 * 100.0)
    };

    let mut downtime_periods = Vec::new();
    // Index where the current failure run started
    let mut open_run: Option<usize> = None;

    for (i, result) in sequence.iter().enumerate() {
        match (open_run, result.success) {
            (None, false) => open_run = Some(i),
            (Some(start), true) => {
                downtime_periods.push(DowntimePeriod::new(start, i - 1, interval_seconds));
                open_run = None;
            }
            _ => {}
        }
    }

    let mut trailing_downtime =
        open_run.map(|start| DowntimePeriod::new(start, total_requests - 1, interval_seconds));

    if trailing == TrailingDowntime::Close {
        if let Some(period) = trailing_downtime.take() {
            downtime_periods.push(period);
        }
    }

    // An empty f64 sum is -0.0, which would render as "-0.00"
    let total_downtime_seconds: f64 =
        downtime_periods.iter().fold(0.0, |acc, p| acc + p.duration_seconds);

    Analysis {
        total_requests,
        failed_requests,
        success_rate_percent,
        downtime_periods,
        total_downtime_seconds,
        trailing_downtime,
    }
}
