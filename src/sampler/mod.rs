//! Sampler loop that probes the target until the test duration elapses.

use crate::config::TestConfig;
use crate::probe::{probe, ProbeResult, Transport};

use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::time::Instant;

/// Probe outcomes in the order they were collected.
pub type ProbeSequence = Vec<ProbeResult>;

/// Run the sampler loop for the configured duration.
///
/// Probes run strictly one after another: the interval is slept after each
/// probe completes, so the real cadence is `interval + latency`. At least one
/// probe is always issued. A message on `stop_rx` ends the loop between probes
/// and the results collected so far are returned.
pub async fn run<T: Transport + ?Sized>(
    config: &TestConfig,
    transport: &T,
    mut stop_rx: broadcast::Receiver<()>,
) -> ProbeSequence {
    let duration = config.duration();
    let interval = config.interval;
    let mut results = ProbeSequence::new();
    let mut was_up = true;

    tracing::info!(
        "Probing {} for {}s every {}s",
        config.target_url,
        config.duration_seconds,
        config.interval_seconds
    );

    let start = Instant::now();

    loop {
        let result = probe(transport, &config.target_url, config.probe_timeout).await;
        let index = results.len();

        tracing::debug!(
            "Probe #{} status={} latency={:?}",
            index,
            result.status_code,
            result.latency
        );

        if was_up && !result.success {
            tracing::warn!("Service down at probe #{} (status {})", index, result.status_code);
        } else if !was_up && result.success {
            tracing::info!("Service recovered at probe #{}", index);
        }
        was_up = result.success;
        results.push(result);

        if stop_requested(&mut stop_rx) || pause(interval, &mut stop_rx).await {
            tracing::info!("Stop requested after {} probes", results.len());
            break;
        }

        if start.elapsed() >= duration {
            break;
        }
    }

    tracing::info!(
        "Collected {} probes in {:.1}s",
        results.len(),
        start.elapsed().as_secs_f64()
    );

    results
}

/// Non-blocking check for a pending stop message.
fn stop_requested(stop_rx: &mut broadcast::Receiver<()>) -> bool {
    match stop_rx.try_recv() {
        Ok(()) | Err(TryRecvError::Lagged(_)) => true,
        Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => false,
    }
}

/// Sleep for `interval`, waking early on a stop message.
///
/// Returns true if the sleep was cut short by a stop.
async fn pause(interval: Duration, stop_rx: &mut broadcast::Receiver<()>) -> bool {
    let sleep = tokio::time::sleep(interval);
    tokio::pin!(sleep);

    tokio::select! {
        _ = &mut sleep => false,
        msg = stop_rx.recv() => match msg {
            // Nobody can send a stop anymore
            Err(RecvError::Closed) => {
                sleep.await;
                false
            }
            Ok(()) | Err(RecvError::Lagged(_)) => true,
        },
    }
}
