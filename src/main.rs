//! downtime-probe - HTTP availability measurement during deployments
//!
//! Probes a URL at a fixed cadence for a fixed duration, then reports the
//! success rate and every contiguous run of failed probes.

mod analysis;
mod config;
mod probe;
mod report;
mod sampler;

use analysis::{analyze_with, TrailingDowntime};
use config::TestConfig;
use probe::HttpTransport;
use report::{write_report, FileSink};

use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Test deployment update strategy downtime.
#[derive(Parser, Debug)]
#[command(name = "downtime-probe", version)]
struct Cli {
    /// Service URL to test
    #[arg(long, env = "DOWNTIME_URL")]
    url: String,

    /// Test duration in seconds
    #[arg(long, env = "DOWNTIME_DURATION", default_value_t = 300)]
    duration: u64,

    /// Request interval in seconds
    #[arg(long, env = "DOWNTIME_INTERVAL", default_value_t = 0.1)]
    interval: f64,

    /// Output filename prefix
    #[arg(long, env = "DOWNTIME_OUTPUT")]
    output: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "DOWNTIME_TIMEOUT", default_value_t = 1.0)]
    timeout: f64,

    /// Count a downtime period that is still open when the test ends
    #[arg(long)]
    close_trailing_downtime: bool,

    /// Also write {output}_analysis.json
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> Result<TestConfig, config::ConfigError> {
        let trailing_downtime = if self.close_trailing_downtime {
            TrailingDowntime::Close
        } else {
            TrailingDowntime::Drop
        };

        let cfg = TestConfig {
            duration_seconds: self.duration,
            trailing_downtime,
            write_json: self.json,
            ..TestConfig::new(&self.url, &self.output)
        }
        .with_interval_secs(self.interval)?
        .with_timeout_secs(self.timeout)?;

        cfg.validate()?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("downtime_probe=info".parse()?))
        .init();

    let cfg = Cli::parse().into_config()?;
    let transport = HttpTransport::new()?;

    // Ctrl-C ends sampling early; the partial results are still reported
    let (stop_tx, stop_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, finishing current probe");
            let _ = stop_tx.send(());
        }
    });

    let results = sampler::run(&cfg, &transport, stop_rx).await;
    let analysis = analyze_with(&results, cfg.interval_seconds, cfg.trailing_downtime);
    tracing::info!(
        "{} of {} probes succeeded, {} downtime periods",
        analysis.successful_requests(),
        analysis.total_requests,
        analysis.downtime_periods.len()
    );

    if let Some(open) = &analysis.trailing_downtime {
        tracing::warn!(
            "Service still down at test end (probes {}..={}, ~{:.2}s); not in total downtime",
            open.start_index,
            open.end_index,
            open.duration_seconds
        );
    }

    let written = write_report(&FileSink::new(&cfg.output_prefix), &cfg, &analysis)?;
    for path in &written {
        tracing::info!("Report written to {}", path);
    }

    Ok(())
}
