//! `run` command implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, trace, warn};

use arbiter::ViconStream;
use capture::MockCaptureClient;

use crate::cli::RunArgs;
use crate::config::StreamSettings;
use crate::error::CliError;

/// Execute the `run` command
pub async fn run_stream(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading settings");

    let mut settings = StreamSettings::load_from_path(&args.config)
        .with_context(|| format!("Failed to load settings from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref host) = args.host {
        info!(host = %host, "Overriding capture host from CLI");
        settings.host = host.clone();
    }

    info!(
        host = %settings.host,
        segment = settings.stream.segment_data,
        marker = settings.stream.marker_data,
        unlabeled_marker = settings.stream.unlabeled_marker_data,
        device = settings.stream.device_data,
        mode = %settings.stream.stream_mode,
        "Settings loaded"
    );

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    // A real SDK-backed client would plug in here through the same trait.
    let client = MockCaptureClient::free_running(args.rate_hz);
    let mut stream = ViconStream::new(client, settings.host.clone(), Box::new(std::io::stdout()));

    let dispatched = Arc::new(AtomicU64::new(0));
    let last_frame = Arc::new(AtomicU64::new(0));

    let dispatched_cb = dispatched.clone();
    let last_frame_cb = last_frame.clone();
    stream.subscribe(move |frame| {
        dispatched_cb.fetch_add(1, Ordering::Relaxed);
        last_frame_cb.store(frame.frame_number, Ordering::Relaxed);
        trace!(frame_number = frame.frame_number, "frame received");
    });

    info!("Starting stream...");
    if !stream.start(settings.stream) {
        return Err(CliError::stream_startup(&settings.host).into());
    }

    info!(
        frame_rate_hz = stream.frame_rate_hz(),
        "Streaming; press Ctrl-C to stop"
    );

    wait_for_shutdown(args.duration).await;

    stream.stop();

    info!(
        frames = dispatched.load(Ordering::Relaxed),
        last_frame = last_frame.load(Ordering::Relaxed),
        "Stream stopped"
    );

    Ok(())
}

/// Wait for Ctrl-C, or for the run duration to elapse when one was given.
async fn wait_for_shutdown(duration_secs: u64) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    if duration_secs == 0 {
        ctrl_c.await;
        warn!("Received shutdown signal, stopping stream...");
    } else {
        tokio::select! {
            _ = ctrl_c => {
                warn!("Received shutdown signal, stopping stream...");
            }
            _ = tokio::time::sleep(Duration::from_secs(duration_secs)) => {
                info!(duration_secs, "Run duration elapsed");
            }
        }
    }
}
