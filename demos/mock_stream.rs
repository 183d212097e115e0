//! Mock Stream Demo
//!
//! Drives the arbiter over a free-running mock capture source. Runs without
//! any capture server.
//!
//! Run with: cargo run --bin mock_stream

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arbiter::ViconStream;
use capture::MockCaptureClient;
use contracts::{StreamConfig, StreamMode};
use observability::{LogFormat, ObservabilityConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Pretty,
        metrics_port: None,
        default_log_level: "info".to_string(),
    })?;

    tracing::info!("Starting Mock Stream Demo");

    // ==== Stage 1: Mock capture source at 200 Hz ====
    let client = MockCaptureClient::free_running(200.0);

    // ==== Stage 2: Arbiter, logging to stdout ====
    let mut stream = ViconStream::new(client, "mock:801", Box::new(std::io::stdout()));

    let frames = Arc::new(AtomicU64::new(0));
    let frames_cb = frames.clone();
    let subscription = stream.subscribe(move |frame| {
        let count = frames_cb.fetch_add(1, Ordering::Relaxed) + 1;
        if count % 50 == 0 {
            tracing::info!(frame_number = frame.frame_number, received = count, "progress");
        }
    });

    // ==== Stage 3: Start streaming ====
    let config = StreamConfig {
        marker_data: true,
        stream_mode: StreamMode::ServerPush,
        ..Default::default()
    };

    if !stream.start(config) {
        return Err("stream startup failed".into());
    }

    tracing::info!(frame_rate_hz = ?stream.frame_rate_hz(), "streaming");

    // ==== Stage 4: Let it run briefly, then shut down ====
    std::thread::sleep(Duration::from_secs(2));

    stream.unsubscribe(subscription);
    stream.stop();

    tracing::info!(
        frames = frames.load(Ordering::Relaxed),
        "Mock Stream Demo complete"
    );

    Ok(())
}
