//! Connection manager - bounded-retry startup sequence.
//!
//! Runs synchronously on the caller's thread: connect with a bounded retry
//! budget, apply the stream configuration, validate that the stream is
//! producing real frames, then obtain a finite frame rate. Only after all of
//! that succeeds does the caller spawn the grabber.
//!
//! A server that never reports a finite frame rate would otherwise stall
//! startup forever; [`FRAME_RATE_PROBE_ATTEMPTS`] bounds that wait, failing
//! startup instead of hanging.

use std::thread;
use std::time::Duration;

use contracts::{
    CaptureClient, CaptureError, CaptureResult, DataCategory, Direction, StreamConfig,
};
use tracing::{debug, info, warn};

use crate::log::ViconLog;

/// Connect attempts before giving up.
pub(crate) const CONNECT_ATTEMPTS: u32 = 3;
/// Pause between connect attempts.
pub(crate) const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(500);
/// Frame polls allowed while validating readiness.
pub(crate) const FRAME_PROBE_ATTEMPTS: u32 = 10;
/// Pause between readiness probes.
pub(crate) const FRAME_PROBE_DELAY: Duration = Duration::from_millis(10);
/// Combined frame + rate probes allowed while waiting for a finite rate.
pub(crate) const FRAME_RATE_PROBE_ATTEMPTS: u32 = 512;
/// Pause between frame-rate probes.
pub(crate) const FRAME_RATE_PROBE_DELAY: Duration = Duration::from_millis(1);

/// Establish the connection and validate the stream. Returns the server's
/// frame rate in Hz on success. On any failure the client is left
/// disconnected and nothing keeps running.
pub(crate) fn establish<C: CaptureClient>(
    client: &mut C,
    host: &str,
    config: &StreamConfig,
    log: &ViconLog,
) -> CaptureResult<f64> {
    log.line(&format!("Connecting to {host}..."));

    let mut failures = 0;
    while !client.is_connected() {
        if failures >= CONNECT_ATTEMPTS {
            log.line("Error: Connection failed, aborting!");
            return Err(CaptureError::connect_failed(host, failures));
        }

        match client.connect(host) {
            Ok(()) => {
                log.line(&format!("Success! Connected to {host}"));
                break;
            }
            Err(e) => {
                warn!(host = %host, error = %e, "connect attempt failed");
                log.line("Warning: Connection failed, retrying...");
                failures += 1;
            }
        }

        thread::sleep(CONNECT_RETRY_DELAY);
    }

    apply_config(client, config, log);

    validate_stream(client, log)?;

    let rate = obtain_frame_rate(client, log)?;
    log.line(&format!("{:<25}{rate} Hz", "Frame rate:"));
    info!(host = %host, frame_rate_hz = rate, "stream validated");

    Ok(rate)
}

/// Apply every category toggle explicitly, then stream mode and the fixed
/// axis convention.
fn apply_config<C: CaptureClient>(client: &mut C, config: &StreamConfig, log: &ViconLog) {
    let categories = [
        (DataCategory::Segment, config.segment_data, "Segment Data:"),
        (DataCategory::Marker, config.marker_data, "Marker Data:"),
        (
            DataCategory::UnlabeledMarker,
            config.unlabeled_marker_data,
            "Unlabeled Marker Data:",
        ),
        (DataCategory::Device, config.device_data, "Device Data:"),
    ];

    for (category, enabled, label) in categories {
        client.set_category(category, enabled);
        let state = if enabled { "enabled" } else { "disabled" };
        log.line(&format!("{label:<25}{state}"));
    }

    client.set_stream_mode(config.stream_mode);
    log.line(&format!("{:<25}{}", "Stream mode:", config.stream_mode));

    // Z-up convention.
    client.set_axis_mapping(Direction::Forward, Direction::Left, Direction::Up);

    debug!(config = ?config, "stream configuration applied");
}

/// Poll until the stream yields a frame, within the probe budget.
fn validate_stream<C: CaptureClient>(client: &mut C, log: &ViconLog) -> CaptureResult<()> {
    for attempt in 1..=FRAME_PROBE_ATTEMPTS {
        if client.get_frame().is_ok() {
            return Ok(());
        }
        if attempt < FRAME_PROBE_ATTEMPTS {
            thread::sleep(FRAME_PROBE_DELAY);
        }
    }

    log.line("Frame grabber startup failed, aborting!");
    client.disconnect();
    Err(CaptureError::StartupValidation {
        attempts: FRAME_PROBE_ATTEMPTS,
    })
}

/// Query the frame rate, re-polling frames while the server reports a
/// non-finite value. Bounded; see the module docs.
fn obtain_frame_rate<C: CaptureClient>(client: &mut C, log: &ViconLog) -> CaptureResult<f64> {
    let mut probes = 0;
    loop {
        match client.frame_rate() {
            Ok(hz) if hz.is_finite() => return Ok(hz),
            Ok(_) => {
                probes += 1;
                if probes >= FRAME_RATE_PROBE_ATTEMPTS {
                    log.line("Error: no finite frame rate, aborting!");
                    client.disconnect();
                    return Err(CaptureError::FrameRateUnavailable { attempts: probes });
                }
                // Server still measuring: pull another frame and re-query.
                let _ = client.get_frame();
                thread::sleep(FRAME_RATE_PROBE_DELAY);
            }
            Err(e) => {
                warn!(error = %e, "frame rate query failed");
                log.line("Error: frame rate query failed, aborting!");
                client.disconnect();
                return Err(e);
            }
        }
    }
}
