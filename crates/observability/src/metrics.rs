//! Metric recording helpers for the arbiter hot loop.
//!
//! Metric names:
//! - `vicon_frames_dispatched_total` - counter, one per dispatch pass
//! - `vicon_frames_lost_total` - counter, incremented by gap size
//! - `vicon_connection_lost_polls_total` - counter, severe-anomaly polls
//! - `vicon_subscribers` - gauge, subscribers in the last pass
//! - `vicon_dispatch_seconds` - histogram, dispatch pass duration

use std::time::Duration;

/// Record one completed dispatch pass and the subscriber count it served.
pub fn record_frame_dispatched(subscribers: usize) {
    metrics::counter!("vicon_frames_dispatched_total").increment(1);
    metrics::gauge!("vicon_subscribers").set(subscribers as f64);
}

/// Record frames missing from the sequence (gap minus one).
pub fn record_frames_lost(lost: u64) {
    metrics::counter!("vicon_frames_lost_total").increment(lost);
}

/// Record one poll that found the connection gone while streaming.
pub fn record_connection_anomaly() {
    metrics::counter!("vicon_connection_lost_polls_total").increment(1);
}

/// Record the wall-clock duration of one dispatch pass.
pub fn record_dispatch_duration(duration: Duration) {
    metrics::histogram!("vicon_dispatch_seconds").record(duration.as_secs_f64());
}
