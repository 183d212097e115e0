//! Timestamped log-sink writer.
//!
//! Every lifecycle and anomaly message goes to the caller-supplied sink in a
//! fixed line format consumers already parse:
//!
//! ```text
//! [<elapsed-seconds, 6 decimal places>] ViconLog: <message>
//! ```
//!
//! Elapsed time is measured from construction. Writes are serialized by a
//! mutex so the grabber thread and the caller's thread never interleave
//! partial lines.

use std::io::Write;
use std::sync::Mutex;
use std::time::Instant;

use tracing::warn;

/// Shared, mutex-serialized writer for the compatibility log format.
pub struct ViconLog {
    started: Instant,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl ViconLog {
    /// Wrap a sink; elapsed-time logging starts now.
    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        Self {
            started: Instant::now(),
            sink: Mutex::new(sink),
        }
    }

    /// Write one formatted line. A failing sink is reported through tracing
    /// and otherwise ignored; logging never brings the stream down.
    pub fn line(&self, message: &str) {
        let elapsed = self.started.elapsed().as_secs_f64();
        let mut sink = self.sink.lock().unwrap();
        if let Err(e) = writeln!(sink, "[{elapsed:.6}] ViconLog: {message}") {
            warn!(error = %e, "log sink write failed");
        }
    }
}
