//! Frame grabber worker - the single poll/dispatch loop.
//!
//! Spawned only after the connection manager succeeds; runs until the
//! shutdown flag is raised. Polling is deliberately a busy loop with short
//! sleeps (~1 ms when no new frame, ~100 ms when the connection is gone)
//! rather than a blocking wait, which keeps CPU use bounded and latency
//! predictable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use contracts::{CaptureClient, FrameView};
use tracing::{debug, error, info, warn};

use crate::log::ViconLog;
use crate::registry::SubscriberRegistry;

/// Pause when the current frame is stale or retrieval failed.
pub(crate) const STALE_POLL_DELAY: Duration = Duration::from_millis(1);
/// Pause when the connection has dropped out from under the worker.
pub(crate) const DISCONNECTED_POLL_DELAY: Duration = Duration::from_millis(100);

/// Handle to the running grabber thread.
pub(crate) struct FrameGrabber {
    shutdown: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
}

impl FrameGrabber {
    /// Spawn the worker. The client mutex is shared with the façade, which
    /// only touches it again after [`FrameGrabber::stop`] has joined.
    pub(crate) fn spawn<C: CaptureClient + 'static>(
        client: Arc<Mutex<C>>,
        registry: Arc<SubscriberRegistry>,
        log: Arc<ViconLog>,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);

        let handle = thread::spawn(move || {
            grabber_loop(&client, &registry, &log, &flag);
        });

        Self { shutdown, handle }
    }

    /// Signal the worker and block until it has exited its loop. No dispatch
    /// pass can start once this returns.
    pub(crate) fn stop(self) {
        self.shutdown.store(true, Ordering::Release);
        if self.handle.join().is_err() {
            error!("frame grabber thread panicked");
        }
    }
}

enum PollOutcome {
    Dispatched,
    Stale,
    Disconnected,
}

fn grabber_loop<C: CaptureClient>(
    client: &Mutex<C>,
    registry: &SubscriberRegistry,
    log: &ViconLog,
    shutdown: &AtomicBool,
) {
    log.line("Frame grabber thread started!");
    info!("frame grabber started");

    let mut last_dispatched: Option<u64> = None;

    while !shutdown.load(Ordering::Acquire) {
        match poll_once(client, registry, log, &mut last_dispatched) {
            PollOutcome::Dispatched => {}
            PollOutcome::Stale => thread::sleep(STALE_POLL_DELAY),
            PollOutcome::Disconnected => thread::sleep(DISCONNECTED_POLL_DELAY),
        }
    }

    debug!(last_frame = ?last_dispatched, "frame grabber exiting");
}

/// One loop iteration: poll the client, and if a genuinely new frame
/// arrived, run a dispatch pass for it.
fn poll_once<C: CaptureClient>(
    client: &Mutex<C>,
    registry: &SubscriberRegistry,
    log: &ViconLog,
    last_dispatched: &mut Option<u64>,
) -> PollOutcome {
    let frame_number = {
        let mut client = client.lock().unwrap();

        if !client.is_connected() {
            log.line("Frame grabber is running but no connection... Something is horribly wrong!");
            error!("connection lost while streaming, retrying");
            observability::record_connection_anomaly();
            return PollOutcome::Disconnected;
        }

        if client.get_frame().is_err() {
            return PollOutcome::Stale;
        }

        client.frame_number()
    };

    // Frame number 0 means the client has not produced a real frame yet.
    if frame_number == 0 {
        return PollOutcome::Stale;
    }

    if let Some(last) = *last_dispatched {
        if frame_number <= last {
            return PollOutcome::Stale;
        }

        let gap = frame_number - last;
        if gap > 1 {
            let lost = gap - 1;
            log.line(&format!(
                "Warning: lost {lost} frames on the stream ({last} -> {frame_number})"
            ));
            warn!(lost, last_frame = last, frame_number, "frame loss detected");
            observability::record_frames_lost(lost);
        }
    }

    let pass_started = Instant::now();
    let subscribers = registry.dispatch(&FrameView { frame_number });
    observability::record_frame_dispatched(subscribers);
    observability::record_dispatch_duration(pass_started.elapsed());

    *last_dispatched = Some(frame_number);
    PollOutcome::Dispatched
}
