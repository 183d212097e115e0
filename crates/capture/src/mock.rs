//! Mock capture client
//!
//! Implements the `CaptureClient` trait over in-memory state, with injectable
//! failure scenarios. Used for testing and development without a capture
//! server. Cloning shares the underlying state, so a test can keep one clone
//! as a controller while the arbiter owns another.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use contracts::{
    CaptureClient, CaptureError, CaptureResult, DataCategory, Direction, StreamMode,
};
use tracing::{debug, trace};

/// Mock client behaviour configuration
#[derive(Debug, Clone)]
pub struct MockBehavior {
    /// First N connect attempts fail.
    pub connect_failures: u32,
    /// First N `get_frame` calls after a connect fail.
    pub warmup_polls: u32,
    /// First N `frame_rate` queries report NaN.
    pub non_finite_rate_polls: u32,
    /// Frame rate reported once finite.
    pub frame_rate_hz: f64,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            connect_failures: 0,
            warmup_polls: 0,
            non_finite_rate_polls: 0,
            frame_rate_hz: 100.0,
        }
    }
}

/// Settings the arbiter applied during startup, recorded for assertions.
#[derive(Debug, Clone, Default)]
pub struct AppliedSettings {
    /// Category -> explicitly requested enabled state.
    pub categories: HashMap<DataCategory, bool>,
    pub stream_mode: Option<StreamMode>,
    pub axis_mapping: Option<(Direction, Direction, Direction)>,
}

/// Frame number source.
#[derive(Debug, Clone, Copy)]
enum FrameClock {
    /// Frame numbers come from the `push_frame` queue; an empty queue holds
    /// the number steady (the stale path).
    Scripted,
    /// Frame numbers derive from elapsed time, simulating a live source.
    FreeRunning { hz: f64 },
}

struct MockInner {
    behavior: MockBehavior,
    clock: FrameClock,
    connected: AtomicBool,
    connect_attempts: AtomicU32,
    failed_connects_left: AtomicU32,
    warmup_left: AtomicU32,
    non_finite_left: AtomicU32,
    current_frame: AtomicU64,
    pending: Mutex<VecDeque<u64>>,
    connected_at: Mutex<Option<Instant>>,
    disconnects: AtomicU32,
    settings: Mutex<AppliedSettings>,
}

/// Mock capture client
#[derive(Clone)]
pub struct MockCaptureClient {
    inner: Arc<MockInner>,
}

impl MockCaptureClient {
    /// Create a scripted mock with default behaviour.
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::default())
    }

    /// Create a scripted mock with the given behaviour.
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self::build(behavior, FrameClock::Scripted)
    }

    /// Create a free-running mock whose frame number tracks elapsed time at
    /// `hz` frames per second.
    pub fn free_running(hz: f64) -> Self {
        let behavior = MockBehavior {
            frame_rate_hz: hz,
            ..Default::default()
        };
        Self::build(behavior, FrameClock::FreeRunning { hz })
    }

    fn build(behavior: MockBehavior, clock: FrameClock) -> Self {
        let inner = MockInner {
            failed_connects_left: AtomicU32::new(behavior.connect_failures),
            warmup_left: AtomicU32::new(0),
            non_finite_left: AtomicU32::new(0),
            connected: AtomicBool::new(false),
            connect_attempts: AtomicU32::new(0),
            current_frame: AtomicU64::new(0),
            pending: Mutex::new(VecDeque::new()),
            connected_at: Mutex::new(None),
            disconnects: AtomicU32::new(0),
            settings: Mutex::new(AppliedSettings::default()),
            behavior,
            clock,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Queue one scripted frame number.
    pub fn push_frame(&self, frame_number: u64) {
        self.inner.pending.lock().unwrap().push_back(frame_number);
    }

    /// Queue a run of scripted frame numbers.
    pub fn push_frames(&self, frame_numbers: impl IntoIterator<Item = u64>) {
        self.inner
            .pending
            .lock()
            .unwrap()
            .extend(frame_numbers);
    }

    /// Total connect attempts observed, successful or not.
    pub fn connect_attempts(&self) -> u32 {
        self.inner.connect_attempts.load(Ordering::SeqCst)
    }

    /// Number of connected -> disconnected transitions.
    pub fn disconnect_count(&self) -> u32 {
        self.inner.disconnects.load(Ordering::SeqCst)
    }

    /// Settings applied by the arbiter during startup.
    pub fn applied_settings(&self) -> AppliedSettings {
        self.inner.settings.lock().unwrap().clone()
    }
}

impl Default for MockCaptureClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureClient for MockCaptureClient {
    fn connect(&mut self, address: &str) -> CaptureResult<()> {
        self.inner.connect_attempts.fetch_add(1, Ordering::SeqCst);

        let left = self.inner.failed_connects_left.load(Ordering::SeqCst);
        if left > 0 {
            self.inner
                .failed_connects_left
                .store(left.saturating_sub(1), Ordering::SeqCst);
            debug!(address = %address, "mock connect refused");
            return Err(CaptureError::client("mock connect refused"));
        }

        self.inner
            .warmup_left
            .store(self.inner.behavior.warmup_polls, Ordering::SeqCst);
        self.inner
            .non_finite_left
            .store(self.inner.behavior.non_finite_rate_polls, Ordering::SeqCst);
        *self.inner.connected_at.lock().unwrap() = Some(Instant::now());
        self.inner.connected.store(true, Ordering::SeqCst);
        debug!(address = %address, "mock connected");
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.inner.connected.swap(false, Ordering::SeqCst) {
            self.inner.disconnects.fetch_add(1, Ordering::SeqCst);
            debug!("mock disconnected");
        }
    }

    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    fn set_category(&mut self, category: DataCategory, enabled: bool) {
        self.inner
            .settings
            .lock()
            .unwrap()
            .categories
            .insert(category, enabled);
    }

    fn set_stream_mode(&mut self, mode: StreamMode) {
        self.inner.settings.lock().unwrap().stream_mode = Some(mode);
    }

    fn set_axis_mapping(&mut self, forward: Direction, left: Direction, up: Direction) {
        self.inner.settings.lock().unwrap().axis_mapping = Some((forward, left, up));
    }

    fn get_frame(&mut self) -> CaptureResult<()> {
        if !self.inner.connected.load(Ordering::SeqCst) {
            return Err(CaptureError::NotConnected);
        }

        let warmup = self.inner.warmup_left.load(Ordering::SeqCst);
        if warmup > 0 {
            self.inner.warmup_left.store(warmup - 1, Ordering::SeqCst);
            return Err(CaptureError::FrameUnavailable);
        }

        match self.inner.clock {
            FrameClock::Scripted => {
                if let Some(next) = self.inner.pending.lock().unwrap().pop_front() {
                    self.inner.current_frame.store(next, Ordering::SeqCst);
                    trace!(frame_number = next, "mock frame retrieved");
                }
            }
            FrameClock::FreeRunning { hz } => {
                let elapsed = self
                    .inner
                    .connected_at
                    .lock()
                    .unwrap()
                    .map(|t| t.elapsed().as_secs_f64())
                    .unwrap_or(0.0);
                let frame = 1 + (elapsed * hz) as u64;
                self.inner
                    .current_frame
                    .fetch_max(frame, Ordering::SeqCst);
            }
        }

        Ok(())
    }

    fn frame_number(&self) -> u64 {
        self.inner.current_frame.load(Ordering::SeqCst)
    }

    fn frame_rate(&self) -> CaptureResult<f64> {
        if !self.inner.connected.load(Ordering::SeqCst) {
            return Err(CaptureError::NotConnected);
        }

        let left = self.inner.non_finite_left.load(Ordering::SeqCst);
        if left > 0 {
            self.inner.non_finite_left.store(left - 1, Ordering::SeqCst);
            return Ok(f64::NAN);
        }

        Ok(self.inner.behavior.frame_rate_hz)
    }
}
