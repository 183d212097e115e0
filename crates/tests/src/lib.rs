//! # Integration Tests
//!
//! End-to-end tests of the arbiter against the mock capture client:
//! dispatch ordering and exact-once delivery, unsubscription cutoffs,
//! frame-loss reporting, startup failure paths and shutdown idempotency.

#[cfg(test)]
mod common {
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// In-memory log sink shared between the arbiter and the test.
    #[derive(Clone)]
    pub struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Create a shared log buffer and a boxed sink writing into it.
    pub fn log_buffer() -> (Arc<Mutex<Vec<u8>>>, Box<dyn Write + Send>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        (buffer.clone(), Box::new(SharedSink(buffer)))
    }

    pub fn log_text(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    /// Poll `condition` until it holds or `timeout` elapses.
    pub fn wait_until(mut condition: impl FnMut() -> bool, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        condition()
    }
}

#[cfg(test)]
mod dispatch_tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use arbiter::ViconStream;
    use capture::MockCaptureClient;
    use contracts::StreamConfig;

    use crate::common::{log_buffer, log_text, wait_until};

    /// Register A and B, stream frames 1..=5, unregister A, stream frame 6:
    /// both see 1..=5 exactly once each in registration order, only B sees 6.
    #[test]
    fn test_two_subscribers_then_unsubscribe_one() {
        let client = MockCaptureClient::new();
        let controller = client.clone();
        let (_, sink) = log_buffer();
        let mut stream = ViconStream::new(client, "mock:801", sink);

        let events: Arc<Mutex<Vec<(&str, u64)>>> = Arc::new(Mutex::new(Vec::new()));

        let events_a = events.clone();
        let a = stream.subscribe(move |frame| {
            events_a.lock().unwrap().push(("a", frame.frame_number));
        });
        let events_b = events.clone();
        let _b = stream.subscribe(move |frame| {
            events_b.lock().unwrap().push(("b", frame.frame_number));
        });

        assert!(stream.start(StreamConfig::default()));

        controller.push_frames(1..=5);
        assert!(wait_until(
            || events.lock().unwrap().len() == 10,
            Duration::from_secs(2)
        ));

        let expected: Vec<(&str, u64)> = (1..=5).flat_map(|n| [("a", n), ("b", n)]).collect();
        assert_eq!(*events.lock().unwrap(), expected);

        assert!(stream.unsubscribe(a));

        controller.push_frame(6);
        assert!(wait_until(
            || events.lock().unwrap().last() == Some(&("b", 6)),
            Duration::from_secs(2)
        ));

        stream.stop();

        // A was never invoked for frame 6.
        let final_events = events.lock().unwrap();
        assert_eq!(final_events.len(), 11);
        assert!(!final_events.contains(&("a", 6)));
    }

    /// Frames advancing 10 -> 13 produce exactly one loss warning citing 2
    /// lost frames, and frame 13 is the one dispatched.
    #[test]
    fn test_frame_loss_warning() {
        let client = MockCaptureClient::new();
        let controller = client.clone();
        let (buffer, sink) = log_buffer();
        let mut stream = ViconStream::new(client, "mock:801", sink);

        let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = seen.clone();
        stream.subscribe(move |frame| {
            seen_cb.lock().unwrap().push(frame.frame_number);
        });

        assert!(stream.start(StreamConfig::default()));

        controller.push_frame(10);
        assert!(wait_until(
            || seen.lock().unwrap().last() == Some(&10),
            Duration::from_secs(2)
        ));

        controller.push_frame(13);
        assert!(wait_until(
            || seen.lock().unwrap().last() == Some(&13),
            Duration::from_secs(2)
        ));

        stream.stop();

        assert_eq!(*seen.lock().unwrap(), vec![10, 13]);

        let log = log_text(&buffer);
        let loss_lines: Vec<&str> = log.lines().filter(|l| l.contains("lost")).collect();
        assert_eq!(loss_lines.len(), 1);
        assert!(loss_lines[0].contains("lost 2 frames"));
        assert!(loss_lines[0].contains("(10 -> 13)"));
    }

    /// A frame number that stops moving is dispatched exactly once no matter
    /// how often the worker re-polls it.
    #[test]
    fn test_stale_frames_dispatch_once() {
        let client = MockCaptureClient::new();
        let controller = client.clone();
        let (_, sink) = log_buffer();
        let mut stream = ViconStream::new(client, "mock:801", sink);

        let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = seen.clone();
        stream.subscribe(move |frame| {
            seen_cb.lock().unwrap().push(frame.frame_number);
        });

        assert!(stream.start(StreamConfig::default()));

        controller.push_frame(5);
        assert!(wait_until(
            || !seen.lock().unwrap().is_empty(),
            Duration::from_secs(2)
        ));

        // Plenty of poll iterations at the ~1ms stale cadence.
        std::thread::sleep(Duration::from_millis(50));
        stream.stop();

        assert_eq!(*seen.lock().unwrap(), vec![5]);
    }

    /// Subscription ids keep increasing across register/unregister cycles
    /// and are never handed out twice.
    #[test]
    fn test_subscription_ids_never_reused() {
        let client = MockCaptureClient::new();
        let (_, sink) = log_buffer();
        let stream = ViconStream::new(client, "mock:801", sink);

        let mut issued = Vec::new();
        for _ in 0..5 {
            let id = stream.subscribe(|_| {});
            issued.push(id);
            assert!(stream.unsubscribe(id));
        }

        assert!(issued.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(stream.subscriber_count(), 0);
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use arbiter::{StreamState, ViconStream};
    use capture::{MockBehavior, MockCaptureClient};
    use contracts::{CaptureClient, StreamConfig};

    use crate::common::{log_buffer, log_text, wait_until};

    /// Three consecutive connect failures: `start` returns false, no worker
    /// exists afterwards and `stop` is a silent no-op.
    #[test]
    fn test_connect_failure_leaves_nothing_running() {
        let client = MockCaptureClient::with_behavior(MockBehavior {
            connect_failures: u32::MAX,
            ..Default::default()
        });
        let controller = client.clone();
        let (buffer, sink) = log_buffer();
        let mut stream = ViconStream::new(client, "mock:801", sink);

        assert!(!stream.start(StreamConfig::default()));
        assert!(!stream.is_streaming());
        assert_eq!(stream.state(), StreamState::Idle);
        assert_eq!(controller.connect_attempts(), 3);

        let before = log_text(&buffer);
        assert!(before.contains("Error: Connection failed, aborting!"));

        stream.stop();
        assert_eq!(log_text(&buffer), before);
        assert_eq!(controller.disconnect_count(), 0);
    }

    /// Stopping twice produces no error and no duplicate shutdown log lines.
    #[test]
    fn test_double_stop_is_idempotent() {
        let client = MockCaptureClient::free_running(500.0);
        let (buffer, sink) = log_buffer();
        let mut stream = ViconStream::new(client, "mock:801", sink);

        let frames = Arc::new(AtomicU64::new(0));
        let frames_cb = frames.clone();
        stream.subscribe(move |_| {
            frames_cb.fetch_add(1, Ordering::SeqCst);
        });

        assert!(stream.start(StreamConfig::default()));
        assert!(wait_until(
            || frames.load(Ordering::SeqCst) > 0,
            Duration::from_secs(2)
        ));

        stream.stop();
        let after_first = log_text(&buffer);
        stream.stop();
        assert_eq!(log_text(&buffer), after_first);

        let terminations = after_first
            .lines()
            .filter(|l| l.contains("Terminating the frame grabber..."))
            .count();
        assert_eq!(terminations, 1);
        assert!(after_first.contains("Connection to mock:801 closed."));
    }

    /// A non-finite frame rate during startup is re-probed until finite.
    #[test]
    fn test_frame_rate_recovers_from_non_finite() {
        let client = MockCaptureClient::with_behavior(MockBehavior {
            non_finite_rate_polls: 5,
            frame_rate_hz: 250.0,
            ..Default::default()
        });
        let (buffer, sink) = log_buffer();
        let mut stream = ViconStream::new(client, "mock:801", sink);

        assert!(stream.start(StreamConfig::default()));
        assert_eq!(stream.frame_rate_hz(), Some(250.0));
        assert!(log_text(&buffer).contains("Frame rate:              250 Hz"));

        stream.stop();
    }

    /// A mid-stream disconnection is logged as a severe anomaly and the
    /// worker keeps retrying instead of terminating.
    #[test]
    fn test_runtime_disconnection_logged_and_survived() {
        let client = MockCaptureClient::free_running(500.0);
        let controller = client.clone();
        let (buffer, sink) = log_buffer();
        let mut stream = ViconStream::new(client, "mock:801", sink);

        let frames = Arc::new(AtomicU64::new(0));
        let frames_cb = frames.clone();
        stream.subscribe(move |_| {
            frames_cb.fetch_add(1, Ordering::SeqCst);
        });

        assert!(stream.start(StreamConfig::default()));
        assert!(wait_until(
            || frames.load(Ordering::SeqCst) > 0,
            Duration::from_secs(2)
        ));

        let mut breaker = controller.clone();
        breaker.disconnect();

        assert!(wait_until(
            || log_text(&buffer).contains("Something is horribly wrong!"),
            Duration::from_secs(2)
        ));

        // The loop survives the anomaly; shutdown still works cleanly.
        assert!(stream.is_streaming());
        stream.stop();
        assert!(log_text(&buffer).contains("Frame grabber terminated!"));
    }

    /// The startup sequence applies every category toggle explicitly and
    /// logs the resulting configuration.
    #[test]
    fn test_startup_logs_configuration() {
        let client = MockCaptureClient::new();
        let (buffer, sink) = log_buffer();
        let mut stream = ViconStream::new(client, "mock:801", sink);

        assert!(stream.start(StreamConfig {
            marker_data: true,
            ..Default::default()
        }));
        stream.stop();

        let log = log_text(&buffer);
        assert!(log.contains("Connecting to mock:801..."));
        assert!(log.contains("Success! Connected to mock:801"));
        assert!(log.contains("Segment Data:            enabled"));
        assert!(log.contains("Marker Data:             enabled"));
        assert!(log.contains("Unlabeled Marker Data:   disabled"));
        assert!(log.contains("Device Data:             disabled"));
        assert!(log.contains("Stream mode:             ServerPush"));
        assert!(log.contains("Frame grabber thread started!"));
    }
}
