//! ViconStream façade - composition and lifecycle.

use std::io::Write;
use std::sync::{Arc, Mutex};

use contracts::{CaptureClient, FrameView, StreamConfig, SubscriptionId};
use tracing::{error, info, warn};

use crate::connection;
use crate::grabber::FrameGrabber;
use crate::log::ViconLog;
use crate::registry::SubscriberRegistry;

/// Connection/lifecycle state of the arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Connecting,
    Streaming,
    ShuttingDown,
}

/// The live-stream arbiter façade.
///
/// Composes the connection manager, the frame grabber worker and the
/// subscriber registry. `start`/`stop` run on the caller's thread and block
/// until the transition is complete; `subscribe`/`unsubscribe` may be called
/// from any thread at any time, including from inside a dispatch callback.
///
/// At most one worker is alive at a time, and dropping the arbiter stops it,
/// so no background work ever outlives the object.
pub struct ViconStream<C: CaptureClient + 'static> {
    host: String,
    log: Arc<ViconLog>,
    client: Arc<Mutex<C>>,
    registry: Arc<SubscriberRegistry>,
    grabber: Option<FrameGrabber>,
    state: StreamState,
    frame_rate_hz: Option<f64>,
}

impl<C: CaptureClient + 'static> ViconStream<C> {
    /// Create an arbiter for `host`, logging to `log_sink`. Elapsed-time log
    /// stamps are measured from this call.
    pub fn new(client: C, host: impl Into<String>, log_sink: Box<dyn Write + Send>) -> Self {
        Self {
            host: host.into(),
            log: Arc::new(ViconLog::new(log_sink)),
            client: Arc::new(Mutex::new(client)),
            registry: Arc::new(SubscriberRegistry::new()),
            grabber: None,
            state: StreamState::Idle,
            frame_rate_hz: None,
        }
    }

    /// Connect, configure and validate the stream, then spawn the grabber.
    ///
    /// Blocks through the whole startup sequence. Returns `false` on any
    /// failure — the failure is logged, no worker exists afterwards and the
    /// client is left disconnected. Starting while already streaming is
    /// rejected with `false`.
    pub fn start(&mut self, config: StreamConfig) -> bool {
        if self.grabber.is_some() {
            warn!(host = %self.host, "start rejected: stream already running");
            self.log.line("Warning: stream already running, start rejected.");
            return false;
        }

        self.state = StreamState::Connecting;
        let outcome = {
            let mut client = self.client.lock().unwrap();
            connection::establish(&mut *client, &self.host, &config, &self.log)
        };

        match outcome {
            Ok(rate) => {
                self.frame_rate_hz = Some(rate);
                self.log.line("Starting the frame grabber thread...");
                self.grabber = Some(FrameGrabber::spawn(
                    Arc::clone(&self.client),
                    Arc::clone(&self.registry),
                    Arc::clone(&self.log),
                ));
                self.state = StreamState::Streaming;
                info!(host = %self.host, frame_rate_hz = rate, "streaming started");
                true
            }
            Err(e) => {
                self.state = StreamState::Idle;
                error!(host = %self.host, error = %e, "stream startup failed");
                false
            }
        }
    }

    /// Stop streaming: signal the grabber, join it, then disconnect.
    ///
    /// Idempotent — with no worker running this is a no-op and produces no
    /// log lines. After return, no dispatch pass can start.
    pub fn stop(&mut self) {
        let Some(grabber) = self.grabber.take() else {
            return;
        };

        self.state = StreamState::ShuttingDown;
        self.log.line("Terminating the frame grabber...");
        grabber.stop();
        self.log.line("Frame grabber terminated!");

        self.client.lock().unwrap().disconnect();
        self.log.line(&format!("Connection to {} closed.", self.host));
        info!(host = %self.host, "streaming stopped");

        self.state = StreamState::Idle;
        self.frame_rate_hz = None;
    }

    /// Register a callback invoked once per accepted frame, on the grabber
    /// thread. Returns the subscription id used for [`ViconStream::unsubscribe`].
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&FrameView) + Send + Sync + 'static,
    {
        self.registry.register(Arc::new(callback))
    }

    /// Remove a subscription; reports whether the id was known. No callback
    /// for this id is invoked in any pass beginning after this returns.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry.unregister(id)
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_streaming(&self) -> bool {
        self.grabber.is_some()
    }

    /// Server frame rate obtained during the last successful start.
    pub fn frame_rate_hz(&self) -> Option<f64> {
        self.frame_rate_hz
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl<C: CaptureClient + 'static> Drop for ViconStream<C> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::MockCaptureClient;

    fn sink() -> Box<dyn Write + Send> {
        Box::new(std::io::sink())
    }

    #[test]
    fn test_start_while_streaming_rejected() {
        let client = MockCaptureClient::free_running(500.0);
        let mut stream = ViconStream::new(client, "mock:801", sink());

        assert!(stream.start(StreamConfig::default()));
        assert_eq!(stream.state(), StreamState::Streaming);
        assert!(!stream.start(StreamConfig::default()));
        assert!(stream.is_streaming());

        stream.stop();
        assert_eq!(stream.state(), StreamState::Idle);
    }

    #[test]
    fn test_drop_stops_the_worker() {
        let client = MockCaptureClient::free_running(500.0);
        let controller = client.clone();

        {
            let mut stream = ViconStream::new(client, "mock:801", sink());
            assert!(stream.start(StreamConfig::default()));
        }

        assert!(!controller.is_connected());
        assert_eq!(controller.disconnect_count(), 1);
    }

    #[test]
    fn test_subscription_surface() {
        let client = MockCaptureClient::new();
        let stream = ViconStream::new(client, "mock:801", sink());

        let id = stream.subscribe(|_| {});
        assert_eq!(stream.subscriber_count(), 1);
        assert!(stream.unsubscribe(id));
        assert!(!stream.unsubscribe(id));
        assert_eq!(stream.subscriber_count(), 0);
    }
}
