//! # Arbiter
//!
//! Live-stream distribution arbiter. Owns the connection to a capture
//! server, polls it for new frames on a dedicated worker thread, and fans
//! each accepted frame out to a dynamically changing set of subscribers.
//!
//! The capture protocol itself lives behind `contracts::CaptureClient`;
//! this crate only manages lifecycle, polling, loss detection and dispatch.
//!
//! ## Example
//!
//! ```ignore
//! let client = capture::MockCaptureClient::free_running(100.0);
//! let mut stream = arbiter::ViconStream::new(client, "192.168.1.10:801", Box::new(std::io::stdout()));
//!
//! let id = stream.subscribe(|frame| println!("frame {}", frame.frame_number));
//! assert!(stream.start(contracts::StreamConfig::default()));
//! // ... frames are dispatched on the grabber thread ...
//! stream.unsubscribe(id);
//! stream.stop();
//! ```

mod connection;
mod grabber;
mod log;
mod registry;
mod stream;

pub use crate::log::ViconLog;
pub use registry::SubscriberRegistry;
pub use stream::{StreamState, ViconStream};
