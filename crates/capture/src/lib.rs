//! # Capture
//!
//! Capture client implementations behind the `contracts::CaptureClient` seam.
//!
//! The real SDK-backed client is supplied by the environment and never
//! implemented here; this crate provides [`MockCaptureClient`], a scriptable
//! in-memory client with failure injection, used by tests, demos and the CLI.

mod mock;

pub use mock::{AppliedSettings, MockBehavior, MockCaptureClient};
