//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and
//! traits. All business crates can only depend on this crate, reverse
//! dependencies are prohibited.
//!
//! ## Roles
//! - `CaptureClient` is the seam to the environment-supplied capture SDK;
//!   this workspace never implements the capture protocol itself.
//! - `FrameView` / `FrameCallback` are the subscriber-facing types.

mod capture;
mod error;
mod frame;
mod stream;

pub use capture::{CaptureClient, DataCategory, Direction};
pub use error::{CaptureError, CaptureResult};
pub use frame::{FrameCallback, FrameView, SubscriptionId};
pub use stream::{StreamConfig, StreamMode};
