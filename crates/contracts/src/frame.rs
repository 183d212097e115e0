//! Subscriber-facing frame types.

use std::sync::Arc;

/// Identifier returned by a subscription, used for unsubscription.
///
/// Strictly increasing over an arbiter's lifetime; never reused, even after
/// the subscription is removed.
pub type SubscriptionId = u64;

/// Read-only snapshot of the most recent accepted frame.
///
/// Handed by reference to every subscriber during one dispatch pass; only
/// frames that were retrieved successfully are ever dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameView {
    /// Frame sequence number, monotonically non-decreasing while connected.
    pub frame_number: u64,
}

/// Frame dispatch callback type
///
/// Invoked once per accepted frame, on the grabber thread. Uses `Arc` to
/// allow callback sharing across registry snapshots.
pub type FrameCallback = Arc<dyn Fn(&FrameView) + Send + Sync>;
