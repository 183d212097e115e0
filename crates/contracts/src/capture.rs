//! CaptureClient trait - capture SDK abstraction
//!
//! Defines a unified interface over the environment-supplied capture client,
//! decoupling the arbiter from the concrete SDK. Supports unified handling of
//! a real SDK-backed client and mock clients.

use serde::{Deserialize, Serialize};

use crate::error::CaptureResult;
use crate::stream::StreamMode;

/// Data categories the capture server can stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCategory {
    Segment,
    Marker,
    UnlabeledMarker,
    Device,
}

/// Axis directions for the coordinate mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Capture client trait
///
/// Abstracts the SDK operations the arbiter needs: connection lifecycle,
/// per-category toggles, stream-mode/axis configuration and frame retrieval.
/// The arbiter calls `connect`/`get_frame` from different threads at
/// different times, always with exclusive access.
///
/// # Contract
///
/// - `frame_number` reports the sequence number of the most recently
///   retrieved frame and is monotonically non-decreasing while connected;
///   `0` means no frame has been retrieved yet.
/// - `frame_rate` may return `Ok` with a non-finite value while the server
///   is still measuring; callers must re-poll until the value is finite.
pub trait CaptureClient: Send {
    /// Connect to the capture server.
    fn connect(&mut self, address: &str) -> CaptureResult<()>;

    /// Drop the connection. Idempotent.
    fn disconnect(&mut self);

    /// Whether a connection is currently established.
    fn is_connected(&self) -> bool;

    /// Enable or disable streaming of one data category.
    fn set_category(&mut self, category: DataCategory, enabled: bool);

    /// Select the delivery discipline.
    fn set_stream_mode(&mut self, mode: StreamMode);

    /// Fix the coordinate system mapping.
    fn set_axis_mapping(&mut self, forward: Direction, left: Direction, up: Direction);

    /// Retrieve the next frame into the client's internal state.
    ///
    /// `Err` means no frame was available this poll; the caller decides
    /// whether to retry.
    fn get_frame(&mut self) -> CaptureResult<()>;

    /// Sequence number of the most recently retrieved frame.
    fn frame_number(&self) -> u64;

    /// Server-reported frame rate in Hz.
    fn frame_rate(&self) -> CaptureResult<f64>;
}
