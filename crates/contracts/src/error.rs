//! Layered error definitions
//!
//! Categorized by phase: connection / startup validation / runtime polling.

use thiserror::Error;

/// Unified error type for capture and arbiter operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    // ===== Connection Errors =====
    /// Connect retry budget exhausted at startup.
    #[error("connection to '{address}' failed after {attempts} attempts")]
    ConnectFailed { address: String, attempts: u32 },

    /// Operation requires an established connection.
    #[error("not connected")]
    NotConnected,

    // ===== Startup Validation Errors =====
    /// The connected stream never produced a frame within the poll budget.
    #[error("no frame delivered after {attempts} startup polls")]
    StartupValidation { attempts: u32 },

    /// The server never reported a finite frame rate within the probe budget.
    #[error("no finite frame rate after {attempts} probes")]
    FrameRateUnavailable { attempts: u32 },

    // ===== Runtime Errors =====
    /// No frame was available this poll.
    #[error("no frame available")]
    FrameUnavailable,

    /// SDK-level failure reported by the capture client.
    #[error("capture client error: {message}")]
    Client { message: String },
}

impl CaptureError {
    /// Create a connection failure error.
    pub fn connect_failed(address: impl Into<String>, attempts: u32) -> Self {
        Self::ConnectFailed {
            address: address.into(),
            attempts,
        }
    }

    /// Create an SDK-level client error.
    pub fn client(message: impl Into<String>) -> Self {
        Self::Client {
            message: message.into(),
        }
    }
}

/// Result type alias for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;
