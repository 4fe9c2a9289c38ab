//! Error types for mhz19-client.

use thiserror::Error;

/// Informational error carried inside a [`Reading`](crate::Reading).
///
/// `read()` itself never fails: every degraded path returns the last known
/// reading with one of these attached. None of them is fatal to the link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The duplex channel is closed or was lost.
    #[error("channel not open")]
    NotConnected,

    /// A request is already awaiting its response; no command was sent.
    #[error("request already in flight")]
    RequestInFlight,

    /// Invoked again before the minimum inter-request interval elapsed.
    #[error("rate limited: minimum request interval not elapsed")]
    RateLimited,

    /// No matching frame arrived before the response deadline.
    #[error("response timeout")]
    Timeout,

    /// Writing the command frame to the channel failed.
    #[error("write failed: {0}")]
    WriteFailed(String),
}

/// Frame-level validation error.
///
/// Internal bookkeeping only: a mismatching candidate is logged and dropped,
/// and scanning resumes. Never surfaced through `read()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Carried checksum byte does not match the computed one.
    #[error("checksum mismatch: computed {expected:#04x}, frame carried {actual:#04x}")]
    ChecksumMismatch {
        /// Checksum computed over bytes 1–7.
        expected: u8,
        /// Checksum byte carried by the frame.
        actual: u8,
    },
}
