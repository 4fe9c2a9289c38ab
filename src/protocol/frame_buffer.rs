//! Frame buffer for accumulating partial reads.
//!
//! Serial delivery is chunked with no relation to frame boundaries: a frame
//! may arrive one byte at a time, or several frames in one read. The buffer
//! accumulates bytes in arrival order in a `bytes::BytesMut` and extracts
//! 9-byte candidates by scanning for the two-byte marker (`0xFF` start byte
//! followed by the command echo).
//!
//! There is no length prefix and no trailing delimiter, so resynchronization
//! after noise relies on the marker scan plus a garbage bound: if the buffer
//! grows past [`MAX_GARBAGE_BYTES`] without an extractable marker, the whole
//! buffer is discarded.
//!
//! # Example
//!
//! ```
//! use mhz19_client::protocol::FrameBuffer;
//!
//! let mut buffer = FrameBuffer::new();
//! let frames = buffer.push(&[0xFF, 0x86, 0x02, 0x58, 0, 0, 0, 0, 0x20]);
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].value().unwrap(), 600);
//! ```

use bytes::BytesMut;

use super::frame::ResponseFrame;
use super::wire_format::{CMD_GAS_CONCENTRATION, FRAME_SIZE, FRAME_START, MAX_GARBAGE_BYTES};

/// Buffer for accumulating incoming bytes and extracting frame candidates.
///
/// The buffer is the only mutable receive state in the protocol; it is owned
/// by the driver task and reset explicitly when a new request is admitted.
pub struct FrameBuffer {
    /// Accumulated bytes from channel reads, in arrival order.
    buffer: BytesMut,
}

impl FrameBuffer {
    /// Create an empty frame buffer.
    pub fn new() -> Self {
        Self {
            // A handful of frames plus noise; serial chunks are tiny.
            buffer: BytesMut::with_capacity(4 * FRAME_SIZE),
        }
    }

    /// Push data into the buffer and extract all complete frame candidates.
    ///
    /// This is the main API for processing incoming chunks. Candidates are
    /// extracted marker-first and are *not* checksum-validated here; see
    /// [`ResponseFrame::value`]. Extracting before validation means a corrupt
    /// frame still consumes its bytes, so the frames behind it stay
    /// reachable.
    ///
    /// Returns an empty vector while a frame is still incomplete.
    pub fn push(&mut self, data: &[u8]) -> Vec<ResponseFrame> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.try_extract_one() {
            frames.push(frame);
        }

        // No extractable marker: either everything so far is noise, or a
        // frame is still arriving. Only the former justifies a reset.
        if frames.is_empty() && self.buffer.len() > MAX_GARBAGE_BYTES && !self.has_marker() {
            tracing::warn!(
                discarded = self.buffer.len(),
                "no frame marker in receive buffer, discarding"
            );
            self.buffer.clear();
        }

        frames
    }

    /// Try to extract a single 9-byte candidate.
    ///
    /// Scans for the earliest marker index with at least [`FRAME_SIZE`]
    /// bytes available from it, and consumes through the candidate's end.
    /// Bytes before the marker are noise and are consumed with it.
    fn try_extract_one(&mut self) -> Option<ResponseFrame> {
        let start = self.find_marker()?;
        if self.buffer.len() - start < FRAME_SIZE {
            return None;
        }

        let _ = self.buffer.split_to(start);
        let raw = self.buffer.split_to(FRAME_SIZE);

        let mut bytes = [0u8; FRAME_SIZE];
        bytes.copy_from_slice(&raw);
        Some(ResponseFrame::new(bytes))
    }

    /// Find the earliest index where the two-byte marker matches.
    fn find_marker(&self) -> Option<usize> {
        self.buffer
            .windows(2)
            .position(|w| w[0] == FRAME_START && w[1] == CMD_GAS_CONCENTRATION)
    }

    fn has_marker(&self) -> bool {
        self.find_marker().is_some()
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discard all buffered bytes.
    ///
    /// Invoked by the driver when a new request is admitted, so a stale
    /// partial frame from before the command cannot satisfy it.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
