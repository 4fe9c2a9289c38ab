//! Response frame with typed accessors.
//!
//! A [`ResponseFrame`] is a 9-byte candidate extracted by the
//! [`FrameBuffer`](super::FrameBuffer). Extraction only guarantees the
//! marker matched; integrity is checked by [`ResponseFrame::value`], which
//! recomputes the checksum before decoding. A candidate that fails the check
//! is dropped by the caller and scanning resumes; one corrupt frame must
//! never stall recognition of the frames behind it.

use crate::error::FrameError;

use super::wire_format::{checksum, FRAME_SIZE};

/// A complete 9-byte response frame candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseFrame {
    bytes: [u8; FRAME_SIZE],
}

impl ResponseFrame {
    /// Wrap a raw 9-byte candidate.
    pub fn new(bytes: [u8; FRAME_SIZE]) -> Self {
        Self { bytes }
    }

    /// Get the raw frame bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; FRAME_SIZE] {
        &self.bytes
    }

    /// Get the start byte (byte 0).
    #[inline]
    pub fn start_byte(&self) -> u8 {
        self.bytes[0]
    }

    /// Get the command echo (byte 1).
    #[inline]
    pub fn command(&self) -> u8 {
        self.bytes[1]
    }

    /// Get the checksum byte carried by the frame (byte 8).
    #[inline]
    pub fn carried_checksum(&self) -> u8 {
        self.bytes[8]
    }

    /// Check the carried checksum against the computed one.
    #[inline]
    pub fn checksum_ok(&self) -> bool {
        checksum(&self.bytes) == self.carried_checksum()
    }

    /// Validate the frame and decode the gas concentration.
    ///
    /// Recomputes the checksum over bytes 1–7; on mismatch returns
    /// [`FrameError::ChecksumMismatch`] without touching any state. On match
    /// decodes the big-endian u16 from bytes 2–3.
    pub fn value(&self) -> Result<u16, FrameError> {
        let expected = checksum(&self.bytes);
        let actual = self.carried_checksum();
        if expected != actual {
            return Err(FrameError::ChecksumMismatch { expected, actual });
        }
        Ok(u16::from_be_bytes([self.bytes[2], self.bytes[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire_format::{CMD_GAS_CONCENTRATION, FRAME_START};

    /// Build a valid response frame carrying the given value.
    fn make_frame(value: u16) -> ResponseFrame {
        let [hi, lo] = value.to_be_bytes();
        let mut bytes = [FRAME_START, CMD_GAS_CONCENTRATION, hi, lo, 0, 0, 0, 0, 0];
        bytes[8] = checksum(&bytes);
        ResponseFrame::new(bytes)
    }

    #[test]
    fn test_decode_known_value() {
        let frame = make_frame(600);
        assert_eq!(frame.as_bytes()[2], 0x02);
        assert_eq!(frame.as_bytes()[3], 0x58);
        assert_eq!(frame.value().unwrap(), 600);
    }

    #[test]
    fn test_accessors() {
        let frame = make_frame(600);
        assert_eq!(frame.start_byte(), FRAME_START);
        assert_eq!(frame.command(), CMD_GAS_CONCENTRATION);
        assert_eq!(frame.carried_checksum(), 0x20);
        assert!(frame.checksum_ok());
    }

    #[test]
    fn test_decode_is_big_endian() {
        let frame = make_frame(0x0102);
        assert_eq!(frame.value().unwrap(), 258);
    }

    #[test]
    fn test_decode_extremes() {
        assert_eq!(make_frame(0).value().unwrap(), 0);
        assert_eq!(make_frame(u16::MAX).value().unwrap(), u16::MAX);
    }

    #[test]
    fn test_corrupt_checksum_rejected() {
        let mut bytes = *make_frame(600).as_bytes();
        bytes[8] ^= 0xFF;
        let frame = ResponseFrame::new(bytes);

        assert!(!frame.checksum_ok());
        match frame.value() {
            Err(FrameError::ChecksumMismatch { expected, actual }) => {
                assert_eq!(expected, 0x20);
                assert_eq!(actual, 0x20 ^ 0xFF);
            }
            other => panic!("expected checksum mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_payload_rejected() {
        let mut bytes = *make_frame(600).as_bytes();
        bytes[3] ^= 0x01; // value byte flipped, carried checksum now stale
        let frame = ResponseFrame::new(bytes);
        assert!(frame.value().is_err());
    }

    #[test]
    fn test_reserved_bytes_participate_in_checksum() {
        let mut bytes = *make_frame(600).as_bytes();
        bytes[7] = 0x01;
        assert!(ResponseFrame::new(bytes).value().is_err());
    }
}
