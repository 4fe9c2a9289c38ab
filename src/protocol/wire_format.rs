//! Wire format constants and checksum.
//!
//! Both directions use the same fixed 9-byte frame:
//! ```text
//! ┌────────┬─────────┬───────────────────┬──────────┐
//! │ Start  │ Cmd     │ Payload           │ Checksum │
//! │ 1 byte │ 1 byte  │ 6 bytes           │ 1 byte   │
//! │ 0xFF   │         │ value u16 BE + 4  │          │
//! └────────┴─────────┴───────────────────┴──────────┘
//! ```
//!
//! Outbound, byte 1 is the sensor address (`0x01`) and byte 2 the command.
//! Inbound, byte 1 echoes the command and bytes 2–3 carry the value.
//! The checksum covers bytes 1–7 in both directions.

/// Frame size in bytes (fixed, exactly 9).
pub const FRAME_SIZE: usize = 9;

/// Start byte marking the beginning of every frame.
pub const FRAME_START: u8 = 0xFF;

/// Sensor address used in outbound command frames.
pub const SENSOR_ADDR: u8 = 0x01;

/// Command: read gas concentration. Echoed as byte 1 of the response.
pub const CMD_GAS_CONCENTRATION: u8 = 0x86;

/// Unmatched bytes tolerated before the receive buffer is discarded.
///
/// Line noise or a drifted stream can fill the buffer with bytes that never
/// form a marker; past this bound the whole buffer is dropped.
pub const MAX_GARBAGE_BYTES: usize = 20;

/// The fixed outbound read command: `FF 01 86 00 00 00 00 00 79`.
///
/// The trailing byte is the checksum over bytes 1–7, computed with the same
/// algorithm as inbound frames.
pub const READ_GAS_COMMAND: [u8; FRAME_SIZE] = [
    FRAME_START,
    SENSOR_ADDR,
    CMD_GAS_CONCENTRATION,
    0x00,
    0x00,
    0x00,
    0x00,
    0x00,
    0x79,
];

/// Compute the frame checksum over bytes 1–7.
///
/// Datasheet formula: `(0xFF - sum(bytes[1..=7]) + 1) & 0xFF`, which is the
/// two's complement of the wrapping byte sum.
///
/// # Example
///
/// ```
/// use mhz19_client::protocol::{checksum, READ_GAS_COMMAND};
///
/// assert_eq!(checksum(&READ_GAS_COMMAND), 0x79);
/// ```
pub fn checksum(frame: &[u8; FRAME_SIZE]) -> u8 {
    frame[1..8]
        .iter()
        .fold(0u8, |sum, b| sum.wrapping_add(*b))
        .wrapping_neg()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_command_checksum_is_self_consistent() {
        assert_eq!(checksum(&READ_GAS_COMMAND), READ_GAS_COMMAND[8]);
    }

    #[test]
    fn test_read_command_layout() {
        assert_eq!(READ_GAS_COMMAND.len(), FRAME_SIZE);
        assert_eq!(READ_GAS_COMMAND[0], FRAME_START);
        assert_eq!(READ_GAS_COMMAND[1], SENSOR_ADDR);
        assert_eq!(READ_GAS_COMMAND[2], CMD_GAS_CONCENTRATION);
        assert!(READ_GAS_COMMAND[3..8].iter().all(|&b| b == 0x00));
        assert_eq!(READ_GAS_COMMAND[8], 0x79);
    }

    #[test]
    fn test_checksum_known_response() {
        // Response carrying 0x0258 (600): FF 86 02 58 00 00 00 00 <cs>
        // sum(86 02 58) = 0xE0, 0x100 - 0xE0 = 0x20
        let frame = [0xFF, 0x86, 0x02, 0x58, 0x00, 0x00, 0x00, 0x00, 0x20];
        assert_eq!(checksum(&frame), 0x20);
    }

    #[test]
    fn test_checksum_ignores_start_byte() {
        let a = [0xFF, 0x86, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let mut b = a;
        b[0] = 0x00;
        assert_eq!(checksum(&a), checksum(&b));
    }

    #[test]
    fn test_checksum_wraps_modulo_256() {
        // sum(bytes 1..=7) = 0x86 + 6 * 0xFF = 0x680 -> 0x80 mod 256
        let frame = [0xFF, 0x86, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];
        assert_eq!(checksum(&frame), 0x80u8.wrapping_neg());
    }

    #[test]
    fn test_checksum_all_zero_payload() {
        let frame = [0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(checksum(&frame), 0x00);
    }
}
