//! Protocol module - wire format, framing, and frame types.
//!
//! This module implements the sensor's serial protocol:
//! - 9-byte frame layout, checksum, and the fixed read command
//! - Frame buffer for accumulating partial reads and resynchronizing
//! - Response frame with checksum-validated value decoding

mod frame;
mod frame_buffer;
mod wire_format;

pub use frame::ResponseFrame;
pub use frame_buffer::FrameBuffer;
pub use wire_format::{
    checksum, CMD_GAS_CONCENTRATION, FRAME_SIZE, FRAME_START, MAX_GARBAGE_BYTES, READ_GAS_COMMAND,
    SENSOR_ADDR,
};
