//! # mhz19-client
//!
//! Async client for MH-Z19C gas concentration sensors over a duplex byte
//! channel (8N1 serial, fixed baud, no flow control).
//!
//! ## Architecture
//!
//! - **Framing** ([`protocol`]): the inbound stream arrives in arbitrary
//!   chunks with no delimiters beyond a two-byte marker. A frame buffer
//!   reassembles fixed 9-byte frames, resynchronizes past noise, and a
//!   checksum guards every candidate.
//! - **Correlation** (driver task): exactly one request may be outstanding;
//!   the next valid frame resolves it. Unsolicited frames update the
//!   last-known reading passively.
//! - **Gating** ([`SensorClient::read`]): a minimum inter-request interval
//!   and a response deadline make every read a bounded, always-resolving
//!   operation: degraded paths return the last known reading instead of
//!   failing.
//!
//! ## Example
//!
//! ```ignore
//! use mhz19_client::SensorClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let port = open_serial_port(); // any AsyncRead + AsyncWrite duplex
//!     let client = SensorClient::connect(port);
//!
//!     let reading = client.read().await;
//!     if reading.success {
//!         println!("CO2: {:?} ppm", reading.value);
//!     }
//!
//!     client.close().await;
//! }
//! ```

pub mod error;
pub mod protocol;

mod client;
mod driver;

pub use client::{
    ClientBuilder, Reading, SensorClient, DEFAULT_CHANNEL_CAPACITY, DEFAULT_MIN_INTERVAL,
    DEFAULT_RESPONSE_TIMEOUT,
};
pub use error::{FrameError, ReadError};
