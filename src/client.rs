//! Client handle and builder.
//!
//! [`ClientBuilder`] configures the timing knobs and spawns the driver task
//! over any already-open duplex byte channel. [`SensorClient`] is the public
//! entry point: `read()` resolves immediately on the degraded fast paths and
//! otherwise when the matching frame or the deadline arrives, and it never
//! fails outright;
//! every failure degrades to the last known reading.
//!
//! # Example
//!
//! ```ignore
//! use mhz19_client::SensorClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let port = open_serial_port(); // any AsyncRead + AsyncWrite duplex
//!     let client = SensorClient::connect(port);
//!
//!     loop {
//!         let reading = client.read().await;
//!         if let Some(ppm) = reading.value {
//!             println!("CO2: {} ppm", ppm);
//!         }
//!         tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//!     }
//! }
//! ```

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::driver::{Command, Config, Driver};
use crate::error::ReadError;

/// Default minimum spacing between admitted requests (3 s).
///
/// The sensor needs settling time between measurements; polling faster than
/// this returns the previous reading instead of issuing a command.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(3000);

/// Default maximum wait for a response frame (10 s).
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Default command channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// The result of a [`SensorClient::read`] call.
///
/// `value` is the most recently decoded concentration, if any value was ever
/// obtained; `success` is true when `value` is usable (a fresh frame on the
/// happy path, the retained reading on degraded paths); `error`, when set,
/// says why this reading is degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    /// Gas concentration, or `None` if no value was ever decoded.
    pub value: Option<u16>,
    /// Whether `value` holds a usable reading.
    pub success: bool,
    /// Informational error for degraded readings.
    pub error: Option<ReadError>,
}

impl Reading {
    /// Reading returned when the driver task is no longer reachable.
    fn disconnected() -> Self {
        Self {
            value: None,
            success: false,
            error: Some(ReadError::NotConnected),
        }
    }
}

/// Builder for configuring and connecting a [`SensorClient`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    config: Config,
    channel_capacity: usize,
}

impl ClientBuilder {
    /// Create a builder with the default timing configuration.
    pub fn new() -> Self {
        Self {
            config: Config {
                min_interval: DEFAULT_MIN_INTERVAL,
                response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            },
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Set the minimum spacing between admitted requests.
    ///
    /// Default: 3000 ms.
    pub fn min_interval(mut self, interval: Duration) -> Self {
        self.config.min_interval = interval;
        self
    }

    /// Set the maximum wait for a response frame before a read times out.
    ///
    /// Default: 10 000 ms.
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config.response_timeout = timeout;
        self
    }

    /// Set the command channel capacity.
    ///
    /// Default: 16.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Spawn the driver over an already-open duplex channel.
    ///
    /// The channel is typically a serial port stream; tests use
    /// `tokio::io::duplex`. Opening and configuring the channel is the
    /// caller's responsibility.
    pub fn connect<T>(self, channel: T) -> SensorClient
    where
        T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel(self.channel_capacity);
        let driver = Driver::new(channel, cmd_rx, self.config);
        let task = tokio::spawn(driver.run());

        SensorClient {
            cmd_tx,
            _driver_task: task,
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A connected sensor client.
///
/// Dropping the client stops the driver task.
pub struct SensorClient {
    cmd_tx: mpsc::Sender<Command>,
    _driver_task: JoinHandle<()>,
}

impl SensorClient {
    /// Create a client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Connect with the default configuration.
    pub fn connect<T>(channel: T) -> Self
    where
        T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        ClientBuilder::new().connect(channel)
    }

    /// Request a gas concentration reading.
    ///
    /// Resolves immediately when the channel is closed, a request is already
    /// in flight, or the minimum interval has not elapsed, in each case with
    /// the last known reading and an informational [`ReadError`].
    /// Otherwise it resolves when the matching frame arrives or the response
    /// deadline elapses. Never returns an `Err` and never blocks past the
    /// deadline.
    pub async fn read(&self) -> Reading {
        let (tx, rx) = oneshot::channel();
        if self
            .cmd_tx
            .send(Command::Read { reply: tx })
            .await
            .is_err()
        {
            return Reading::disconnected();
        }
        rx.await.unwrap_or_else(|_| Reading::disconnected())
    }

    /// Close the channel.
    ///
    /// Resolves any pending read once, cancels its deadline, and shuts down
    /// the write half. Safe to call with no outstanding request; later
    /// `read()` calls keep returning the last known reading with
    /// [`ReadError::NotConnected`].
    pub async fn close(&self) {
        let (tx, rx) = oneshot::channel();
        if self.cmd_tx.send(Command::Close { reply: tx }).await.is_ok() {
            let _ = rx.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::new();
        assert_eq!(builder.config.min_interval, DEFAULT_MIN_INTERVAL);
        assert_eq!(builder.config.response_timeout, DEFAULT_RESPONSE_TIMEOUT);
        assert_eq!(builder.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_builder_chaining() {
        let builder = SensorClient::builder()
            .min_interval(Duration::from_millis(500))
            .response_timeout(Duration::from_secs(2))
            .channel_capacity(4);

        assert_eq!(builder.config.min_interval, Duration::from_millis(500));
        assert_eq!(builder.config.response_timeout, Duration::from_secs(2));
        assert_eq!(builder.channel_capacity, 4);
    }

    #[tokio::test]
    async fn test_connect_and_close_without_reads() {
        let (local, _remote) = tokio::io::duplex(64);
        let client = SensorClient::connect(local);

        // close() with no outstanding request must be safe, twice.
        client.close().await;
        client.close().await;
    }

    #[tokio::test]
    async fn test_read_after_close_reports_not_connected() {
        let (local, _remote) = tokio::io::duplex(64);
        let client = SensorClient::connect(local);
        client.close().await;

        let reading = client.read().await;
        assert_eq!(reading.value, None);
        assert!(!reading.success);
        assert_eq!(reading.error, Some(ReadError::NotConnected));
    }
}
