//! Driver task owning all mutable protocol state.
//!
//! One task owns the frame buffer, the single pending-read slot, the
//! last-known reading, and the rate timestamp. Byte arrival, deadline expiry
//! and command messages are the only event sources; `tokio::select!`
//! multiplexes them and each handler runs to completion before the next
//! event is taken, so no locking is needed anywhere.
//!
//! ```text
//! SensorClient ──► mpsc::Sender<Command> ──► Driver ◄──► duplex channel
//!                                              │
//!                                              └─ oneshot reply per read
//! ```
//!
//! The pending slot is an `Option<PendingRead>`: at most one request is
//! outstanding, it resolves exactly once (frame match, deadline, write
//! failure, or close), and taking it out of the slot disarms the deadline
//! select arm for free.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

use crate::client::Reading;
use crate::error::ReadError;
use crate::protocol::{FrameBuffer, READ_GAS_COMMAND};

/// Read chunk size. Serial delivery is a few bytes per chunk; one frame is
/// nine bytes, so this comfortably covers several queued frames.
const READ_CHUNK_SIZE: usize = 64;

/// Message from the client handle to the driver task.
pub(crate) enum Command {
    /// Request a reading; resolved through the oneshot, always.
    Read { reply: oneshot::Sender<Reading> },
    /// Shut the channel down; acknowledged once the pending slot is drained.
    Close { reply: oneshot::Sender<()> },
}

/// Timing configuration, set by the builder.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// Minimum spacing between admitted requests.
    pub min_interval: Duration,
    /// Maximum wait for a response frame before giving up.
    pub response_timeout: Duration,
}

/// The single in-flight read awaiting a matching frame or its deadline.
struct PendingRead {
    reply: oneshot::Sender<Reading>,
    deadline: Instant,
}

pub(crate) struct Driver<T> {
    io: T,
    cmd_rx: mpsc::Receiver<Command>,
    buffer: FrameBuffer,
    pending: Option<PendingRead>,
    /// Most recently decoded value; survives timeouts and disconnects.
    last_value: Option<u16>,
    last_request_at: Option<Instant>,
    connected: bool,
    config: Config,
}

impl<T> Driver<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(io: T, cmd_rx: mpsc::Receiver<Command>, config: Config) -> Self {
        Self {
            io,
            cmd_rx,
            buffer: FrameBuffer::new(),
            pending: None,
            last_value: None,
            last_request_at: None,
            connected: true,
            config,
        }
    }

    /// Main event loop. Runs until every client handle is dropped.
    pub(crate) async fn run(mut self) {
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            let deadline = self.pending.as_ref().map(|p| p.deadline);

            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::Read { reply }) => self.handle_read(reply).await,
                    Some(Command::Close { reply }) => {
                        self.handle_close().await;
                        let _ = reply.send(());
                    }
                    None => {
                        self.handle_close().await;
                        return;
                    }
                },
                read = self.io.read(&mut chunk), if self.connected => match read {
                    Ok(0) => self.on_channel_lost("channel closed by peer"),
                    Ok(n) => self.on_bytes(&chunk[..n]),
                    Err(e) => self.on_channel_lost(&e.to_string()),
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.on_timeout();
                }
            }
        }
    }

    /// The request gate: admits at most one read at a time.
    async fn handle_read(&mut self, reply: oneshot::Sender<Reading>) {
        if !self.connected {
            let _ = reply.send(self.degraded(ReadError::NotConnected));
            return;
        }

        if self.pending.is_some() {
            tracing::debug!("read requested while a request is in flight");
            let _ = reply.send(self.degraded(ReadError::RequestInFlight));
            return;
        }

        let now = Instant::now();
        if let Some(at) = self.last_request_at {
            let elapsed = now.duration_since(at);
            if elapsed < self.config.min_interval {
                tracing::debug!(
                    remaining_ms = (self.config.min_interval - elapsed).as_millis() as u64,
                    "read requested inside the minimum interval"
                );
                let _ = reply.send(self.degraded(ReadError::RateLimited));
                return;
            }
        }

        // Stale bytes from before this command must not satisfy it.
        self.buffer.clear();
        self.last_request_at = Some(now);
        self.pending = Some(PendingRead {
            reply,
            deadline: now + self.config.response_timeout,
        });

        tracing::debug!("sending read command");
        if let Err(e) = self.send_command().await {
            tracing::warn!(error = %e, "failed to write read command");
            if let Some(p) = self.pending.take() {
                let _ = p.reply.send(Reading {
                    value: self.last_value,
                    success: false,
                    error: Some(ReadError::WriteFailed(e.to_string())),
                });
            }
        }
    }

    async fn send_command(&mut self) -> std::io::Result<()> {
        self.io.write_all(&READ_GAS_COMMAND).await?;
        self.io.flush().await
    }

    /// Byte arrival: extract candidates, validate, correlate.
    fn on_bytes(&mut self, data: &[u8]) {
        for frame in self.buffer.push(data) {
            match frame.value() {
                Ok(value) => self.on_value(value),
                Err(e) => {
                    tracing::warn!(error = %e, frame = ?frame.as_bytes(), "dropping corrupt frame");
                }
            }
        }
    }

    /// The correlator: the last-known cell is written unconditionally; the
    /// pending request, if any, resolves with the same value.
    fn on_value(&mut self, value: u16) {
        // Steady-state readings stay quiet; log loudly only on a jump.
        match self.last_value {
            Some(prev) if prev.abs_diff(value) <= 100 => {
                tracing::debug!(value, "gas concentration")
            }
            _ => tracing::info!(value, "gas concentration"),
        }
        self.last_value = Some(value);

        match self.pending.take() {
            Some(p) => {
                let _ = p.reply.send(Reading {
                    value: Some(value),
                    success: true,
                    error: None,
                });
            }
            None => tracing::debug!(value, "passive update, no request outstanding"),
        }
    }

    /// Deadline elapsed with no matching frame.
    fn on_timeout(&mut self) {
        if let Some(p) = self.pending.take() {
            tracing::warn!(
                timeout_ms = self.config.response_timeout.as_millis() as u64,
                "no response before the deadline"
            );
            let _ = p.reply.send(self.degraded(ReadError::Timeout));
        }
    }

    /// Transport error or EOF: log, degrade, keep serving last-known
    /// readings. A pending request runs out its deadline as usual.
    fn on_channel_lost(&mut self, reason: &str) {
        tracing::warn!(reason, "duplex channel lost");
        self.connected = false;
    }

    /// Close the channel: resolve the pending request exactly once, disarm
    /// its deadline, shut down the write half. Idempotent.
    async fn handle_close(&mut self) {
        if !self.connected && self.pending.is_none() {
            return;
        }
        self.connected = false;

        if let Some(p) = self.pending.take() {
            let _ = p.reply.send(self.degraded(ReadError::NotConnected));
        }

        if let Err(e) = self.io.shutdown().await {
            tracing::debug!(error = %e, "error shutting down channel");
        }
        tracing::debug!("channel closed");
    }

    /// A degraded result: the last known reading with an informational
    /// error; `success` reflects whether any value was ever obtained.
    fn degraded(&self, error: ReadError) -> Reading {
        Reading {
            value: self.last_value,
            success: self.last_value.is_some(),
            error: Some(error),
        }
    }
}
