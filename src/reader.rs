//! Socket reader task: keeps the shared frame buffer filled from the wire.
//!
//! The reader owns the TCP connection to the controller. It loops through
//! Connecting, Reading, and Disconnected states until its cancellation token
//! fires, and contains every transient network failure inside the loop:
//! connect refusals and read errors are logged and retried with bounded
//! exponential backoff, never surfaced as fatal. The reader only ever writes
//! the buffer; decoding belongs to the sampler.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::Endpoint;
use crate::frame::FrameBuffer;

/// Reconnect delay after the first failed attempt; doubles per failure.
const BACKOFF_BASE: Duration = Duration::from_millis(50);
/// Ceiling for the reconnect delay.
const BACKOFF_MAX: Duration = Duration::from_secs(5);

/// Task that owns the TCP connection and continuously refills the frame buffer.
pub struct SocketReader {
    endpoint: Endpoint,
    buffer: Arc<FrameBuffer>,
    cancel: CancellationToken,
}

impl SocketReader {
    pub fn new(endpoint: Endpoint, buffer: Arc<FrameBuffer>, cancel: CancellationToken) -> Self {
        Self { endpoint, buffer, cancel }
    }

    /// Run until cancelled.
    ///
    /// Connection failures never escape this loop; reconnects are retried
    /// indefinitely until the token fires.
    pub async fn run(self) {
        info!("Socket reader started for {}", self.endpoint);
        let mut failures: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let connect = tokio::select! {
                _ = self.cancel.cancelled() => break,
                result = TcpStream::connect((self.endpoint.host.as_str(), self.endpoint.port)) => result,
            };

            match connect {
                Ok(stream) => {
                    failures = 0;
                    info!("Connected to {}", self.endpoint);
                    self.read_frames(stream).await;
                    if self.cancel.is_cancelled() {
                        break;
                    }
                    debug!("Connection to {} ended, reconnecting", self.endpoint);
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    let delay = backoff(failures);
                    warn!(
                        "Connect to {} failed ({}), retry {} in {:?}",
                        self.endpoint, e, failures, delay
                    );
                    tokio::select! {
                        _ = self.cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        info!("Socket reader stopped");
    }

    /// Reading state: pull bytes until the peer closes, an error occurs, or
    /// the token fires. Returning means "reconnect unless cancelled".
    async fn read_frames(&self, mut stream: TcpStream) {
        let mut scratch = vec![0u8; self.buffer.len()];
        let mut reads: u64 = 0;

        loop {
            let read = tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("Reader cancelled during read");
                    return;
                }
                result = stream.read(&mut scratch) => result,
            };

            match read {
                Ok(0) => {
                    info!("Peer closed the connection after {reads} reads");
                    return;
                }
                Ok(n) => {
                    reads += 1;
                    trace!("Read {n} bytes");
                    // Short reads are valid TCP behavior: the buffer keeps
                    // whatever arrived and the next read refreshes it.
                    if let Err(e) = self.buffer.write(0, &scratch[..n]) {
                        warn!("Dropped oversized read: {e}");
                    }
                }
                Err(e) => {
                    warn!("Read error ({e}), reconnecting");
                    return;
                }
            }
        }
    }
}

fn backoff(failures: u32) -> Duration {
    // 50ms, 100ms, 200ms, ... capped at BACKOFF_MAX.
    let shift = failures.saturating_sub(1).min(10);
    (BACKOFF_BASE * (1u32 << shift)).min(BACKOFF_MAX)
}
