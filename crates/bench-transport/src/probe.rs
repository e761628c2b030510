//! Throughput probe: time a fixed number of fixed-size transfers.

use crate::channel::{Receiver, Sender};
use crate::error::TransportError;
use bytes::Bytes;
use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default transfer size: 8 MiB.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024 * 1024;

/// Default number of timed transfers.
pub const DEFAULT_BUFFER_COUNT: u64 = 12800;

/// Drives a sender or receiver through one warm-up and `buffer_count`
/// timed transfers of `buffer_size` bytes, then closes it.
#[derive(Debug, Clone, Copy)]
pub struct ThroughputProbe {
    buffer_size: usize,
    buffer_count: u64,
}

/// Start of the timed section.
struct Timer {
    started_at_ms: i64,
    started: Instant,
}

impl Timer {
    fn start() -> Self {
        Self {
            started_at_ms: Utc::now().timestamp_millis(),
            started: Instant::now(),
        }
    }
}

impl ThroughputProbe {
    /// Create a probe with explicit transfer size and count.
    pub fn new(buffer_size: usize, buffer_count: u64) -> Self {
        Self {
            buffer_size,
            buffer_count,
        }
    }

    /// Transfer size in bytes.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Number of timed transfers.
    pub fn buffer_count(&self) -> u64 {
        self.buffer_count
    }

    /// Run the probe against a sender.
    pub async fn run_sender(&self, sender: &mut dyn Sender) -> Result<ProbeReport, TransportError> {
        info!(
            "Sending {} buffers of {} bytes over {}",
            self.buffer_count,
            self.buffer_size,
            sender.name()
        );
        let buffer = Bytes::from(vec![0u8; self.buffer_size]);

        let sent = self.send_all(sender, &buffer).await;
        let closed = sender.close().await;
        self.finish(sent, closed)
    }

    /// Run the probe against a receiver.
    pub async fn run_receiver(
        &self,
        receiver: &mut dyn Receiver,
    ) -> Result<ProbeReport, TransportError> {
        info!(
            "Receiving {} buffers of {} bytes over {}",
            self.buffer_count,
            self.buffer_size,
            receiver.name()
        );

        let received = self.receive_all(receiver).await;
        let closed = receiver.close().await;
        self.finish(received, closed)
    }

    async fn send_all(&self, sender: &mut dyn Sender, buffer: &Bytes) -> Result<Timer, TransportError> {
        // Warm-up absorbs connection setup and is not timed.
        sender.send(buffer.clone()).await?;
        debug!("Warm-up send complete");

        let timer = Timer::start();
        for _ in 0..self.buffer_count {
            sender.send(buffer.clone()).await?;
        }
        Ok(timer)
    }

    async fn receive_all(&self, receiver: &mut dyn Receiver) -> Result<Timer, TransportError> {
        receiver.receive(self.buffer_size).await?;
        debug!("Warm-up receive complete");

        let timer = Timer::start();
        for _ in 0..self.buffer_count {
            receiver.receive(self.buffer_size).await?;
        }
        Ok(timer)
    }

    /// Stop the clock after close. A transfer error takes precedence over a
    /// close error.
    fn finish(
        &self,
        transferred: Result<Timer, TransportError>,
        closed: Result<(), TransportError>,
    ) -> Result<ProbeReport, TransportError> {
        let timer = match (transferred, closed) {
            (Ok(timer), Ok(())) => timer,
            (Ok(_), Err(e)) => return Err(e),
            (Err(e), Ok(())) => return Err(e),
            (Err(e), Err(close_err)) => {
                warn!("Failed to close channel after transfer error: {}", close_err);
                return Err(e);
            }
        };

        Ok(ProbeReport {
            buffer_size: self.buffer_size,
            buffer_count: self.buffer_count,
            started_at_ms: timer.started_at_ms,
            stopped_at_ms: Utc::now().timestamp_millis(),
            elapsed: timer.started.elapsed(),
        })
    }
}

impl Default for ThroughputProbe {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE, DEFAULT_BUFFER_COUNT)
    }
}

/// Timing of one probe run.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// Bytes per transfer.
    pub buffer_size: usize,
    /// Timed transfers.
    pub buffer_count: u64,
    /// Wall clock at the start of the timed section, epoch milliseconds.
    pub started_at_ms: i64,
    /// Wall clock after close, epoch milliseconds.
    pub stopped_at_ms: i64,
    /// Elapsed time of the timed section including close.
    pub elapsed: Duration,
}

impl ProbeReport {
    /// Elapsed time in whole milliseconds.
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Elapsed time in seconds, at millisecond resolution.
    pub fn latency_seconds(&self) -> f64 {
        self.elapsed_ms() as f64 / 1000.0
    }

    /// Transfer rate in MiB per second.
    pub fn rate_mbps(&self) -> f64 {
        let elapsed_ms = self.elapsed_ms();
        if elapsed_ms == 0 {
            return 0.0;
        }
        self.buffer_size as f64 * self.buffer_count as f64 * 1000.0
            / 1024.0
            / 1024.0
            / elapsed_ms as f64
    }

    /// Human-readable result lines.
    pub fn summary(&self) -> String {
        format!(
            "latency: {:.3} seconds\n\
             rate: {:.3} MB/s\n\
             start at: {}\n\
             stop at: {}",
            self.latency_seconds(),
            self.rate_mbps(),
            self.started_at_ms,
            self.stopped_at_ms
        )
    }
}
