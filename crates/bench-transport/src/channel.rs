//! Sender/receiver capabilities and runtime transport selection.

use crate::error::TransportError;
use crate::http::{HttpReceiver, HttpSender};
use crate::s3qs::{S3qsReceiver, S3qsSender};
use async_trait::async_trait;
use bytes::Bytes;

/// The pushing side of a channel.
#[async_trait]
pub trait Sender: Send {
    /// Push one buffer to the peer.
    async fn send(&mut self, buffer: Bytes) -> Result<(), TransportError>;

    /// Release the channel. Called exactly once, after the last send.
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Transport name for logging.
    fn name(&self) -> &'static str;
}

/// The draining side of a channel.
///
/// A receiver paired with a sender using buffer size S must request at
/// least S bytes per call; a larger buffer is reported as
/// [`TransportError::Oversized`].
#[async_trait]
pub trait Receiver: Send {
    /// Pull the next buffer, at most `max_size` bytes.
    async fn receive(&mut self, max_size: usize) -> Result<Bytes, TransportError>;

    /// Release the channel. Called exactly once, after the last receive.
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Transport name for logging.
    fn name(&self) -> &'static str;
}

/// Transport and endpoint for the sending side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SenderTransport {
    /// POST buffers to an HTTP receiver.
    Http { host: String, port: u16 },
    /// Store buffers under an S3 prefix and announce them on an SQS queue.
    Sqs { s3_prefix: String, queue_url: String },
}

impl SenderTransport {
    /// Open a sender over this transport.
    pub async fn connect(self) -> Result<Box<dyn Sender>, TransportError> {
        match self {
            SenderTransport::Http { host, port } => Ok(Box::new(HttpSender::new(&host, port))),
            SenderTransport::Sqs {
                s3_prefix,
                queue_url,
            } => Ok(Box::new(S3qsSender::new(&s3_prefix, &queue_url).await?)),
        }
    }

    /// Get the transport name.
    pub fn name(&self) -> &'static str {
        match self {
            SenderTransport::Http { .. } => "http",
            SenderTransport::Sqs { .. } => "sqs",
        }
    }
}

/// Transport and endpoint for the receiving side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverTransport {
    /// Host an HTTP endpoint that senders POST to.
    Http { host: String, port: u16 },
    /// Poll an SQS queue for S3 object announcements.
    Sqs { queue_url: String },
}

impl ReceiverTransport {
    /// Open a receiver over this transport.
    pub async fn connect(self) -> Result<Box<dyn Receiver>, TransportError> {
        match self {
            ReceiverTransport::Http { host, port } => {
                Ok(Box::new(HttpReceiver::bind(&host, port).await?))
            }
            ReceiverTransport::Sqs { queue_url } => {
                Ok(Box::new(S3qsReceiver::new(&queue_url).await?))
            }
        }
    }

    /// Get the transport name.
    pub fn name(&self) -> &'static str {
        match self {
            ReceiverTransport::Http { .. } => "http",
            ReceiverTransport::Sqs { .. } => "sqs",
        }
    }
}
