//! Transport channels and the throughput probe.
//!
//! A benchmarked channel has two roles: a [`Sender`] pushes fixed-size
//! buffers and a [`Receiver`] drains them. Both are implemented over two
//! interchangeable transports:
//!
//! - `http`: the receiver hosts an HTTP endpoint, the sender POSTs buffers to it
//! - `sqs`: the sender stores each buffer in S3 and announces it on an SQS queue
//!
//! [`ThroughputProbe`] drives either role with one untimed warm-up transfer
//! followed by a fixed number of timed transfers.
//!
//! # Example
//!
//! ```ignore
//! use bench_transport::{SenderTransport, ThroughputProbe};
//!
//! let mut sender = SenderTransport::Http { host: "10.0.0.2".into(), port: 8080 }
//!     .connect()
//!     .await?;
//! let report = ThroughputProbe::default().run_sender(sender.as_mut()).await?;
//! println!("{}", report.summary());
//! ```

pub mod channel;
pub mod error;
pub mod http;
pub mod probe;
pub mod s3qs;

pub use channel::{Receiver, ReceiverTransport, Sender, SenderTransport};
pub use error::TransportError;
pub use http::{HttpReceiver, HttpSender};
pub use probe::{ProbeReport, ThroughputProbe, DEFAULT_BUFFER_COUNT, DEFAULT_BUFFER_SIZE};
pub use s3qs::{S3qsReceiver, S3qsSender};
