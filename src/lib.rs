//! ccb-bench library
//!
//! Throughput benchmarks for three kinds of cloud building blocks:
//!
//! - Data transports: a sender pushes fixed-size buffers to a receiver over
//!   HTTP or over S3 + SQS, and both sides report latency and rate
//! - Index services: concurrent workers allocate row ids, put primary-index
//!   entries, then delete them again
//! - Transaction services: concurrent workers begin and commit transactions
//!   in batches
//!
//! # CLI Usage
//!
//! ```bash
//! # Receive 12800 buffers of 8 MiB over HTTP, then send them from another host
//! ccb-bench receiver http 0.0.0.0 8080
//! ccb-bench sender http 10.0.0.2 8080
//!
//! # Same over S3 + SQS
//! ccb-bench receiver sqs https://sqs.us-east-2.amazonaws.com/123456789012/ccb
//! ccb-bench sender sqs s3://ccb-bench/buffers/ https://sqs.us-east-2.amazonaws.com/123456789012/ccb
//!
//! # 16 workers x 100 batches x 1000 rows against table 1, index 1
//! ccb-bench index 16 100 1000 1 1
//!
//! # 128 workers x 100 rounds x 100 transactions
//! ccb-bench trans
//! ```

use anyhow::Context;
use bench_framework::parse_duration;
use bench_index::IndexBenchConfig;
use bench_trans::TransBenchConfig;
use bench_transport::{ThroughputProbe, DEFAULT_BUFFER_COUNT, DEFAULT_BUFFER_SIZE};
use clap::Parser;

pub mod bench;

/// Help text of the `index` subcommand.
pub const LOCAL_INDEX_NOTE: &str = "Put primary-index entries from concurrent workers, then delete them. \
     Runs against an in-process index service, not a remote endpoint.";

/// Help text of the `trans` subcommand.
pub const LOCAL_TRANS_NOTE: &str = "Begin and commit transaction batches from concurrent workers. \
     Runs against an in-process transaction service, not a remote endpoint.";

/// Buffer shape shared by the sender and receiver of a transport benchmark.
///
/// Both sides of a channel must agree on these.
#[derive(Parser, Clone, Debug)]
pub struct ProbeOpts {
    /// Size of every buffer in bytes
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE, env = "CCB_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Number of timed transfers (one extra warm-up transfer is not timed)
    #[arg(long, default_value_t = DEFAULT_BUFFER_COUNT, env = "CCB_BUFFER_COUNT")]
    pub buffer_count: u64,
}

impl ProbeOpts {
    pub fn probe(&self) -> anyhow::Result<ThroughputProbe> {
        if self.buffer_size == 0 {
            anyhow::bail!("--buffer-size must be positive");
        }
        Ok(ThroughputProbe::new(self.buffer_size, self.buffer_count))
    }
}

/// Arguments of the index benchmark.
#[derive(Parser, Clone, Debug)]
#[command(about = LOCAL_INDEX_NOTE)]
pub struct IndexArgs {
    /// Number of concurrent workers
    pub thread_num: usize,

    /// Batches per worker
    pub batch_num: u32,

    /// Row ids per batch
    pub batch_size: u32,

    /// Table to allocate row ids for
    pub table_id: u64,

    /// Primary index of the table
    pub index_id: u64,

    /// Maximum time to wait for the workers of one phase
    /// Format: duration in seconds or with units like "30m", "10h"
    #[arg(long, default_value = "10h")]
    pub join_timeout: String,
}

impl IndexArgs {
    pub fn to_config(&self) -> anyhow::Result<IndexBenchConfig> {
        let join_timeout = parse_duration(&self.join_timeout)
            .with_context(|| format!("Invalid --join-timeout: {}", self.join_timeout))?;
        Ok(IndexBenchConfig::new(
            self.thread_num,
            self.batch_num,
            self.batch_size,
            self.table_id,
            self.index_id,
        )
        .with_join_timeout(join_timeout))
    }
}

/// Arguments of the transaction benchmark.
#[derive(Parser, Clone, Debug)]
#[command(about = LOCAL_TRANS_NOTE)]
pub struct TransArgs {
    /// Number of concurrent workers
    #[arg(long, default_value_t = bench_trans::config::DEFAULT_WORKER_COUNT)]
    pub workers: usize,

    /// Begin/commit rounds per worker
    #[arg(long, default_value_t = bench_trans::config::DEFAULT_ITERATIONS)]
    pub iterations: u32,

    /// Transactions per begin and commit call
    #[arg(long, default_value_t = bench_trans::config::DEFAULT_BATCH_SIZE)]
    pub batch_size: u32,

    /// Begin read-only transactions
    #[arg(long)]
    pub read_only: bool,

    /// Maximum time to wait for the workers
    /// Format: duration in seconds or with units like "30m", "10h"
    #[arg(long, default_value = "10h")]
    pub join_timeout: String,
}

impl TransArgs {
    pub fn to_config(&self) -> anyhow::Result<TransBenchConfig> {
        let join_timeout = parse_duration(&self.join_timeout)
            .with_context(|| format!("Invalid --join-timeout: {}", self.join_timeout))?;
        Ok(
            TransBenchConfig::new(self.workers, self.iterations, self.batch_size)
                .with_read_only(self.read_only)
                .with_join_timeout(join_timeout),
        )
    }
}
