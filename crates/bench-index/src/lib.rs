//! Primary-index workload generator.
//!
//! [`IndexBenchmark`] drives an [`IndexService`] with `thread_count`
//! concurrent workers in two sequential phases:
//!
//! 1. **put**: every iteration allocates a row-id batch, builds one
//!    [`PrimaryIndexEntry`] per allocated row id and submits them in one call
//! 2. **delete**: the key counter is rewound and every iteration deletes the
//!    same keys the put phase minted
//!
//! Keys come from one shared [`KeyMinter`], so the set of keys a run
//! touches depends only on the number of keys minted, never on how the
//! workers interleave.
//!
//! # Example
//!
//! ```ignore
//! use bench_index::{IndexBenchConfig, IndexBenchmark, LocalIndexService};
//! use std::sync::Arc;
//!
//! let config = IndexBenchConfig::new(16, 100, 1000, 1, 1);
//! let benchmark = IndexBenchmark::new(Arc::new(LocalIndexService::new()), config)?;
//! let report = benchmark.run().await?;
//! println!("{}", report.summary());
//! ```

pub mod benchmark;
pub mod config;
pub mod counter;
pub mod error;
pub mod local;
pub mod service;
pub mod types;

pub use benchmark::IndexBenchmark;
pub use config::IndexBenchConfig;
pub use counter::{KeyMinter, TimestampClock, KEY_PREFIX};
pub use error::IndexServiceError;
pub use local::LocalIndexService;
pub use service::IndexService;
pub use types::{IndexKey, PrimaryIndexEntry, RowIdBatch, RowLocation};
