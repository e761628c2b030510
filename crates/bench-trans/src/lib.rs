//! Transaction batch generator.
//!
//! [`TransBenchmark`] runs `worker_count` concurrent workers against one
//! shared [`TransService`]. Every iteration begins a batch of transactions
//! and commits the whole batch in one call; begin and commit latencies are
//! accumulated separately per worker.
//!
//! # Example
//!
//! ```ignore
//! use bench_trans::{LocalTransService, TransBenchConfig, TransBenchmark};
//! use std::sync::Arc;
//!
//! let benchmark = TransBenchmark::new(Arc::new(LocalTransService::new()), TransBenchConfig::default())?;
//! let report = benchmark.run().await?;
//! println!("{}", report.summary());
//! ```

pub mod benchmark;
pub mod config;
pub mod error;
pub mod local;
pub mod service;
pub mod types;

pub use benchmark::{TransBenchmark, TransReport, TransWorkerMetrics};
pub use config::TransBenchConfig;
pub use error::TransServiceError;
pub use local::LocalTransService;
pub use service::TransService;
pub use types::TransContext;
