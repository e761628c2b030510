//! Benchmark entry points behind the CLI subcommands.
//!
//! Each handler runs one benchmark to completion and returns its report;
//! printing is left to the caller.

pub mod index;
pub mod trans;
pub mod transport;

pub use index::{run_index, run_index_with};
pub use trans::{run_trans, run_trans_with};
pub use transport::{run_receiver, run_sender};
