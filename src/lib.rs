//! # colstats
//!
//! Compute a statistic over one column of many CSV files at once.
//!
//! ## Usage
//!
//! ```bash
//! colstats --op avg --col 3 access_log_1.csv access_log_2.csv
//! ```
//!
//! Files are parsed concurrently by a bounded worker pool and merged by a
//! single aggregator. The first bad file stops the run.
//!
//! ```no_run
//! # async fn example() -> colstats::Result<()> {
//! let files = ["testdata/example.csv", "testdata/example2.csv"];
//! let mut out = Vec::new();
//! colstats::reduce(&files, "avg", 3, &mut out).await?;
//! assert_eq!(String::from_utf8_lossy(&out), "233.84\n");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - `config` - User defaults from a TOML file and environment variables
//! - `error` - Error type shared by every stage
//! - `pipeline` - Dispatcher, worker pool and aggregator
//! - `stats` - CSV column parsing and reduction functions
pub mod config;
pub mod error;
pub mod pipeline;
pub mod stats;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{reduce, reduce_with, CancellationSignal, ColumnReducer, WorkerPool};
pub use stats::Operation;
