//! Parallel column reduction
//!
//! Fans a list of CSV files out to a bounded [`WorkerPool`], parses one column
//! per file, and fans the partial sample sequences back in to a single
//! [`Aggregator`] that applies the selected [`Operation`].
//!
//! ```text
//! Dispatcher ──work queue──▶ WorkerPool ──results──▶ Aggregator ──▶ f64
//!                                 └──────completion──────┘
//! ```
//!
//! Results may arrive in any order; every operation is order-independent.
//! The first failed file ends the run and its error is returned.

pub mod aggregator;
pub mod cancel;
pub mod dispatcher;
pub mod pool;

pub use aggregator::Aggregator;
pub use cancel::CancellationSignal;
pub use dispatcher::Dispatcher;
pub use pool::{default_parallelism, PoolHandle, WorkerPool};

use crate::error::{Error, Result};
use crate::stats::Operation;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::info;

/// A single file in flight through the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Position of the file in the input list
    pub index: usize,
    pub path: PathBuf,
}

/// Result envelope produced for every input file
#[derive(Debug)]
pub enum FileOutcome {
    Parsed {
        index: usize,
        path: PathBuf,
        samples: Vec<f64>,
    },
    Failed {
        index: usize,
        path: PathBuf,
        error: Error,
    },
}

/// Check a caller-supplied 1-based column index.
pub fn validate_column(column: i64) -> Result<usize> {
    match usize::try_from(column) {
        Ok(column) if column >= 1 => Ok(column),
        _ => Err(Error::InvalidColumn { column }),
    }
}

/// Configured reduction of one column across many files
#[derive(Debug, Clone)]
pub struct ColumnReducer {
    operation: Operation,
    column: usize,
    pool: WorkerPool,
    cancel: CancellationSignal,
}

impl ColumnReducer {
    /// Reducer for the 1-based `column`, using a pool sized to the host.
    pub fn new(operation: Operation, column: i64) -> Result<Self> {
        Ok(Self::validated(operation, validate_column(column)?))
    }

    /// Validate raw arguments in the order the driver reports them: column
    /// first, then operation name.
    pub fn parse(operation: &str, column: i64) -> Result<Self> {
        let column = validate_column(column)?;
        let operation = operation.parse::<Operation>()?;
        Ok(Self::validated(operation, column))
    }

    fn validated(operation: Operation, column: usize) -> Self {
        Self {
            operation,
            column,
            pool: WorkerPool::default(),
            cancel: CancellationSignal::new(),
        }
    }

    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationSignal) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn pool(&self) -> WorkerPool {
        self.pool
    }

    /// Reduce the selected column over every file in `files`.
    ///
    /// # Errors
    ///
    /// [`Error::NoFiles`] for an empty list, otherwise the first per-file
    /// error observed, [`Error::EmptyDataset`] if no file had any data rows
    /// and the operation is not `sum`, or [`Error::Cancelled`].
    pub async fn run<P: AsRef<Path>>(&self, files: &[P]) -> Result<f64> {
        if files.is_empty() {
            return Err(Error::NoFiles);
        }

        let files: Vec<PathBuf> = files.iter().map(|p| p.as_ref().to_path_buf()).collect();
        let total = files.len();
        let pool = self.pool.capped_to(total);

        info!(
            "Reducing column {} of {} files with {} using {} workers",
            self.column,
            total,
            self.operation,
            pool.size()
        );

        let queue = Dispatcher::new(files).start(pool.size());
        let (results_tx, mut results_rx) = mpsc::channel(1);
        let mut handle = pool.spawn(queue, results_tx, self.column, self.cancel.clone());

        Aggregator::new(self.operation, total)
            .collect(&mut results_rx, handle.completion(), &self.cancel)
            .await
    }

    /// Run the reduction and write the result as one line to `out`.
    pub async fn run_to<P: AsRef<Path>, W: Write>(&self, files: &[P], out: &mut W) -> Result<()> {
        let value = self.run(files).await?;
        writeln!(out, "{value}")?;
        Ok(())
    }
}

/// Reduce `column` of every file with the named operation and write the
/// result to `out`.
///
/// Arguments are validated before any file is touched, in this order: the
/// file list, the column index, the operation name.
pub async fn reduce<P: AsRef<Path>, W: Write>(
    files: &[P],
    operation: &str,
    column: i64,
    out: &mut W,
) -> Result<()> {
    reduce_with(
        files,
        operation,
        column,
        WorkerPool::default(),
        CancellationSignal::new(),
        out,
    )
    .await
}

/// [`reduce`] with an explicit pool and cancellation signal.
pub async fn reduce_with<P: AsRef<Path>, W: Write>(
    files: &[P],
    operation: &str,
    column: i64,
    pool: WorkerPool,
    cancel: CancellationSignal,
    out: &mut W,
) -> Result<()> {
    if files.is_empty() {
        return Err(Error::NoFiles);
    }

    ColumnReducer::parse(operation, column)?
        .with_pool(pool)
        .with_cancellation(cancel)
        .run_to(files, out)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_column() {
        assert_eq!(validate_column(1).unwrap(), 1);
        assert_eq!(validate_column(42).unwrap(), 42);
        assert!(matches!(
            validate_column(0),
            Err(Error::InvalidColumn { column: 0 })
        ));
        assert!(matches!(
            validate_column(-3),
            Err(Error::InvalidColumn { column: -3 })
        ));
    }

    #[test]
    fn test_parse_checks_column_before_operation() {
        assert!(matches!(
            ColumnReducer::parse("median", 0),
            Err(Error::InvalidColumn { column: 0 })
        ));
        assert!(matches!(
            ColumnReducer::parse("median", 2),
            Err(Error::InvalidOperation { .. })
        ));

        let reducer = ColumnReducer::parse("max", 2).unwrap();
        assert_eq!(reducer.operation(), Operation::Max);
        assert_eq!(reducer.column(), 2);
    }

    #[tokio::test]
    async fn test_empty_file_list_checked_first() {
        let files: Vec<PathBuf> = vec![];
        let mut out = Vec::new();
        let err = reduce(&files, "median", 0, &mut out).await.unwrap_err();
        assert!(matches!(err, Error::NoFiles));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_run_writes_single_line() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(&a, "k,v\nx,1.5\ny,2.5\n").unwrap();
        fs::write(&b, "k,v\nz,4\n").unwrap();

        let mut out = Vec::new();
        ColumnReducer::new(Operation::Sum, 2)
            .unwrap()
            .with_pool(WorkerPool::new(2))
            .run_to(&[a, b], &mut out)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "8\n");
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.csv");
        fs::write(&a, "k,v\nx,1\n").unwrap();

        let cancel = CancellationSignal::new();
        cancel.cancel();

        let err = ColumnReducer::new(Operation::Sum, 2)
            .unwrap()
            .with_cancellation(cancel)
            .run(&[a])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
