//! Bounded worker pool
//!
//! A fixed number of workers share one work queue. Each worker parses one
//! file at a time on the blocking thread pool and reports exactly one
//! [`FileOutcome`] per file. A supervisor task waits for every worker and then
//! raises the completion signal.

use super::{CancellationSignal, FileOutcome, WorkItem};
use crate::error::Error;
use crate::stats::parse_file;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error};

type WorkQueue = Arc<Mutex<mpsc::Receiver<WorkItem>>>;

/// Number of workers to run when none is configured
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}

/// Pool of concurrent file workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    size: usize,
}

impl WorkerPool {
    /// Create a pool with `size` workers; zero is treated as one.
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// The same pool, shrunk so no worker starts without a file to process.
    pub fn capped_to(&self, work_items: usize) -> Self {
        Self::new(self.size.min(work_items))
    }

    /// Start the workers.
    ///
    /// Workers pull from `queue` until it is closed and drained, the result
    /// channel is closed, or `cancel` is set. The returned handle carries the
    /// completion signal; dropping it aborts any workers still running.
    pub fn spawn(
        &self,
        queue: mpsc::Receiver<WorkItem>,
        results: mpsc::Sender<FileOutcome>,
        column: usize,
        cancel: CancellationSignal,
    ) -> PoolHandle {
        let queue: WorkQueue = Arc::new(Mutex::new(queue));
        let (done_tx, done_rx) = oneshot::channel();

        let mut workers = JoinSet::new();
        for id in 0..self.size {
            workers.spawn(run_worker(
                id,
                queue.clone(),
                results.clone(),
                column,
                cancel.clone(),
            ));
        }
        debug!("Started {} workers", self.size);

        let supervisor = tokio::spawn(async move {
            while let Some(joined) = workers.join_next().await {
                if let Err(e) = joined {
                    if e.is_panic() {
                        error!("Worker task panicked: {}", e);
                    }
                }
            }
            let _ = done_tx.send(());
        });

        PoolHandle {
            done: done_rx,
            supervisor,
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(default_parallelism())
    }
}

/// Handle to a running pool
pub struct PoolHandle {
    done: oneshot::Receiver<()>,
    supervisor: JoinHandle<()>,
}

impl PoolHandle {
    /// Fires once every worker has exited.
    pub fn completion(&mut self) -> &mut oneshot::Receiver<()> {
        &mut self.done
    }
}

impl Drop for PoolHandle {
    fn drop(&mut self) {
        // The supervisor owns the JoinSet, which aborts its workers when dropped.
        self.supervisor.abort();
    }
}

async fn run_worker(
    id: usize,
    queue: WorkQueue,
    results: mpsc::Sender<FileOutcome>,
    column: usize,
    cancel: CancellationSignal,
) {
    let mut processed = 0usize;

    loop {
        if cancel.is_cancelled() {
            debug!("Worker {} cancelled after {} files", id, processed);
            return;
        }

        let next = queue.lock().await.recv().await;
        let Some(item) = next else {
            break;
        };

        let outcome = process_item(item, column).await;
        processed += 1;

        if results.send(outcome).await.is_err() {
            debug!("Result channel closed, worker {} stopping", id);
            return;
        }
    }

    debug!("Worker {} drained the queue after {} files", id, processed);
}

async fn process_item(item: WorkItem, column: usize) -> FileOutcome {
    let WorkItem { index, path } = item;
    debug!("Processing file {}: {}", index, path.display());

    let task_path = path.clone();
    match tokio::task::spawn_blocking(move || parse_file(&task_path, column)).await {
        Ok(Ok(samples)) => FileOutcome::Parsed {
            index,
            path,
            samples,
        },
        Ok(Err(error)) => FileOutcome::Failed { index, path, error },
        Err(join_error) => FileOutcome::Failed {
            index,
            path,
            error: Error::WorkerPanicked(join_error.to_string()),
        },
    }
}
