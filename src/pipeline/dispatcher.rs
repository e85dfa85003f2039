//! Work dispatch for the worker pool
//!
//! Feeds every input path into a bounded queue from a background task. The
//! queue closes once the last path is sent, which is how workers learn that
//! there is no more work.

use super::WorkItem;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::debug;

/// Emits each input file exactly once, in input order
pub struct Dispatcher {
    files: Vec<PathBuf>,
}

impl Dispatcher {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Start feeding the queue and return its receiving end.
    ///
    /// The queue holds at most `capacity` pending items, so the dispatcher
    /// never runs far ahead of the workers. It stops early if the receiver
    /// is dropped.
    pub fn start(self, capacity: usize) -> mpsc::Receiver<WorkItem> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let total = self.files.len();

        tokio::spawn(async move {
            for (index, path) in self.files.into_iter().enumerate() {
                if tx.send(WorkItem { index, path }).await.is_err() {
                    debug!("Work queue closed after {}/{} files", index, total);
                    return;
                }
            }
            debug!("Dispatched all {} files", total);
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatches_every_file_once_in_order() {
        let files: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("{i}.csv"))).collect();
        let dispatcher = Dispatcher::new(files.clone());
        assert_eq!(dispatcher.len(), 5);

        let mut rx = dispatcher.start(2);
        let mut received = Vec::new();
        while let Some(item) = rx.recv().await {
            received.push(item);
        }

        assert_eq!(received.len(), 5);
        for (i, item) in received.iter().enumerate() {
            assert_eq!(item.index, i);
            assert_eq!(item.path, files[i]);
        }
    }

    #[tokio::test]
    async fn test_queue_closes_for_empty_input() {
        let dispatcher = Dispatcher::new(vec![]);
        assert!(dispatcher.is_empty());
        let mut rx = dispatcher.start(0);
        assert!(rx.recv().await.is_none());
    }
}
