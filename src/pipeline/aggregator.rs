//! Fan-in of per-file results
//!
//! The aggregator is the only owner of the combined sample sequence. It waits
//! on three events at once: a result envelope, external cancellation, and the
//! pool's completion signal. The first failed envelope ends the run.

use super::{CancellationSignal, FileOutcome};
use crate::error::{Error, Result};
use crate::stats::Operation;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

pub struct Aggregator {
    operation: Operation,
    expected: usize,
    received: usize,
    samples: Vec<f64>,
}

impl Aggregator {
    /// Aggregator expecting one envelope for each of `expected` files
    pub fn new(operation: Operation, expected: usize) -> Self {
        Self {
            operation,
            expected,
            received: 0,
            samples: Vec::new(),
        }
    }

    /// Collect envelopes until completion, cancellation or the first error.
    ///
    /// Envelopes are polled first so that results already buffered when the
    /// pool finishes are never lost, and cancellation is checked before
    /// completion so a cancelled run never reduces a partial dataset.
    pub async fn collect(
        mut self,
        results: &mut mpsc::Receiver<FileOutcome>,
        done: &mut oneshot::Receiver<()>,
        cancel: &CancellationSignal,
    ) -> Result<f64> {
        loop {
            tokio::select! {
                biased;

                Some(outcome) = results.recv() => self.absorb(outcome)?,

                _ = cancel.cancelled() => {
                    warn!("Cancelled after {}/{} files", self.received, self.expected);
                    return Err(Error::Cancelled);
                }

                _ = &mut *done => {
                    while let Ok(outcome) = results.try_recv() {
                        self.absorb(outcome)?;
                    }
                    if cancel.is_cancelled() {
                        return Err(Error::Cancelled);
                    }
                    return self.finish();
                }
            }
        }
    }

    /// Merge one envelope, or surface its error.
    pub fn absorb(&mut self, outcome: FileOutcome) -> Result<()> {
        self.received += 1;

        match outcome {
            FileOutcome::Parsed {
                index,
                path,
                samples,
            } => {
                debug!(
                    "Merged {} samples from file {} ({}), {}/{} files",
                    samples.len(),
                    index,
                    path.display(),
                    self.received,
                    self.expected
                );
                self.samples.extend(samples);
                Ok(())
            }
            FileOutcome::Failed { index, path, error } => {
                warn!("File {} ({}) failed: {}", index, path.display(), error);
                Err(error)
            }
        }
    }

    /// Reduce everything merged so far.
    pub fn finish(self) -> Result<f64> {
        if self.received < self.expected {
            return Err(Error::Incomplete {
                received: self.received,
                expected: self.expected,
            });
        }

        let value = self.operation.apply(&self.samples)?;
        info!(
            "{} of {} samples from {} files = {}",
            self.operation,
            self.samples.len(),
            self.received,
            value
        );
        Ok(value)
    }
}
