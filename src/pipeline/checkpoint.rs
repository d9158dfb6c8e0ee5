//! Row buffer with a modulo-based flush trigger.

use tracing::{error, info};

use crate::ledger::{Ledger, ResultRow};

/// Result of one flush attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlushOutcome {
    /// Nothing was buffered.
    Empty,
    /// The buffer was appended and cleared.
    Written(usize),
    /// The append failed; rows stay buffered for the next flush.
    Retained(usize),
}

/// Buffers result rows between checkpoints.
#[derive(Debug)]
pub(crate) struct CheckpointBuffer {
    interval: usize,
    rows: Vec<ResultRow>,
    checkpoints: usize,
}

impl CheckpointBuffer {
    /// `interval` must be non-zero; config validation guarantees it.
    pub(crate) fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            rows: Vec::with_capacity(interval.clamp(1, 1024)),
            checkpoints: 0,
        }
    }

    pub(crate) fn push(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    /// Whether `processed` lands on a checkpoint boundary.
    pub(crate) fn is_due(&self, processed: usize) -> bool {
        processed > 0 && processed % self.interval == 0
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    /// Appends every buffered row to `ledger`.
    pub(crate) fn flush(
        &mut self,
        ledger: &Ledger,
        processed: usize,
        total: usize,
    ) -> FlushOutcome {
        if self.rows.is_empty() {
            return FlushOutcome::Empty;
        }
        self.checkpoints += 1;
        match ledger.append(&self.rows) {
            Ok(written) => {
                self.rows.clear();
                info!(
                    checkpoint = self.checkpoints,
                    processed,
                    total,
                    rows = written,
                    "Checkpoint written"
                );
                FlushOutcome::Written(written)
            }
            Err(e) => {
                error!(
                    checkpoint = self.checkpoints,
                    processed,
                    total,
                    buffered = self.rows.len(),
                    error = %e,
                    "Checkpoint failed; rows kept for the next flush"
                );
                FlushOutcome::Retained(self.rows.len())
            }
        }
    }
}
