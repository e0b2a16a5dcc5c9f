//! Chunked transactional flushes.
//!
//! The committer counts processed samples and flushes the pending lists every
//! `chunk_size` samples, then once more for any remainder at the end of the
//! cycle. A sample's actions always land in a single flush. The lists are
//! cleared only after the persistence layer accepts them.

use tracing::debug;

use crate::errors::Result;
use crate::tracker::PendingChanges;
use crate::traits::ResidencyPersistence;

/// What one flush wrote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Samples whose actions this flush covers.
    pub samples: usize,
    /// Residencies opened.
    pub inserted: usize,
    /// Residencies rewritten, closed ones included.
    pub updated: usize,
    /// Updates that set `ts_out`.
    pub closed: usize,
}

/// Accumulates tracker output and flushes it in chunks.
pub struct BatchCommitter<'p, P: ?Sized> {
    persistence: &'p P,
    chunk_size: usize,
    pending: PendingChanges,
    samples_in_chunk: usize,
}

impl<'p, P: ResidencyPersistence + ?Sized> BatchCommitter<'p, P> {
    /// Create a committer. A `chunk_size` of zero is treated as one.
    pub fn new(persistence: &'p P, chunk_size: usize) -> Self {
        Self {
            persistence,
            chunk_size: chunk_size.max(1),
            pending: PendingChanges::default(),
            samples_in_chunk: 0,
        }
    }

    /// Pending lists for the tracker to append to.
    pub fn pending_mut(&mut self) -> &mut PendingChanges {
        &mut self.pending
    }

    /// Pending lists, read-only.
    pub fn pending(&self) -> &PendingChanges {
        &self.pending
    }

    /// Mark one sample as fully processed; flush if the chunk is full.
    pub fn sample_processed(&mut self) -> Result<Option<FlushReport>> {
        self.samples_in_chunk += 1;
        if self.samples_in_chunk >= self.chunk_size {
            return self.flush().map(Some);
        }
        Ok(None)
    }

    /// Flush the remainder, if any samples are unflushed.
    pub fn finish(mut self) -> Result<Option<FlushReport>> {
        if self.samples_in_chunk == 0 {
            return Ok(None);
        }
        self.flush().map(Some)
    }

    fn flush(&mut self) -> Result<FlushReport> {
        let report = FlushReport {
            samples: self.samples_in_chunk,
            inserted: self.pending.inserts.len(),
            updated: self.pending.updates.len(),
            closed: self.pending.closed(),
        };
        if !self.pending.is_empty() {
            self.persistence
                .commit(&self.pending.inserts, &self.pending.updates)?;
        }
        self.pending.clear();
        self.samples_in_chunk = 0;
        debug!(
            samples = report.samples,
            inserted = report.inserted,
            updated = report.updated,
            closed = report.closed,
            "flush committed"
        );
        Ok(report)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
