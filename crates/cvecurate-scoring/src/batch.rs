//! Parallel batch scoring
//!
//! Scoring is pure per record, so a batch is split into contiguous chunks that
//! are scored on scoped worker threads and concatenated back in input order.

use cvecurate_core::{Provenance, RawRecord, ScoredRecord};
use std::num::NonZeroUsize;
use std::thread;
use tracing::debug;

use crate::composite::CompositeScorer;

/// Below this many records per worker, threads cost more than they save
const MIN_CHUNK: usize = 256;

/// Scores a whole batch across worker threads
#[derive(Debug, Clone)]
pub struct BatchScorer {
    scorer: CompositeScorer,
    workers: NonZeroUsize,
}

impl BatchScorer {
    /// One worker per logical CPU
    pub fn new(scorer: CompositeScorer) -> Self {
        let workers = NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN);
        Self { scorer, workers }
    }

    pub fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = workers;
        self
    }

    pub fn scorer(&self) -> &CompositeScorer {
        &self.scorer
    }

    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Score every record; output order matches input order
    pub fn score_all(&self, records: &[RawRecord], provenance: &Provenance) -> Vec<ScoredRecord> {
        let workers = self
            .workers
            .get()
            .min(records.len().div_ceil(MIN_CHUNK))
            .max(1);

        if workers == 1 {
            return records
                .iter()
                .map(|record| self.scorer.score(record, provenance))
                .collect();
        }

        let chunk_size = records.len().div_ceil(workers);
        debug!(records = records.len(), workers, chunk_size, "Scoring batch in parallel");

        thread::scope(|scope| {
            let handles: Vec<_> = records
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|record| self.scorer.score(record, provenance))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            let mut scored = Vec::with_capacity(records.len());
            for handle in handles {
                match handle.join() {
                    Ok(chunk) => scored.extend(chunk),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            scored
        })
    }
}
