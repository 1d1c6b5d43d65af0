//! Per-stage record counters

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Name of the facade counter every stage increments
pub const RECORDS_TOTAL: &str = "cvecurate_records_total";

/// A counted point in the curation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Ingested,
    DuplicateResolved,
    Unkeyed,
    HardFiltered,
    Scored,
    Training,
    Review,
    Rejected,
    Sampled,
    Quarantined,
}

impl Stage {
    pub const ALL: [Stage; 10] = [
        Stage::Ingested,
        Stage::DuplicateResolved,
        Stage::Unkeyed,
        Stage::HardFiltered,
        Stage::Scored,
        Stage::Training,
        Stage::Review,
        Stage::Rejected,
        Stage::Sampled,
        Stage::Quarantined,
    ];

    /// Label value used on the facade counter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingested => "ingested",
            Self::DuplicateResolved => "duplicate_resolved",
            Self::Unkeyed => "unkeyed",
            Self::HardFiltered => "hard_filtered",
            Self::Scored => "scored",
            Self::Training => "training",
            Self::Review => "review",
            Self::Rejected => "rejected",
            Self::Sampled => "sampled",
            Self::Quarantined => "quarantined",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Register descriptions with whatever recorder is installed
pub fn describe_metrics() {
    metrics::describe_counter!(
        RECORDS_TOTAL,
        "Records passing through each curation stage"
    );
}

/// Shared stage counters
///
/// Cloning is cheap and every clone updates the same counters. Each update
/// is mirrored to the `metrics` facade so an installed exporter sees it too.
#[derive(Clone, Default)]
pub struct StageMetrics {
    inner: Arc<StageCounters>,
}

#[derive(Default)]
struct StageCounters {
    ingested: AtomicU64,
    duplicates_resolved: AtomicU64,
    unkeyed: AtomicU64,
    hard_filtered: AtomicU64,
    scored: AtomicU64,
    training: AtomicU64,
    review: AtomicU64,
    rejected: AtomicU64,
    sampled: AtomicU64,
    quarantined: AtomicU64,
}

impl StageCounters {
    fn counter(&self, stage: Stage) -> &AtomicU64 {
        match stage {
            Stage::Ingested => &self.ingested,
            Stage::DuplicateResolved => &self.duplicates_resolved,
            Stage::Unkeyed => &self.unkeyed,
            Stage::HardFiltered => &self.hard_filtered,
            Stage::Scored => &self.scored,
            Stage::Training => &self.training,
            Stage::Review => &self.review,
            Stage::Rejected => &self.rejected,
            Stage::Sampled => &self.sampled,
            Stage::Quarantined => &self.quarantined,
        }
    }
}

impl StageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` records to a stage
    pub fn record(&self, stage: Stage, count: u64) {
        if count == 0 {
            return;
        }
        self.inner.counter(stage).fetch_add(count, Ordering::Relaxed);
        metrics::counter!(RECORDS_TOTAL, "stage" => stage.as_str()).increment(count);
    }

    pub fn record_ingested(&self, count: usize) {
        self.record(Stage::Ingested, count as u64);
    }

    pub fn record_duplicates_resolved(&self, count: usize) {
        self.record(Stage::DuplicateResolved, count as u64);
    }

    pub fn record_unkeyed(&self, count: usize) {
        self.record(Stage::Unkeyed, count as u64);
    }

    pub fn record_hard_filtered(&self, count: usize) {
        self.record(Stage::HardFiltered, count as u64);
    }

    pub fn record_scored(&self, count: usize) {
        self.record(Stage::Scored, count as u64);
    }

    pub fn record_training(&self, count: usize) {
        self.record(Stage::Training, count as u64);
    }

    pub fn record_review(&self, count: usize) {
        self.record(Stage::Review, count as u64);
    }

    pub fn record_rejected(&self, count: usize) {
        self.record(Stage::Rejected, count as u64);
    }

    pub fn record_sampled(&self, count: usize) {
        self.record(Stage::Sampled, count as u64);
    }

    pub fn record_quarantined(&self, count: usize) {
        self.record(Stage::Quarantined, count as u64);
    }

    /// Current value of one counter
    pub fn get(&self, stage: Stage) -> u64 {
        self.inner.counter(stage).load(Ordering::Relaxed)
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ingested: self.get(Stage::Ingested),
            duplicates_resolved: self.get(Stage::DuplicateResolved),
            unkeyed: self.get(Stage::Unkeyed),
            hard_filtered: self.get(Stage::HardFiltered),
            scored: self.get(Stage::Scored),
            training: self.get(Stage::Training),
            review: self.get(Stage::Review),
            rejected: self.get(Stage::Rejected),
            sampled: self.get(Stage::Sampled),
            quarantined: self.get(Stage::Quarantined),
        }
    }
}

impl fmt::Debug for StageMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StageMetrics").field(&self.snapshot()).finish()
    }
}

/// Snapshot of the stage counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub ingested: u64,
    pub duplicates_resolved: u64,
    pub unkeyed: u64,
    pub hard_filtered: u64,
    pub scored: u64,
    pub training: u64,
    pub review: u64,
    pub rejected: u64,
    pub sampled: u64,
    pub quarantined: u64,
}

impl MetricsSnapshot {
    /// Share of scored records that reached the training tier
    pub fn training_rate(&self) -> f64 {
        ratio(self.training, self.scored)
    }

    /// Share of scored records routed to quarantine
    pub fn quarantine_rate(&self) -> f64 {
        ratio(self.quarantined, self.scored)
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
