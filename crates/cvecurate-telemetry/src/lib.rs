//! cvecurate telemetry
//!
//! Run accounting for the curation engine.
//!
//! Provides:
//! - Atomic per-stage record counters mirrored to the `metrics` facade
//! - Score and filter summaries printed at the end of a stage
//! - A hash-chained run ledger for reproducibility checks

pub mod ledger;
pub mod metrics;
pub mod summary;

pub use ledger::{LedgerEntry, RunLedger};
pub use metrics::{MetricsSnapshot, Stage, StageMetrics};
pub use summary::{FilterSummary, ScoreSummary};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ledger::RunLedger;
    pub use crate::metrics::StageMetrics;
    pub use crate::summary::{FilterSummary, ScoreSummary};
}
