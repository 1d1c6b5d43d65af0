//! cvecurate filter
//!
//! Turns source records into curated output streams.
//!
//! Stages, in order:
//! - Normalization: canonical fields, one record per id by source authority
//! - Tiering: composite score bands (training, review, rejected)
//! - Stratified sampling: per-severity quotas over the training tier
//! - Decontamination: quarantine of records published after the cutoff
//!
//! [`CurationEngine`] runs them against a validated configuration, with
//! scoring from `cvecurate-scoring` in between.

pub mod decontam;
pub mod engine;
pub mod normalize;
pub mod record;
pub mod sampler;
pub mod tier;

pub use decontam::Decontaminator;
pub use engine::{CurationEngine, CurationStreams, FilterStageOutput, RunOutput, ScoreStageOutput};
pub use normalize::{NormalizeOutcome, Normalizer};
pub use record::FilteredRecord;
pub use sampler::{SampleOutcome, StratifiedSampler, StratumCount};
pub use tier::{TierDecision, TieredClassifier};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::engine::{CurationEngine, CurationStreams, RunOutput};
    pub use crate::normalize::{NormalizeOutcome, Normalizer};
    pub use crate::record::FilteredRecord;
}
