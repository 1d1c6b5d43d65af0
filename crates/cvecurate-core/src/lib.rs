//! cvecurate core
//!
//! Core types, configuration, and utilities shared across the cvecurate
//! curation engine.
//!
//! This crate provides:
//! - Record types for raw, normalized, and scored vulnerability records
//! - Error types and result handling
//! - The validated curation configuration passed into every stage
//! - Lenient parsing of source records and the NVD feed adapter

pub mod config;
pub mod error;
pub mod ingest;
pub mod sources;
pub mod types;

pub use config::{
    AbsentDatePolicy, CurationConfig, DecontaminationConfig, DescriptionBounds,
    DimensionWeights, ExclusionConfig, SamplingConfig, Thresholds,
};
pub use error::{Error, Result};
pub use ingest::SourceRecord;
pub use sources::NvdFeedAdapter;
pub use types::{
    DimensionScores, Provenance, RawRecord, ScoredRecord, Severity, SeverityStratum, Source, Tier,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::CurationConfig;
    pub use crate::error::{Error, Result};
    pub use crate::ingest::SourceRecord;
    pub use crate::types::{
        DimensionScores, Provenance, RawRecord, ScoredRecord, Severity, SeverityStratum, Source,
        Tier,
    };
}
