//! cvecurate scoring
//!
//! Quality scoring for normalized vulnerability records.
//!
//! Every record passes a hard filter on its description, then four
//! independent dimension scorers:
//! - Relevance: severity tier, weakness category, security keywords
//! - Completeness: which metadata fields are populated
//! - Source credibility: authority of the provenance class
//! - Clarity: description length band, penalized for placeholder text
//!
//! The [`CompositeScorer`] combines them into one weighted, rounded score.
//! Scoring is pure: the same record and configuration always produce the same
//! scores, so batches are scored in parallel by [`BatchScorer`].

pub mod batch;
pub mod clarity;
pub mod completeness;
pub mod composite;
pub mod credibility;
pub mod hard_filter;
pub mod patterns;
pub mod placeholder;
pub mod relevance;
pub mod scorer;

pub use batch::BatchScorer;
pub use clarity::ClarityScorer;
pub use completeness::CompletenessScorer;
pub use composite::CompositeScorer;
pub use credibility::CredibilityScorer;
pub use hard_filter::{HardFilter, HardFilterOutcome};
pub use patterns::KeywordMatcher;
pub use placeholder::PlaceholderDetector;
pub use relevance::RelevanceScorer;
pub use scorer::DimensionScorer;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::batch::BatchScorer;
    pub use crate::composite::CompositeScorer;
    pub use crate::hard_filter::{HardFilter, HardFilterOutcome};
    pub use crate::scorer::DimensionScorer;
}
