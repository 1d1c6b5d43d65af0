//! Source credibility dimension

use cvecurate_core::{RawRecord, Source};

use crate::scorer::{clamp_unit, DimensionScorer};

/// Bonus for carrying a formal severity assessment
const CVSS_BOOST: f64 = 0.1;

/// Scores a record by the authority of its provenance
#[derive(Debug, Clone, Copy, Default)]
pub struct CredibilityScorer;

impl CredibilityScorer {
    /// Base credibility of a provenance class
    pub fn base(source: Source) -> f64 {
        match source {
            Source::Authoritative => 1.0,
            Source::Secondary => 0.6,
            Source::Unknown => 0.3,
        }
    }
}

impl DimensionScorer for CredibilityScorer {
    fn score(&self, record: &RawRecord) -> f64 {
        let boost = if record.cvss_score.is_some() { CVSS_BOOST } else { 0.0 };
        clamp_unit(Self::base(record.source) + boost)
    }
}
