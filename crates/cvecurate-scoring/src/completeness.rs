//! Completeness dimension: how much of the record is populated

use cvecurate_core::{DescriptionBounds, RawRecord};

use crate::scorer::{clamp_unit, DimensionScorer};

const DESCRIPTION_CONTRIBUTION: f64 = 0.4;
const CVSS_CONTRIBUTION: f64 = 0.2;
const SEVERITY_CONTRIBUTION: f64 = 0.1;
const CATEGORY_CONTRIBUTION: f64 = 0.2;
const PUBLISHED_CONTRIBUTION: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default)]
pub struct CompletenessScorer {
    bounds: DescriptionBounds,
}

impl CompletenessScorer {
    pub fn new(bounds: DescriptionBounds) -> Self {
        Self { bounds }
    }
}

impl DimensionScorer for CompletenessScorer {
    fn score(&self, record: &RawRecord) -> f64 {
        let mut score = 0.0;

        if record.description.is_some() && self.bounds.contains(record.description_chars()) {
            score += DESCRIPTION_CONTRIBUTION;
        }
        if record.cvss_score.is_some() {
            score += CVSS_CONTRIBUTION;
        }
        if record.severity.is_some() {
            score += SEVERITY_CONTRIBUTION;
        }
        if !record.cwe_ids.is_empty() {
            score += CATEGORY_CONTRIBUTION;
        }
        if record.published.is_some() {
            score += PUBLISHED_CONTRIBUTION;
        }

        clamp_unit(score)
    }
}
