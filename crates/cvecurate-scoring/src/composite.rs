//! Composite scorer: hard filter, four dimensions, weighted sum
//!
//! The composite is computed from the rounded dimension scores so that what a
//! reader sees in the output row is exactly what the composite was built from.

use cvecurate_core::{
    CurationConfig, DimensionScores, DimensionWeights, Provenance, RawRecord, Result, ScoredRecord,
};
use tracing::debug;

use crate::clarity::ClarityScorer;
use crate::completeness::CompletenessScorer;
use crate::credibility::CredibilityScorer;
use crate::hard_filter::{HardFilter, HardFilterOutcome};
use crate::relevance::RelevanceScorer;
use crate::scorer::{clamp_unit, round_to, DimensionScorer, DIMENSION_PRECISION};

/// Scores normalized records against a validated configuration
#[derive(Debug, Clone)]
pub struct CompositeScorer {
    hard_filter: HardFilter,
    relevance: RelevanceScorer,
    completeness: CompletenessScorer,
    credibility: CredibilityScorer,
    clarity: ClarityScorer,
    weights: DimensionWeights,
    training_threshold: f64,
    precision: u32,
}

impl CompositeScorer {
    /// Build a scorer; fails if the configuration is invalid
    pub fn from_config(config: &CurationConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            hard_filter: HardFilter::new(config.description),
            relevance: RelevanceScorer::new(&config.keywords)?,
            completeness: CompletenessScorer::new(config.description),
            credibility: CredibilityScorer,
            clarity: ClarityScorer::new(&config.placeholder_patterns)?,
            weights: config.weights,
            training_threshold: config.thresholds.training,
            precision: config.composite_precision,
        })
    }

    pub fn hard_filter(&self) -> &HardFilter {
        &self.hard_filter
    }

    pub fn training_threshold(&self) -> f64 {
        self.training_threshold
    }

    /// The dimension scorers in composite order
    fn scorers(&self) -> [&dyn DimensionScorer; 4] {
        [
            &self.relevance,
            &self.completeness,
            &self.credibility,
            &self.clarity,
        ]
    }

    /// Dimension scores for a record, or all zeros if it fails the hard filter
    pub fn dimensions(&self, record: &RawRecord) -> (DimensionScores, HardFilterOutcome) {
        let outcome = self.hard_filter.check(record);
        if !outcome.passed() {
            debug!(id = %record.id, reason = %outcome, "Record failed hard filter");
            return (DimensionScores::zero(), outcome);
        }

        let [relevance, completeness, credibility, clarity] = self
            .scorers()
            .map(|scorer| round_to(clamp_unit(scorer.score(record)), DIMENSION_PRECISION));

        let scores = DimensionScores {
            relevance_score: relevance,
            completeness_score: completeness,
            source_credibility_score: credibility,
            clarity_score: clarity,
        };
        (scores, outcome)
    }

    /// Weighted sum of dimension scores, clamped and rounded
    pub fn composite(&self, scores: &DimensionScores) -> f64 {
        let sum: f64 = self
            .weights
            .as_array()
            .iter()
            .zip(scores.as_array())
            .map(|(weight, score)| weight * score)
            .sum();
        round_to(clamp_unit(sum), self.precision)
    }

    /// Score one record
    pub fn score(&self, record: &RawRecord, provenance: &Provenance) -> ScoredRecord {
        let (scores, outcome) = self.dimensions(record);
        let composite_score = if outcome.passed() {
            self.composite(&scores)
        } else {
            0.0
        };

        ScoredRecord {
            record: record.clone(),
            scores,
            composite_score,
            training_ready: composite_score >= self.training_threshold,
            pipeline_version: provenance.pipeline_version.clone(),
            scored_at: provenance.scored_at,
        }
    }
}
