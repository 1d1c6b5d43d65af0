//! Composite-score tiering

use cvecurate_core::{ExclusionConfig, ScoredRecord, Thresholds, Tier};

/// Tier assigned to a record and, if a floor demoted it, why
#[derive(Debug, Clone, PartialEq)]
pub struct TierDecision {
    pub tier: Tier,
    pub exclusion_reason: Option<String>,
}

/// Maps composite scores to tiers using `review <= training` bands
///
/// Optional dimension floors can demote a training or review record to
/// rejected; they never promote a record.
#[derive(Debug, Clone, Copy)]
pub struct TieredClassifier {
    thresholds: Thresholds,
    exclusions: ExclusionConfig,
}

impl TieredClassifier {
    pub fn new(thresholds: Thresholds, exclusions: ExclusionConfig) -> Self {
        Self {
            thresholds,
            exclusions,
        }
    }

    /// Band for a composite score alone
    pub fn tier_for(&self, composite_score: f64) -> Tier {
        if composite_score >= self.thresholds.training {
            Tier::Training
        } else if composite_score >= self.thresholds.review {
            Tier::Review
        } else {
            Tier::Rejected
        }
    }

    pub fn classify(&self, record: &ScoredRecord) -> TierDecision {
        let tier = self.tier_for(record.composite_score);
        if tier == Tier::Rejected {
            return TierDecision {
                tier,
                exclusion_reason: None,
            };
        }

        match self.floor_violation(record) {
            Some(reason) => TierDecision {
                tier: Tier::Rejected,
                exclusion_reason: Some(reason),
            },
            None => TierDecision {
                tier,
                exclusion_reason: None,
            },
        }
    }

    fn floor_violation(&self, record: &ScoredRecord) -> Option<String> {
        let floors = [
            (
                "clarity_score",
                self.exclusions.min_clarity,
                record.scores.clarity_score,
            ),
            (
                "source_credibility_score",
                self.exclusions.min_source_credibility,
                record.scores.source_credibility_score,
            ),
        ];

        floors.into_iter().find_map(|(name, floor, value)| {
            let floor = floor?;
            (value < floor).then(|| format!("{} {} below floor {}", name, value, floor))
        })
    }
}
