//! Rows of the curated output streams

use cvecurate_core::{ScoredRecord, Tier};
use cvecurate_telemetry::ledger::scored_line;
use serde::{Deserialize, Serialize};

/// A scored record annotated with its filtering outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredRecord {
    #[serde(flatten)]
    pub scored: ScoredRecord,

    pub tier: Tier,

    /// Selected by the stratified sampler
    #[serde(default, skip_serializing_if = "is_false")]
    pub sampled: bool,

    /// Published after the knowledge cutoff
    #[serde(default, skip_serializing_if = "is_false")]
    pub contamination_flag: bool,

    /// Dimension floor that demoted the record to rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusion_reason: Option<String>,
}

impl FilteredRecord {
    pub fn new(scored: ScoredRecord, tier: Tier) -> Self {
        Self {
            scored,
            tier,
            sampled: false,
            contamination_flag: false,
            exclusion_reason: None,
        }
    }

    pub fn id(&self) -> &str {
        self.scored.id()
    }

    /// Canonical ledger line: scores plus filtering outcome
    pub fn ledger_line(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            scored_line(&self.scored),
            self.tier,
            self.sampled,
            self.contamination_flag
        )
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use cvecurate_core::{DimensionScores, RawRecord, Severity, Source};
    use serde_json::Value;

    fn scored() -> ScoredRecord {
        ScoredRecord {
            record: RawRecord::new("CVE-2024-1234", "A heap overflow in the image decoder.", Source::Authoritative)
                .with_severity(Severity::High)
                .with_cwe("CWE-122"),
            scores: DimensionScores {
                relevance_score: 0.8,
                completeness_score: 0.7,
                source_credibility_score: 1.0,
                clarity_score: 0.7,
            },
            composite_score: 0.81,
            training_ready: true,
            pipeline_version: "v0.1.0".to_string(),
            scored_at: Utc.with_ymd_and_hms(2024, 9, 1, 8, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_flat_output_shape() {
        let mut row = FilteredRecord::new(scored(), Tier::Training);
        row.contamination_flag = true;

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["cve_id"], "CVE-2024-1234");
        assert_eq!(value["severity"], "HIGH");
        assert_eq!(value["composite_score"], 0.81);
        assert_eq!(value["tier"], "training");
        assert_eq!(value["contamination_flag"], true);
        assert_eq!(value.get("sampled"), None);
        assert_eq!(value.get("exclusion_reason"), None);
        assert!(matches!(value.get("record"), None));
        assert!(matches!(value["cwe_ids"], Value::Array(_)));
    }

    #[test]
    fn test_reads_back() {
        let mut row = FilteredRecord::new(scored(), Tier::Rejected);
        row.exclusion_reason = Some("clarity_score 0.7 below floor 0.8".to_string());

        let line = serde_json::to_string(&row).unwrap();
        let parsed: FilteredRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, row);
    }

    #[test]
    fn test_ledger_line_ignores_timestamp() {
        let a = FilteredRecord::new(scored(), Tier::Training);
        let mut b = a.clone();
        b.scored.scored_at = Utc::now();
        assert_eq!(a.ledger_line(), b.ledger_line());
    }
}
