//! Human-readable run summaries

use cvecurate_core::ScoredRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate view of a scoring stage
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub total: usize,
    pub training_ready: usize,
    pub hard_filtered: usize,
    pub avg_relevance: f64,
    pub avg_completeness: f64,
    pub avg_source_credibility: f64,
    pub avg_clarity: f64,
    pub avg_composite: f64,
}

impl ScoreSummary {
    /// Summarize scored records; `hard_filtered` is supplied by the caller
    pub fn from_records(records: &[ScoredRecord], hard_filtered: usize) -> Self {
        let total = records.len();
        if total == 0 {
            return Self {
                hard_filtered,
                ..Self::default()
            };
        }

        let mut sums = [0.0f64; 5];
        let mut training_ready = 0;
        for record in records {
            for (sum, value) in sums.iter_mut().zip(record.scores.as_array()) {
                *sum += value;
            }
            sums[4] += record.composite_score;
            if record.training_ready {
                training_ready += 1;
            }
        }
        let n = total as f64;

        Self {
            total,
            training_ready,
            hard_filtered,
            avg_relevance: sums[0] / n,
            avg_completeness: sums[1] / n,
            avg_source_credibility: sums[2] / n,
            avg_clarity: sums[3] / n,
            avg_composite: sums[4] / n,
        }
    }

    /// Training-ready share in percent
    pub fn training_ready_pct(&self) -> f64 {
        percent(self.training_ready, self.total)
    }
}

impl fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scoring summary")?;
        writeln!(f, "  {:<28}{:>10}", "Total records", self.total)?;
        writeln!(
            f,
            "  {:<28}{:>10}  ({:.1}%)",
            "Training ready",
            self.training_ready,
            self.training_ready_pct()
        )?;
        writeln!(f, "  {:<28}{:>10}", "Hard filtered", self.hard_filtered)?;
        writeln!(f, "  {:<28}{:>10.4}", "Avg relevance", self.avg_relevance)?;
        writeln!(f, "  {:<28}{:>10.4}", "Avg completeness", self.avg_completeness)?;
        writeln!(f, "  {:<28}{:>10.4}", "Avg source credibility", self.avg_source_credibility)?;
        writeln!(f, "  {:<28}{:>10.4}", "Avg clarity", self.avg_clarity)?;
        write!(f, "  {:<28}{:>10.4}", "Avg composite", self.avg_composite)
    }
}

/// Aggregate view of a filter stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSummary {
    pub total_input: usize,
    pub hard_filtered: usize,
    /// Training tier before sampling and decontamination
    pub training: usize,
    pub review: usize,
    pub rejected: usize,
    /// Demoted to rejected by a dimension floor
    pub excluded: usize,
    pub sampled: usize,
    pub training_final: usize,
    pub review_queue: usize,
    pub flagged_contamination: usize,
}

impl fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("Total input", self.total_input),
            ("Hard filtered", self.hard_filtered),
            ("Training tier", self.training),
            ("Review tier", self.review),
            ("Rejected tier", self.rejected),
            ("Excluded by floor", self.excluded),
            ("Sampled", self.sampled),
            ("Training final", self.training_final),
            ("Review queue", self.review_queue),
            ("Flagged contamination", self.flagged_contamination),
        ];

        write!(f, "Filter summary")?;
        for (label, count) in rows {
            write!(
                f,
                "\n  {:<28}{:>10}  ({:.1}%)",
                label,
                count,
                percent(count, self.total_input)
            )?;
        }
        Ok(())
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cvecurate_core::{DimensionScores, RawRecord, Source};

    fn scored(id: &str, composite: f64, training_ready: bool) -> ScoredRecord {
        ScoredRecord {
            record: RawRecord::new(id, "description", Source::Authoritative),
            scores: DimensionScores {
                relevance_score: 0.5,
                completeness_score: 1.0,
                source_credibility_score: 0.5,
                clarity_score: 0.0,
            },
            composite_score: composite,
            training_ready,
            pipeline_version: "v-test".to_string(),
            scored_at: Utc::now(),
        }
    }

    #[test]
    fn test_score_summary() {
        let records = vec![scored("a", 0.8, true), scored("b", 0.4, false)];
        let summary = ScoreSummary::from_records(&records, 1);

        assert_eq!(summary.total, 2);
        assert_eq!(summary.training_ready, 1);
        assert_eq!(summary.training_ready_pct(), 50.0);
        assert_eq!(summary.avg_relevance, 0.5);
        assert_eq!(summary.avg_completeness, 1.0);
        assert!((summary.avg_composite - 0.6).abs() < 1e-12);

        let table = summary.to_string();
        assert!(table.contains("Training ready"));
        assert!(table.contains("(50.0%)"));
    }

    #[test]
    fn test_empty_score_summary() {
        let summary = ScoreSummary::from_records(&[], 0);
        assert_eq!(summary, ScoreSummary::default());
        assert_eq!(summary.training_ready_pct(), 0.0);
    }

    #[test]
    fn test_filter_summary_display() {
        let summary = FilterSummary {
            total_input: 4,
            training: 2,
            training_final: 1,
            flagged_contamination: 1,
            ..FilterSummary::default()
        };
        let table = summary.to_string();
        assert!(table.starts_with("Filter summary"));
        assert!(table.contains("Training final"));
        assert!(table.contains("(25.0%)"));
    }
}
