//! Relevance dimension: how security-relevant a record is

use cvecurate_core::{RawRecord, Result, Severity};

use crate::patterns::KeywordMatcher;
use crate::scorer::{clamp_unit, DimensionScorer};

const SEVERE_CONTRIBUTION: f64 = 0.4;
const MEDIUM_CONTRIBUTION: f64 = 0.2;
const CATEGORY_CONTRIBUTION: f64 = 0.3;
const KEYWORD_CONTRIBUTION: f64 = 0.1;
const KEYWORD_CAP: usize = 3;

/// Scores severity tier, category presence, and keyword density
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    keywords: KeywordMatcher,
}

impl RelevanceScorer {
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            keywords: KeywordMatcher::new(keywords)?,
        })
    }
}

impl DimensionScorer for RelevanceScorer {
    fn score(&self, record: &RawRecord) -> f64 {
        let mut score = match record.severity {
            Some(Severity::High | Severity::Critical) => SEVERE_CONTRIBUTION,
            Some(Severity::Medium) => MEDIUM_CONTRIBUTION,
            Some(Severity::Low) | None => 0.0,
        };

        if !record.cwe_ids.is_empty() {
            score += CATEGORY_CONTRIBUTION;
        }

        if let Some(description) = record.description.as_deref() {
            let hits = self.keywords.distinct_matches(description).min(KEYWORD_CAP);
            score += hits as f64 * KEYWORD_CONTRIBUTION;
        }

        clamp_unit(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::round_to;
    use cvecurate_core::{CurationConfig, Source};

    fn scorer() -> RelevanceScorer {
        RelevanceScorer::new(&CurationConfig::default().keywords).unwrap()
    }

    fn score(record: &RawRecord) -> f64 {
        round_to(scorer().score(record), 4)
    }

    #[test]
    fn test_zero_for_bare_record() {
        let record = RawRecord::new("CVE-1", "A plain note about a product release.", Source::Authoritative);
        assert_eq!(score(&record), 0.0);
    }

    #[test]
    fn test_severity_contributions() {
        let base = RawRecord::new("CVE-1", "A plain note about a product release.", Source::Authoritative);
        assert_eq!(score(&base.clone().with_severity(Severity::Critical)), 0.4);
        assert_eq!(score(&base.clone().with_severity(Severity::High)), 0.4);
        assert_eq!(score(&base.clone().with_severity(Severity::Medium)), 0.2);
        assert_eq!(score(&base.with_severity(Severity::Low)), 0.0);
    }

    #[test]
    fn test_category_and_keywords() {
        let record = RawRecord::new(
            "CVE-1",
            "A medium-severity issue that allows bypass of authentication in affected systems.",
            Source::Authoritative,
        )
        .with_severity(Severity::Medium);
        // MEDIUM + "bypass" + "authentication"
        assert_eq!(score(&record), 0.4);
        // plus a category
        assert_eq!(score(&record.with_cwe("CWE-287")), 0.7);
    }

    #[test]
    fn test_keyword_bonus_capped() {
        let record = RawRecord::new(
            "CVE-1",
            "An exploit for a buffer overflow vulnerability enables privilege escalation via injection.",
            Source::Authoritative,
        );
        assert_eq!(score(&record), 0.3);
    }

    #[test]
    fn test_capped_at_one() {
        let record = RawRecord::new(
            "CVE-1",
            "An exploit for a buffer overflow vulnerability enables privilege escalation via injection.",
            Source::Authoritative,
        )
        .with_severity(Severity::Critical)
        .with_cwe("CWE-787");
        assert_eq!(score(&record), 1.0);
    }
}
