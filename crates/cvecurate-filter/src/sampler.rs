//! Severity-stratified quota sampling

use cvecurate_core::{SamplingConfig, ScoredRecord, SeverityStratum};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// How many records a stratum offered and how many it kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StratumCount {
    pub eligible: usize,
    pub selected: usize,
    pub quota: usize,
}

/// Records selected by the sampler
#[derive(Debug, Clone, Default)]
pub struct SampleOutcome {
    /// Positions of the selected records: strata in emit order, best
    /// composite first within a stratum
    pub selected: Vec<usize>,
    pub strata: BTreeMap<SeverityStratum, StratumCount>,
}

/// Selects up to a per-stratum quota of the best-scoring records
///
/// Records without a severity form their own stratum. Unused quota is never
/// moved to another stratum.
#[derive(Debug, Clone)]
pub struct StratifiedSampler {
    config: SamplingConfig,
}

/// Descending composite, then ascending id
pub fn rank(a: &ScoredRecord, b: &ScoredRecord) -> Ordering {
    b.composite_score
        .total_cmp(&a.composite_score)
        .then_with(|| a.id().cmp(b.id()))
}

impl StratifiedSampler {
    pub fn new(config: SamplingConfig) -> Self {
        Self { config }
    }

    /// Sample every record in `records`
    pub fn sample(&self, records: &[ScoredRecord]) -> SampleOutcome {
        self.sample_positions(records, 0..records.len())
    }

    /// Sample the records of `records` at the `eligible` positions
    pub fn sample_positions<I>(&self, records: &[ScoredRecord], eligible: I) -> SampleOutcome
    where
        I: IntoIterator<Item = usize>,
    {
        let mut groups: BTreeMap<SeverityStratum, Vec<usize>> = BTreeMap::new();
        for position in eligible {
            groups
                .entry(SeverityStratum::from(records[position].severity()))
                .or_default()
                .push(position);
        }

        let mut outcome = SampleOutcome::default();
        for (stratum, mut group) in groups {
            let quota = self.config.quota_for(stratum);
            let eligible = group.len();

            group.sort_by(|&a, &b| rank(&records[a], &records[b]));
            group.truncate(quota);

            debug!(%stratum, eligible, selected = group.len(), quota, "Stratum sampled");
            outcome.strata.insert(
                stratum,
                StratumCount {
                    eligible,
                    selected: group.len(),
                    quota,
                },
            );
            outcome.selected.extend(group);
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cvecurate_core::{DimensionScores, RawRecord, Severity, Source};

    fn scored(id: &str, severity: Option<Severity>, composite: f64) -> ScoredRecord {
        let mut record = RawRecord::new(id, "description", Source::Authoritative);
        record.severity = severity;
        ScoredRecord {
            record,
            scores: DimensionScores::zero(),
            composite_score: composite,
            training_ready: true,
            pipeline_version: "v-test".to_string(),
            scored_at: Utc::now(),
        }
    }

    fn quota(n: usize) -> SamplingConfig {
        SamplingConfig {
            default_quota: n,
            ..SamplingConfig::default()
        }
    }

    #[test]
    fn test_quota_and_ordering() {
        let records = vec![
            scored("CVE-3", Some(Severity::High), 0.7),
            scored("CVE-1", Some(Severity::High), 0.9),
            scored("CVE-2", Some(Severity::High), 0.7),
            scored("CVE-4", Some(Severity::Critical), 0.65),
        ];
        let outcome = StratifiedSampler::new(quota(2)).sample(&records);

        let ids: Vec<_> = outcome.selected.iter().map(|&i| records[i].id()).collect();
        assert_eq!(ids, vec!["CVE-4", "CVE-1", "CVE-2"]);
        assert_eq!(
            outcome.strata[&SeverityStratum::High],
            StratumCount { eligible: 3, selected: 2, quota: 2 }
        );
        assert_eq!(outcome.strata[&SeverityStratum::Critical].selected, 1);
    }

    #[test]
    fn test_unrated_stratum_and_overrides() {
        let mut config = quota(1);
        config.per_severity.insert(SeverityStratum::Unrated, 3);
        let records = vec![
            scored("CVE-1", None, 0.8),
            scored("CVE-2", None, 0.7),
            scored("CVE-3", Some(Severity::Low), 0.9),
            scored("CVE-4", Some(Severity::Low), 0.95),
        ];
        let outcome = StratifiedSampler::new(config).sample(&records);

        let ids: Vec<_> = outcome.selected.iter().map(|&i| records[i].id()).collect();
        assert_eq!(ids, vec!["CVE-4", "CVE-1", "CVE-2"]);
    }

    #[test]
    fn test_only_eligible_positions_considered() {
        let records = vec![
            scored("CVE-1", Some(Severity::High), 0.9),
            scored("CVE-2", Some(Severity::High), 0.8),
        ];
        let outcome = StratifiedSampler::new(quota(5)).sample_positions(&records, [1]);
        assert_eq!(outcome.selected, vec![1]);
    }

    #[test]
    fn test_zero_quota_selects_nothing() {
        let records = vec![scored("CVE-1", Some(Severity::Medium), 0.9)];
        let outcome = StratifiedSampler::new(quota(0)).sample(&records);
        assert!(outcome.selected.is_empty());
        assert_eq!(outcome.strata[&SeverityStratum::Medium].eligible, 1);
    }
}
