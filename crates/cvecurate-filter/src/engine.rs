//! Curation engine composing every stage
//!
//! Stages run strictly in order: normalize, score, tier, sample, then
//! decontaminate. Sampling picks from the whole training tier before
//! contamination is known, so a flagged record can take a quota slot and
//! training-final may hold fewer records than the quota allows.

use chrono::{DateTime, Utc};
use cvecurate_core::{
    CurationConfig, Provenance, RawRecord, Result, ScoredRecord, SeverityStratum, SourceRecord,
    Tier,
};
use cvecurate_scoring::{BatchScorer, CompositeScorer};
use cvecurate_telemetry::{FilterSummary, RunLedger, ScoreSummary, StageMetrics};
use std::collections::{BTreeMap, HashSet};
use std::num::NonZeroUsize;
use tracing::{info, warn};

use crate::decontam::Decontaminator;
use crate::normalize::{NormalizeOutcome, Normalizer};
use crate::record::FilteredRecord;
use crate::sampler::{StratifiedSampler, StratumCount};
use crate::tier::TieredClassifier;

/// Output of the scoring stage
#[derive(Debug, Clone)]
pub struct ScoreStageOutput {
    /// Every record, input order
    pub scored: Vec<ScoredRecord>,
    pub summary: ScoreSummary,
}

/// The curated output streams
#[derive(Debug, Clone, Default)]
pub struct CurationStreams {
    /// Training tier, sampled, not flagged; sampler order
    pub training_final: Vec<FilteredRecord>,
    /// Review tier, not flagged; input order
    pub review_queue: Vec<FilteredRecord>,
    /// Rejected tier, not flagged; input order
    pub rejected: Vec<FilteredRecord>,
    /// Any tier, flagged; input order
    pub flagged_contamination: Vec<FilteredRecord>,
}

impl CurationStreams {
    /// Stream names paired with their rows, in ledger order
    pub fn named(&self) -> [(&'static str, &[FilteredRecord]); 4] {
        [
            ("training_final", self.training_final.as_slice()),
            ("review_queue", self.review_queue.as_slice()),
            ("rejected", self.rejected.as_slice()),
            ("flagged_contamination", self.flagged_contamination.as_slice()),
        ]
    }
}

/// Output of the filter stage
#[derive(Debug, Clone)]
pub struct FilterStageOutput {
    pub streams: CurationStreams,
    pub summary: FilterSummary,
    pub strata: BTreeMap<SeverityStratum, StratumCount>,
}

impl FilterStageOutput {
    /// Append one ledger entry per stream
    pub fn append_to(&self, ledger: &mut RunLedger) {
        for (name, rows) in self.streams.named() {
            ledger.append(name, rows.iter().map(FilteredRecord::ledger_line));
        }
    }
}

/// Output of a full run
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub normalized: NormalizeOutcome,
    pub score: ScoreStageOutput,
    pub filter: FilterStageOutput,
}

impl RunOutput {
    /// Ledger covering normalization, scoring and every stream
    pub fn ledger(&self, pipeline_version: &str) -> RunLedger {
        let mut ledger = RunLedger::new(pipeline_version);
        ledger.append(
            "normalized",
            self.normalized.records.iter().map(|r| r.id.as_str()),
        );
        ledger.append_scored("scored_all", &self.score.scored);
        self.filter.append_to(&mut ledger);
        ledger
    }
}

/// Runs the curation stages against one validated configuration
#[derive(Debug, Clone)]
pub struct CurationEngine {
    config: CurationConfig,
    normalizer: Normalizer,
    scorer: BatchScorer,
    classifier: TieredClassifier,
    sampler: StratifiedSampler,
    decontaminator: Decontaminator,
    metrics: StageMetrics,
}

impl CurationEngine {
    /// Create an engine; fails if the configuration is invalid
    pub fn new(config: CurationConfig) -> Result<Self> {
        let scorer = CompositeScorer::from_config(&config)?;

        Ok(Self {
            normalizer: Normalizer::new(),
            scorer: BatchScorer::new(scorer),
            classifier: TieredClassifier::new(config.thresholds, config.exclusions),
            sampler: StratifiedSampler::new(config.sampling.clone()),
            decontaminator: Decontaminator::new(config.decontamination),
            metrics: StageMetrics::new(),
            config,
        })
    }

    /// Record into shared counters instead of private ones
    pub fn with_metrics(mut self, metrics: StageMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.scorer = self.scorer.with_workers(workers);
        self
    }

    pub fn config(&self) -> &CurationConfig {
        &self.config
    }

    pub fn metrics(&self) -> &StageMetrics {
        &self.metrics
    }

    /// Provenance for a run scored at `scored_at`
    pub fn provenance(&self, scored_at: DateTime<Utc>) -> Provenance {
        Provenance::new(self.config.pipeline_version.clone(), scored_at)
    }

    /// Normalize and deduplicate source records
    pub fn normalize(&self, input: Vec<SourceRecord>) -> NormalizeOutcome {
        self.metrics.record_ingested(input.len());
        let outcome = self.normalizer.normalize(input);
        self.metrics.record_duplicates_resolved(outcome.duplicates_resolved);
        self.metrics.record_unkeyed(outcome.unkeyed.len());
        outcome
    }

    /// Hard filter and score every record
    pub fn score_stage(&self, records: &[RawRecord], scored_at: DateTime<Utc>) -> ScoreStageOutput {
        let provenance = self.provenance(scored_at);
        let scored = self.scorer.score_all(records, &provenance);

        let hard_filter = self.scorer.scorer().hard_filter();
        let hard_filtered = records
            .iter()
            .filter(|r| !hard_filter.check(r).passed())
            .count();

        self.metrics.record_scored(scored.len());
        self.metrics.record_hard_filtered(hard_filtered);

        let summary = ScoreSummary::from_records(&scored, hard_filtered);
        info!(
            scored = summary.total,
            training_ready = summary.training_ready,
            hard_filtered,
            workers = self.scorer.workers(),
            "Scoring stage complete"
        );

        ScoreStageOutput { scored, summary }
    }

    /// Tier, sample and decontaminate scored records into streams
    pub fn filter_stage(&self, scored: &[ScoredRecord]) -> FilterStageOutput {
        let hard_filter = self.scorer.scorer().hard_filter();
        let training_threshold = self.scorer.scorer().training_threshold();

        // Records loaded from a file may have been scored under another threshold
        let stale = scored
            .iter()
            .filter(|r| r.training_ready != (r.composite_score >= training_threshold))
            .count();
        if stale > 0 {
            warn!(
                stale,
                training_threshold,
                "training_ready disagrees with the configured threshold; recomputed"
            );
        }

        let decisions: Vec<_> = scored.iter().map(|r| self.classifier.classify(r)).collect();
        let flagged: Vec<bool> = scored
            .iter()
            .map(|r| self.decontaminator.is_flagged(&r.record))
            .collect();

        let training_positions = decisions
            .iter()
            .enumerate()
            .filter(|(_, d)| d.tier == Tier::Training)
            .map(|(i, _)| i);
        let sample = self.sampler.sample_positions(scored, training_positions);
        let sampled: HashSet<usize> = sample.selected.iter().copied().collect();

        let row = |i: usize| {
            let decision = &decisions[i];
            let mut record = scored[i].clone();
            record.training_ready = record.composite_score >= training_threshold;
            FilteredRecord {
                scored: record,
                tier: decision.tier,
                sampled: sampled.contains(&i),
                contamination_flag: flagged[i],
                exclusion_reason: decision.exclusion_reason.clone(),
            }
        };

        let mut streams = CurationStreams {
            training_final: sample
                .selected
                .iter()
                .copied()
                .filter(|&i| !flagged[i])
                .map(row)
                .collect(),
            ..CurationStreams::default()
        };

        let mut summary = FilterSummary {
            total_input: scored.len(),
            sampled: sample.selected.len(),
            ..FilterSummary::default()
        };

        for (i, decision) in decisions.iter().enumerate() {
            if !hard_filter.check(&scored[i].record).passed() {
                summary.hard_filtered += 1;
            }
            if decision.exclusion_reason.is_some() {
                summary.excluded += 1;
            }
            match decision.tier {
                Tier::Training => summary.training += 1,
                Tier::Review => summary.review += 1,
                Tier::Rejected => summary.rejected += 1,
            }

            if flagged[i] {
                streams.flagged_contamination.push(row(i));
                continue;
            }
            match decision.tier {
                Tier::Training => {}
                Tier::Review => streams.review_queue.push(row(i)),
                Tier::Rejected => streams.rejected.push(row(i)),
            }
        }

        summary.training_final = streams.training_final.len();
        summary.review_queue = streams.review_queue.len();
        summary.flagged_contamination = streams.flagged_contamination.len();

        self.metrics.record_training(summary.training);
        self.metrics.record_review(summary.review);
        self.metrics.record_rejected(summary.rejected);
        self.metrics.record_sampled(summary.sampled);
        self.metrics.record_quarantined(summary.flagged_contamination);

        info!(
            input = summary.total_input,
            training_final = summary.training_final,
            review_queue = summary.review_queue,
            rejected = streams.rejected.len(),
            quarantined = summary.flagged_contamination,
            cutoff = %self.decontaminator.cutoff(),
            "Filter stage complete"
        );

        FilterStageOutput {
            streams,
            summary,
            strata: sample.strata,
        }
    }

    /// Every stage over one batch
    pub fn run(&self, input: Vec<SourceRecord>, scored_at: DateTime<Utc>) -> RunOutput {
        let normalized = self.normalize(input);
        let score = self.score_stage(&normalized.records, scored_at);
        let filter = self.filter_stage(&score.scored);
        RunOutput {
            normalized,
            score,
            filter,
        }
    }
}
