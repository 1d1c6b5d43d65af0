//! Command implementations
//!
//! Each command reads its inputs, hands the CPU-bound stages to a blocking
//! worker, and writes its outputs concurrently.

use anyhow::Context;
use chrono::{DateTime, Utc};
use cvecurate_core::{NvdFeedAdapter, ScoredRecord, SourceRecord};
use cvecurate_filter::{CurationEngine, CurationStreams, FilterStageOutput};
use cvecurate_telemetry::{FilterSummary, RunLedger, ScoreSummary};
use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::dataset::{read_jsonl_files, write_jsonl, JsonlBatch};

/// Extension of every stream file
pub const STREAM_EXTENSION: &str = "jsonl";

const SCORED_ALL: &str = "scored_all";
const LEDGER_FILE: &str = "run_ledger.json";

/// Outcome of a full `run`
#[derive(Debug, Clone)]
pub struct RunReport {
    pub score: ScoreSummary,
    pub filter: FilterSummary,
    /// Hash of the last ledger entry
    pub ledger_head: Option<String>,
}

/// Convert saved NVD feed pages into source-record JSONL
pub async fn import_nvd(feeds: &[PathBuf], output: &Path) -> anyhow::Result<usize> {
    let adapter = NvdFeedAdapter::new();
    let mut records: Vec<SourceRecord> = Vec::new();

    for feed in feeds {
        let document = tokio::fs::read_to_string(feed)
            .await
            .with_context(|| format!("failed to read {}", feed.display()))?;
        let page = adapter
            .parse(&document)
            .with_context(|| format!("failed to import {}", feed.display()))?;
        info!(feed = %feed.display(), records = page.len(), "Imported NVD feed");
        records.extend(page);
    }

    write_jsonl(output, &records).await?;
    Ok(records.len())
}

/// Normalize and score source records into one JSONL file
pub async fn score(
    engine: Arc<CurationEngine>,
    inputs: &[PathBuf],
    output: &Path,
    scored_at: DateTime<Utc>,
) -> anyhow::Result<ScoreSummary> {
    let input = read_sources(inputs).await?;

    let stage = tokio::task::spawn_blocking(move || {
        let normalized = engine.normalize(input);
        engine.score_stage(&normalized.records, scored_at)
    })
    .await
    .context("scoring task failed")?;

    write_jsonl(output, &stage.scored).await?;
    info!(output = %output.display(), records = stage.scored.len(), "Wrote scored records");
    Ok(stage.summary)
}

/// Tier, sample, and decontaminate scored records into stream files
pub async fn filter(
    engine: Arc<CurationEngine>,
    scored: &Path,
    output_dir: &Path,
) -> anyhow::Result<FilterSummary> {
    let batch: JsonlBatch<ScoredRecord> = read_jsonl_files(&[scored.to_path_buf()]).await?;
    report_skipped(batch.skipped);
    let records = batch.records;

    let pipeline_version = engine.config().pipeline_version.clone();
    let (output, ledger) = tokio::task::spawn_blocking(move || {
        let output = engine.filter_stage(&records);
        let mut ledger = RunLedger::new(pipeline_version);
        ledger.append_scored(SCORED_ALL, &records);
        output.append_to(&mut ledger);
        (output, ledger)
    })
    .await
    .context("filter task failed")?;

    write_streams(output_dir, &output.streams).await?;
    write_ledger(output_dir, ledger).await?;
    log_strata(&output);
    Ok(output.summary)
}

/// Every stage from source records to stream files
pub async fn run(
    engine: Arc<CurationEngine>,
    inputs: &[PathBuf],
    output_dir: &Path,
    scored_at: DateTime<Utc>,
) -> anyhow::Result<RunReport> {
    let input = read_sources(inputs).await?;

    let pipeline_version = engine.config().pipeline_version.clone();
    let (output, ledger) = tokio::task::spawn_blocking(move || {
        let output = engine.run(input, scored_at);
        let ledger = output.ledger(&pipeline_version);
        (output, ledger)
    })
    .await
    .context("curation task failed")?;

    let scored_path = stream_path(output_dir, SCORED_ALL);
    futures::try_join!(
        write_jsonl(&scored_path, &output.score.scored),
        write_streams(output_dir, &output.filter.streams),
    )?;
    let ledger = write_ledger(output_dir, ledger).await?;
    log_strata(&output.filter);

    Ok(RunReport {
        score: output.score.summary,
        filter: output.filter.summary,
        ledger_head: ledger.head().map(str::to_string),
    })
}

/// `<dir>/<name>.jsonl`
pub fn stream_path(output_dir: &Path, name: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", name, STREAM_EXTENSION))
}

async fn read_sources(inputs: &[PathBuf]) -> anyhow::Result<Vec<SourceRecord>> {
    let batch: JsonlBatch<SourceRecord> = read_jsonl_files(inputs).await?;
    report_skipped(batch.skipped);
    info!(files = inputs.len(), records = batch.records.len(), "Read source records");
    Ok(batch.records)
}

async fn write_streams(output_dir: &Path, streams: &CurationStreams) -> anyhow::Result<()> {
    let writes = streams
        .named()
        .into_iter()
        .map(|(name, rows)| write_jsonl(stream_path(output_dir, name), rows));
    try_join_all(writes).await?;

    info!(
        output_dir = %output_dir.display(),
        training_final = streams.training_final.len(),
        review_queue = streams.review_queue.len(),
        rejected = streams.rejected.len(),
        flagged_contamination = streams.flagged_contamination.len(),
        "Wrote output streams"
    );
    Ok(())
}

async fn write_ledger(output_dir: &Path, ledger: RunLedger) -> anyhow::Result<RunLedger> {
    let path = output_dir.join(LEDGER_FILE);
    let ledger = tokio::task::spawn_blocking(move || {
        ledger
            .write_to(&path)
            .with_context(|| format!("failed to write {}", path.display()))
            .map(|()| ledger)
    })
    .await
    .context("ledger task failed")??;
    info!(
        run_id = %ledger.run_id,
        head = ledger.head().unwrap_or_default(),
        "Wrote run ledger"
    );
    Ok(ledger)
}

fn report_skipped(skipped: usize) {
    if skipped > 0 {
        warn!(skipped, "Malformed input lines were skipped");
    }
}

fn log_strata(output: &FilterStageOutput) {
    for (stratum, count) in &output.strata {
        info!(
            %stratum,
            eligible = count.eligible,
            selected = count.selected,
            quota = count.quota,
            "Stratum quota"
        );
    }
}
