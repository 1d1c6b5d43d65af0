//! Command workflows against temporary directories

use chrono::{NaiveDate, TimeZone, Utc};
use cvecurate_cli::commands::{self, stream_path};
use cvecurate_cli::{read_jsonl, ConfigLoader, ConfigOverrides, JsonlBatch};
use cvecurate_core::{
    AbsentDatePolicy, CurationConfig, ScoredRecord, Severity, SeverityStratum, SourceRecord,
};
use cvecurate_filter::{CurationEngine, FilteredRecord};
use cvecurate_telemetry::RunLedger;
use std::path::Path;
use std::sync::Arc;

const STRONG: &str = "A use-after-free in the WebRTC stack allows a remote attacker to exploit \
                      heap corruption via a crafted SDP offer.";

const INPUT: &str = r#"{"cve_id": "CVE-2024-0001", "description": "A use-after-free in the WebRTC stack allows a remote attacker to exploit heap corruption via a crafted SDP offer.", "severity": "HIGH", "cvss_score": 7.1, "cwe_ids": ["CWE-416"], "published": "2024-02-01", "source": "nvd"}

{"cve_id": "CVE-2024-0002", "description": "A use-after-free in the WebRTC stack allows a remote attacker to exploit heap corruption via a crafted SDP offer.", "severity": "HIGH", "cvss_score": "7.1", "cwe_ids": "CWE-416", "published": "2024-09-15T10:00:00", "source": "nvd"}
{"cve_id": "CVE-2024-0003", "description": "Too short.", "severity": "HIGH", "source": "nvd"}
{"cve_id": "CVE-2024-0004", "description": truncated
"#;

fn no_env() -> std::iter::Empty<(String, String)> {
    std::iter::empty()
}

fn engine() -> Arc<CurationEngine> {
    Arc::new(CurationEngine::new(CurationConfig::default()).unwrap())
}

async fn rows(path: impl AsRef<Path>) -> Vec<FilteredRecord> {
    let batch: JsonlBatch<FilteredRecord> = read_jsonl(path).await.unwrap();
    assert_eq!(batch.skipped, 0);
    batch.records
}

#[test]
fn test_config_layers_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cvecurate.yaml");
    std::fs::write(
        &path,
        "thresholds:\n  review: 0.3\nsampling:\n  default_quota: 10\n  per_severity:\n    CRITICAL: 3\n",
    )
    .unwrap();

    let overrides = ConfigOverrides {
        quota: Some(5),
        ..ConfigOverrides::default()
    };
    let config = ConfigLoader::new(Some(path))
        .with_env([
            ("CVECURATE__THRESHOLDS__REVIEW", "0.35"),
            ("CVECURATE__DECONTAMINATION__CUTOFF_DATE", "2023-12-31"),
        ])
        .load(&overrides)
        .unwrap();

    assert_eq!(config.thresholds.review, 0.35);
    assert_eq!(config.thresholds.training, 0.6);
    assert_eq!(config.sampling.default_quota, 5);
    assert_eq!(config.sampling.quota_for(SeverityStratum::Critical), 3);
    assert_eq!(config.sampling.quota_for(SeverityStratum::Low), 5);
    assert_eq!(
        config.decontamination.cutoff_date,
        NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
    );
}

#[test]
fn test_missing_default_file_yields_defaults() {
    let config = ConfigLoader::new(None)
        .with_env(no_env())
        .load(&ConfigOverrides::default())
        .unwrap();
    assert_eq!(config, CurationConfig::default());
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ConfigLoader::new(Some(dir.path().join("absent.yaml")))
        .with_env(no_env())
        .load(&ConfigOverrides::default());
    assert!(result.is_err());
}

#[test]
fn test_invalid_override_refused() {
    let overrides = ConfigOverrides {
        review_threshold: Some(0.75),
        absent_date_policy: Some(AbsentDatePolicy::Flagged),
        ..ConfigOverrides::default()
    };
    let err = ConfigLoader::new(None)
        .with_env(no_env())
        .load(&overrides)
        .unwrap_err();
    assert!(err.to_string().contains("review threshold"));
}

#[tokio::test]
async fn test_run_writes_streams_and_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.jsonl");
    tokio::fs::write(&input, INPUT).await.unwrap();
    let out = dir.path().join("out");

    let scored_at = Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap();
    let report = commands::run(engine(), &[input], &out, scored_at)
        .await
        .unwrap();

    assert_eq!(report.score.total, 3);
    assert_eq!(report.score.hard_filtered, 1);
    assert_eq!(report.filter.training_final, 1);
    assert_eq!(report.filter.flagged_contamination, 1);

    let training = rows(stream_path(&out, "training_final")).await;
    assert_eq!(training.len(), 1);
    assert_eq!(training[0].id(), "CVE-2024-0001");
    assert!(training[0].sampled);
    assert_eq!(training[0].scored.severity(), Some(Severity::High));
    assert_eq!(training[0].scored.scored_at, scored_at);

    let flagged = rows(stream_path(&out, "flagged_contamination")).await;
    assert_eq!(flagged[0].id(), "CVE-2024-0002");
    assert!(flagged[0].contamination_flag);

    let rejected = rows(stream_path(&out, "rejected")).await;
    assert_eq!(rejected[0].id(), "CVE-2024-0003");
    assert_eq!(rejected[0].scored.composite_score, 0.0);
    assert!(rows(stream_path(&out, "review_queue")).await.is_empty());

    let scored: JsonlBatch<ScoredRecord> = read_jsonl(stream_path(&out, "scored_all")).await.unwrap();
    assert_eq!(scored.records.len(), 3);

    let ledger = RunLedger::from_file(out.join("run_ledger.json")).unwrap();
    assert!(ledger.verify());
    assert_eq!(ledger.entries().len(), 6);
    assert_eq!(ledger.head(), report.ledger_head.as_deref());
}

#[tokio::test]
async fn test_filter_reproduces_run_streams() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.jsonl");
    tokio::fs::write(&input, INPUT).await.unwrap();

    let run_dir = dir.path().join("run");
    commands::run(engine(), &[input.clone()], &run_dir, Utc::now())
        .await
        .unwrap();

    let scored = dir.path().join("scored.jsonl");
    let summary = commands::score(engine(), &[input], &scored, Utc::now())
        .await
        .unwrap();
    assert_eq!(summary.training_ready, 2);

    let filter_dir = dir.path().join("filter");
    let filtered = commands::filter(engine(), &scored, &filter_dir).await.unwrap();
    assert_eq!(filtered.training_final, 1);

    let from_run = RunLedger::from_file(run_dir.join("run_ledger.json")).unwrap();
    let from_filter = RunLedger::from_file(filter_dir.join("run_ledger.json")).unwrap();
    let digests = |ledger: &RunLedger| {
        ledger
            .entries()
            .iter()
            .filter(|e| e.stage != "normalized")
            .map(|e| (e.stage.clone(), e.digest.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(digests(&from_run), digests(&from_filter));
}

#[tokio::test]
async fn test_import_nvd_feed() {
    let dir = tempfile::tempdir().unwrap();
    let feed = dir.path().join("page-0.json");
    let document = serde_json::json!({
        "totalResults": 1,
        "vulnerabilities": [{"cve": {
            "id": "CVE-2023-4863",
            "published": "2023-09-12T15:15:24.327",
            "descriptions": [{"lang": "en", "value": STRONG}],
            "metrics": {"cvssMetricV31": [{"cvssData": {"baseScore": 8.8, "baseSeverity": "HIGH"}}]},
            "weaknesses": [{"description": [{"lang": "en", "value": "CWE-787"}]}]
        }}]
    });
    tokio::fs::write(&feed, document.to_string()).await.unwrap();

    let output = dir.path().join("sources/nvd.jsonl");
    let count = commands::import_nvd(&[feed], &output).await.unwrap();
    assert_eq!(count, 1);

    let batch: JsonlBatch<SourceRecord> = read_jsonl(&output).await.unwrap();
    let record = batch.records[0].normalize().unwrap();
    assert_eq!(record.id, "CVE-2023-4863");
    assert_eq!(record.cvss_score, Some(8.8));
    assert_eq!(record.severity, Some(Severity::High));
    assert!(record.cwe_ids.contains("CWE-787"));
}
