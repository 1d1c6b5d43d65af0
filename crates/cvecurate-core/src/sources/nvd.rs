//! NVD CVE 2.0 feed adapter
//!
//! Converts an already-fetched NVD CVE API 2.0 response document into
//! [`SourceRecord`]s:
//! ```text
//! {"totalResults": 1, "vulnerabilities": [{"cve": {"id": "CVE-2023-44487",
//!   "published": "2023-10-10T14:15:10.283", "descriptions": [...],
//!   "metrics": {"cvssMetricV31": [...]}, "weaknesses": [...]}}]}
//! ```
//! Fetching, pagination and rate limiting belong to the ingestion
//! collaborator; this adapter only reads what it saved.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::ingest::SourceRecord;

/// Source tag stamped on records from this feed
pub const NVD_SOURCE_TAG: &str = "nvd";

/// Metric keys in preference order
const CVSS_METRIC_KEYS: [&str; 2] = ["cvssMetricV31", "cvssMetricV30"];

/// NVD CVE 2.0 feed adapter
#[derive(Debug, Clone, Default)]
pub struct NvdFeedAdapter;

impl NvdFeedAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Parse one response document
    ///
    /// Fails only if the document is not JSON or lacks the `vulnerabilities`
    /// array; individual entries with missing parts degrade to absent fields.
    pub fn parse(&self, document: &str) -> Result<Vec<SourceRecord>> {
        let feed: NvdFeed = serde_json::from_str(document)
            .map_err(|e| Error::source_doc(format!("failed to parse NVD feed: {}", e)))?;

        let records: Vec<SourceRecord> = feed
            .vulnerabilities
            .into_iter()
            .map(|item| self.convert(item.cve))
            .collect();

        tracing::debug!(
            records = records.len(),
            total_results = ?feed.total_results,
            "parsed NVD feed page"
        );
        Ok(records)
    }

    fn convert(&self, cve: NvdCve) -> SourceRecord {
        let (cvss_score, severity) = extract_cvss(&cve.metrics);
        SourceRecord {
            id: cve.id,
            description: extract_description(&cve.descriptions),
            published: cve.published,
            cvss_score,
            severity,
            cwe_ids: extract_cwe_ids(&cve.weaknesses),
            source: Some(NVD_SOURCE_TAG.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdFeed {
    #[serde(default)]
    total_results: Option<u64>,
    vulnerabilities: Vec<NvdItem>,
}

#[derive(Debug, Deserialize)]
struct NvdItem {
    #[serde(default)]
    cve: NvdCve,
}

#[derive(Debug, Default, Deserialize)]
struct NvdCve {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    published: Option<String>,
    #[serde(default)]
    descriptions: Vec<NvdLangString>,
    #[serde(default)]
    metrics: Value,
    #[serde(default)]
    weaknesses: Vec<NvdWeakness>,
}

#[derive(Debug, Deserialize)]
struct NvdLangString {
    #[serde(default)]
    lang: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct NvdWeakness {
    #[serde(default)]
    description: Vec<NvdLangString>,
}

/// First English description
fn extract_description(descriptions: &[NvdLangString]) -> Option<String> {
    descriptions
        .iter()
        .find(|d| matches!(d.lang.to_ascii_lowercase().as_str(), "en" | "en-us"))
        .map(|d| d.value.clone())
}

/// Base score and severity, preferring CVSS v3.1 over v3.0
fn extract_cvss(metrics: &Value) -> (Option<Value>, Option<String>) {
    for key in CVSS_METRIC_KEYS {
        let Some(entry) = metrics.get(key).and_then(|m| m.get(0)) else {
            continue;
        };
        let data = entry.get("cvssData");
        let score = data.and_then(|d| d.get("baseScore")).cloned();
        let severity = data
            .and_then(|d| d.get("baseSeverity"))
            .or_else(|| entry.get("baseSeverity"))
            .and_then(Value::as_str)
            .map(str::to_string);
        return (score, severity);
    }
    (None, None)
}

/// Weakness values that look like CWE identifiers
fn extract_cwe_ids(weaknesses: &[NvdWeakness]) -> Vec<String> {
    weaknesses
        .iter()
        .flat_map(|w| w.description.iter())
        .filter(|d| d.value.starts_with("CWE-"))
        .map(|d| d.value.clone())
        .collect()
}
