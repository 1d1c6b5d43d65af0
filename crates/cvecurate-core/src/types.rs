//! Core record types for cvecurate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Qualitative severity tier attached to a vulnerability
///
/// Absence is modelled as `Option<Severity>::None`, never as a variant, so an
/// unrated record cannot be confused with a low-severity one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parse a severity label in any case; unknown labels yield `None`
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Self::Low),
            "MEDIUM" | "MODERATE" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Canonical upper-case label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of a record
///
/// Variant order is authority order: `Unknown < Secondary < Authoritative`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Unknown,
    Secondary,
    Authoritative,
}

impl Source {
    /// Map a free-form source tag to a provenance class
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "authoritative" | "nvd" => Self::Authoritative,
            "secondary" | "huggingface" | "hf" => Self::Secondary,
            _ => Self::Unknown,
        }
    }

    /// Canonical lower-case tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authoritative => "authoritative",
            Self::Secondary => "secondary",
            Self::Unknown => "unknown",
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Self::Unknown
    }
}

impl<'de> Deserialize<'de> for Source {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag.as_deref().map(Self::from_tag).unwrap_or_default())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized vulnerability record
///
/// Produced once by the normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Unique identifier, e.g. a CVE id
    #[serde(rename = "cve_id", alias = "id")]
    pub id: String,

    /// Free-text description; `None` when missing or blank
    pub description: Option<String>,

    /// Publication date
    pub published: Option<NaiveDate>,

    /// CVSS base score in [0, 10]
    pub cvss_score: Option<f64>,

    /// Qualitative severity
    pub severity: Option<Severity>,

    /// Weakness category identifiers (CWE)
    #[serde(default)]
    pub cwe_ids: BTreeSet<String>,

    /// Provenance class
    #[serde(default)]
    pub source: Source,
}

impl RawRecord {
    /// Create a record with only an id, description, and source
    pub fn new(id: impl Into<String>, description: impl Into<String>, source: Source) -> Self {
        let description = description.into();
        Self {
            id: id.into(),
            description: if description.trim().is_empty() {
                None
            } else {
                Some(description)
            },
            published: None,
            cvss_score: None,
            severity: None,
            cwe_ids: BTreeSet::new(),
            source,
        }
    }

    /// Set the publication date
    pub fn with_published(mut self, published: NaiveDate) -> Self {
        self.published = Some(published);
        self
    }

    /// Set the CVSS score
    pub fn with_cvss(mut self, score: f64) -> Self {
        self.cvss_score = Some(score);
        self
    }

    /// Set the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Add a weakness category identifier
    pub fn with_cwe(mut self, cwe: impl Into<String>) -> Self {
        self.cwe_ids.insert(cwe.into());
        self
    }

    /// Description length in characters (not bytes); 0 when absent
    pub fn description_chars(&self) -> usize {
        self.description
            .as_deref()
            .map(|d| d.chars().count())
            .unwrap_or(0)
    }
}

/// The four per-dimension quality scores, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DimensionScores {
    pub relevance_score: f64,
    pub completeness_score: f64,
    pub source_credibility_score: f64,
    pub clarity_score: f64,
}

impl DimensionScores {
    /// All dimensions zero (hard-filter outcome)
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scores in fixed order: relevance, completeness, credibility, clarity
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.relevance_score,
            self.completeness_score,
            self.source_credibility_score,
            self.clarity_score,
        ]
    }
}

/// A record with its quality scores and provenance metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: RawRecord,

    #[serde(flatten)]
    pub scores: DimensionScores,

    /// Weighted sum of the dimension scores, rounded
    pub composite_score: f64,

    /// `composite_score >= training threshold`
    pub training_ready: bool,

    /// Metadata only; never read by decision logic
    pub pipeline_version: String,

    /// Metadata only; never read by decision logic
    pub scored_at: DateTime<Utc>,
}

impl ScoredRecord {
    /// Shortcut for the record id
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Shortcut for the record severity
    pub fn severity(&self) -> Option<Severity> {
        self.record.severity
    }
}

/// Provenance stamped onto every scored record of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub pipeline_version: String,
    pub scored_at: DateTime<Utc>,
}

impl Provenance {
    /// Create provenance metadata for a run
    pub fn new(pipeline_version: impl Into<String>, scored_at: DateTime<Utc>) -> Self {
        Self {
            pipeline_version: pipeline_version.into(),
            scored_at,
        }
    }
}

/// Classification outcome of thresholding the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Training,
    Review,
    Rejected,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Review => "review",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling stratum: a severity, or the bucket of unrated records
///
/// Ordering is the order strata are emitted in: most severe first, unrated last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeverityStratum {
    #[serde(alias = "critical")]
    Critical,
    #[serde(alias = "high")]
    High,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "low")]
    Low,
    #[serde(alias = "unrated")]
    Unrated,
}

impl From<Option<Severity>> for SeverityStratum {
    fn from(severity: Option<Severity>) -> Self {
        match severity {
            Some(Severity::Critical) => Self::Critical,
            Some(Severity::High) => Self::High,
            Some(Severity::Medium) => Self::Medium,
            Some(Severity::Low) => Self::Low,
            None => Self::Unrated,
        }
    }
}

impl fmt::Display for SeverityStratum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Unrated => "UNRATED",
        };
        f.write_str(label)
    }
}
