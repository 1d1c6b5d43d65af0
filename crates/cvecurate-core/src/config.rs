//! Curation configuration
//!
//! One immutable [`CurationConfig`] is built at startup, validated once, and
//! passed by reference into every stage. An empty YAML document yields the
//! policy defaults.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::types::SeverityStratum;

const WEIGHT_TOLERANCE: f64 = 1e-6;
const MAX_PRECISION: u32 = 6;

/// Complete configuration for a curation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurationConfig {
    /// Dimension weights for the composite score
    #[serde(default)]
    pub weights: DimensionWeights,

    /// Tier thresholds
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Hard-filter description bounds
    #[serde(default)]
    pub description: DescriptionBounds,

    /// Stratified sampling quotas
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Temporal decontamination policy
    #[serde(default)]
    pub decontamination: DecontaminationConfig,

    /// Optional per-dimension exclusion floors
    #[serde(default)]
    pub exclusions: ExclusionConfig,

    /// Security keywords counted by the relevance scorer
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Regex patterns identifying placeholder descriptions
    #[serde(default = "default_placeholder_patterns")]
    pub placeholder_patterns: Vec<String>,

    /// Decimal places the composite score is rounded to
    #[serde(default = "default_precision")]
    pub composite_precision: u32,

    /// Version string stamped on scored records
    #[serde(default = "default_pipeline_version")]
    pub pipeline_version: String,
}

/// Weights of the four quality dimensions; must sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    #[serde(default = "default_relevance_weight")]
    pub relevance: f64,
    #[serde(default = "default_completeness_weight")]
    pub completeness: f64,
    #[serde(default = "default_credibility_weight")]
    pub source_credibility: f64,
    #[serde(default = "default_clarity_weight")]
    pub clarity: f64,
}

impl DimensionWeights {
    pub fn sum(&self) -> f64 {
        self.relevance + self.completeness + self.source_credibility + self.clarity
    }

    /// Weights in fixed order: relevance, completeness, credibility, clarity
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.relevance,
            self.completeness,
            self.source_credibility,
            self.clarity,
        ]
    }
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            relevance: default_relevance_weight(),
            completeness: default_completeness_weight(),
            source_credibility: default_credibility_weight(),
            clarity: default_clarity_weight(),
        }
    }
}

/// Composite-score thresholds; `review < training`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum composite for the training tier (and `training_ready`)
    #[serde(default = "default_training_threshold")]
    pub training: f64,

    /// Minimum composite for the review tier
    #[serde(default = "default_review_threshold")]
    pub review: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            training: default_training_threshold(),
            review: default_review_threshold(),
        }
    }
}

/// Closed interval of acceptable description lengths, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionBounds {
    #[serde(default = "default_min_len")]
    pub min_len: usize,
    #[serde(default = "default_max_len")]
    pub max_len: usize,
}

impl DescriptionBounds {
    /// Whether a length lies within `[min_len, max_len]`
    pub fn contains(&self, len: usize) -> bool {
        (self.min_len..=self.max_len).contains(&len)
    }
}

impl Default for DescriptionBounds {
    fn default() -> Self {
        Self {
            min_len: default_min_len(),
            max_len: default_max_len(),
        }
    }
}

/// Per-severity sampling quotas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Quota applied to every stratum without an override
    #[serde(default = "default_quota")]
    pub default_quota: usize,

    /// Overrides keyed by stratum (`CRITICAL`, `HIGH`, `MEDIUM`, `LOW`, `UNRATED`)
    #[serde(default)]
    pub per_severity: BTreeMap<SeverityStratum, usize>,
}

impl SamplingConfig {
    /// Quota for a stratum
    pub fn quota_for(&self, stratum: SeverityStratum) -> usize {
        self.per_severity
            .get(&stratum)
            .copied()
            .unwrap_or(self.default_quota)
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            default_quota: default_quota(),
            per_severity: BTreeMap::new(),
        }
    }
}

/// How records without a publication date are treated by decontamination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbsentDatePolicy {
    /// Absence is not evidence of recency
    #[default]
    Unflagged,
    /// Treat undated records as post-cutoff
    Flagged,
}

impl std::str::FromStr for AbsentDatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unflagged" => Ok(Self::Unflagged),
            "flagged" => Ok(Self::Flagged),
            other => Err(format!(
                "unknown absent-date policy '{}', expected 'flagged' or 'unflagged'",
                other
            )),
        }
    }
}

/// Temporal decontamination settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecontaminationConfig {
    /// Records published strictly after this date are quarantined
    #[serde(default = "default_cutoff")]
    pub cutoff_date: NaiveDate,

    #[serde(default)]
    pub absent_date_policy: AbsentDatePolicy,
}

impl Default for DecontaminationConfig {
    fn default() -> Self {
        Self {
            cutoff_date: default_cutoff(),
            absent_date_policy: AbsentDatePolicy::default(),
        }
    }
}

/// Dimension floors that demote otherwise-passing records to rejected
///
/// Disabled unless set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExclusionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_clarity: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_source_credibility: Option<f64>,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            weights: DimensionWeights::default(),
            thresholds: Thresholds::default(),
            description: DescriptionBounds::default(),
            sampling: SamplingConfig::default(),
            decontamination: DecontaminationConfig::default(),
            exclusions: ExclusionConfig::default(),
            keywords: default_keywords(),
            placeholder_patterns: default_placeholder_patterns(),
            composite_precision: default_precision(),
            pipeline_version: default_pipeline_version(),
        }
    }
}

impl CurationConfig {
    /// Load from YAML string (not validated)
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check every invariant the engine relies on
    ///
    /// A run must refuse to start on any error returned here.
    pub fn validate(&self) -> Result<()> {
        let weights = self.weights.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::config(format!(
                "dimension weights must be finite and non-negative, got {:?}",
                weights
            )));
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(Error::config(format!(
                "dimension weights must sum to 1.0, got {:.6}",
                sum
            )));
        }

        let Thresholds { training, review } = self.thresholds;
        for (name, value) in [("training", training), ("review", review)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(Error::config(format!(
                    "{} threshold must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }
        if review >= training {
            return Err(Error::config(format!(
                "review threshold ({}) must be below training threshold ({})",
                review, training
            )));
        }

        if self.description.min_len > self.description.max_len {
            return Err(Error::config(format!(
                "description min_len ({}) exceeds max_len ({})",
                self.description.min_len, self.description.max_len
            )));
        }

        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(Error::config("keyword list contains an empty entry"));
        }

        for pattern in &self.placeholder_patterns {
            Regex::new(pattern).map_err(|e| {
                Error::config(format!("invalid placeholder pattern '{}': {}", pattern, e))
            })?;
        }

        for (name, floor) in [
            ("min_clarity", self.exclusions.min_clarity),
            ("min_source_credibility", self.exclusions.min_source_credibility),
        ] {
            if let Some(value) = floor {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(Error::config(format!(
                        "exclusion floor {} must lie in [0, 1], got {}",
                        name, value
                    )));
                }
            }
        }

        if self.composite_precision > MAX_PRECISION {
            return Err(Error::config(format!(
                "composite_precision must be at most {}, got {}",
                MAX_PRECISION, self.composite_precision
            )));
        }

        Ok(())
    }
}

fn default_relevance_weight() -> f64 {
    0.35
}

fn default_completeness_weight() -> f64 {
    0.25
}

fn default_credibility_weight() -> f64 {
    0.25
}

fn default_clarity_weight() -> f64 {
    0.15
}

fn default_training_threshold() -> f64 {
    0.60
}

fn default_review_threshold() -> f64 {
    0.40
}

fn default_min_len() -> usize {
    50
}

fn default_max_len() -> usize {
    5000
}

fn default_quota() -> usize {
    50
}

fn default_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 1).unwrap_or_default()
}

fn default_precision() -> u32 {
    2
}

fn default_pipeline_version() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}

fn default_keywords() -> Vec<String> {
    [
        "exploit",
        "vulnerability",
        "injection",
        "overflow",
        "bypass",
        "authentication",
        "privilege",
        "remote code execution",
        "xss",
        "sqli",
        "rce",
        "buffer overflow",
        "use-after-free",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_placeholder_patterns() -> Vec<String> {
    vec![
        r"\*\*\s*RESERVED\s*\*\*".to_string(),
        r"\*\*\s*REJECT\s*\*\*".to_string(),
    ]
}
