//! Lenient wire shape for records handed over by ingestion collaborators
//!
//! Sources disagree on field names and types: the authoritative feed sends
//! numbers where the bulk dataset sends strings, dates arrive with or without
//! a time component, and any optional field may be `null`. [`SourceRecord`]
//! accepts all of that without failing, and the `parse_*` helpers turn each
//! field into its canonical form or `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::types::{RawRecord, Severity, Source};

/// A record exactly as a source delivered it
///
/// Field names vary by source. When a document carries more than one spelling
/// of a field, the first usable value in precedence order (listed below for
/// each field) wins, so a duplicate never fails the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceRecord {
    #[serde(rename = "cve_id")]
    pub id: Option<String>,
    pub description: Option<String>,
    pub published: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvss_score: Option<Value>,
    pub severity: Option<String>,
    pub cwe_ids: Vec<String>,
    pub source: Option<String>,
}

/// Accepted spellings of each field, highest precedence first
const ID_KEYS: &[&str] = &["cve_id", "id", "CVE_ID", "Name"];
const DESCRIPTION_KEYS: &[&str] = &["description", "Description", "desc"];
const PUBLISHED_KEYS: &[&str] = &["published", "Published", "publish_date"];
const SEVERITY_KEYS: &[&str] = &["severity", "Severity", "cvss_severity"];

impl<'de> Deserialize<'de> for SourceRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self {
            id: pick_string(&fields, ID_KEYS),
            description: pick_string(&fields, DESCRIPTION_KEYS),
            published: pick_string(&fields, PUBLISHED_KEYS),
            cvss_score: fields.get("cvss_score").filter(|v| !v.is_null()).cloned(),
            severity: pick_string(&fields, SEVERITY_KEYS),
            cwe_ids: fields.get("cwe_ids").map(string_list).unwrap_or_default(),
            source: pick_string(&fields, &["source"]),
        })
    }
}

impl SourceRecord {
    /// Trimmed id, or `None` when blank
    pub fn key(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Provenance class of this record
    pub fn provenance(&self) -> Source {
        self.source
            .as_deref()
            .map(Source::from_tag)
            .unwrap_or_default()
    }

    /// Convert into a canonical record, marking malformed optional fields absent
    ///
    /// Returns `None` only when the record has no usable id.
    pub fn normalize(&self) -> Option<RawRecord> {
        let id = self.key()?.to_string();
        Some(RawRecord {
            id,
            description: self
                .description
                .as_ref()
                .filter(|d| !d.trim().is_empty())
                .cloned(),
            published: self.published.as_deref().and_then(parse_published),
            cvss_score: self.cvss_score.as_ref().and_then(parse_cvss),
            severity: self.severity.as_deref().and_then(Severity::parse),
            cwe_ids: normalize_cwe_ids(&self.cwe_ids),
            source: self.provenance(),
        })
    }
}

/// Parse a publication date in any of the formats sources are known to use
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS[.fff]`, `YYYY-MM-DD`, `YYYY-MM`
/// (first of month) and `YYYY` (1 January).
pub fn parse_published(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    let mut parts = raw.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    if !(1000..=9999).contains(&year) {
        return None;
    }
    match (parts.next(), parts.next()) {
        (None, _) => NaiveDate::from_ymd_opt(year, 1, 1),
        (Some(month), None) => NaiveDate::from_ymd_opt(year, month.parse().ok()?, 1),
        _ => None,
    }
}

/// Parse a CVSS base score from a number or numeric string
///
/// Values outside [0, 10] or non-finite values are treated as absent.
pub fn parse_cvss(raw: &Value) -> Option<f64> {
    let score = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (score.is_finite() && (0.0..=10.0).contains(&score)).then_some(score)
}

/// Trim, drop blanks, and de-duplicate weakness identifiers
pub fn normalize_cwe_ids(raw: &[String]) -> BTreeSet<String> {
    raw.iter()
        .map(|cwe| cwe.trim())
        .filter(|cwe| !cwe.is_empty())
        .map(str::to_string)
        .collect()
}

/// First non-blank string under `keys`, else the first number or bool
fn pick_string(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    let values = || keys.iter().filter_map(|key| fields.get(*key));
    values()
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        })
        .or_else(|| {
            values().find_map(|value| match value {
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
        })
}

/// An array of strings, or one comma-separated string
fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_published_formats() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(parse_published("2023-10-10T14:15:10.283"), Some(d(2023, 10, 10)));
        assert_eq!(parse_published("2023-10-10T14:15:10"), Some(d(2023, 10, 10)));
        assert_eq!(parse_published("2023-10-10T14:15:10Z"), Some(d(2023, 10, 10)));
        assert_eq!(parse_published("2023-10-10"), Some(d(2023, 10, 10)));
        assert_eq!(parse_published("2023-10"), Some(d(2023, 10, 1)));
        assert_eq!(parse_published("2020"), Some(d(2020, 1, 1)));
        assert_eq!(parse_published("yesterday"), None);
        assert_eq!(parse_published("2023-13"), None);
        assert_eq!(parse_published(""), None);
    }

    #[test]
    fn test_parse_cvss() {
        assert_eq!(parse_cvss(&serde_json::json!(7.5)), Some(7.5));
        assert_eq!(parse_cvss(&serde_json::json!("9.8")), Some(9.8));
        assert_eq!(parse_cvss(&serde_json::json!(10)), Some(10.0));
        assert_eq!(parse_cvss(&serde_json::json!(11.0)), None);
        assert_eq!(parse_cvss(&serde_json::json!(-1)), None);
        assert_eq!(parse_cvss(&serde_json::json!("high")), None);
        assert_eq!(parse_cvss(&Value::Null), None);
    }

    #[test]
    fn test_lenient_deserialization() {
        let json = r#"{
            "CVE_ID": "CVE-2019-0001",
            "Description": "Something bad",
            "publish_date": 2019,
            "cvss_score": "n/a",
            "severity": "high",
            "cwe_ids": null,
            "source": "huggingface",
            "last_modified": ""
        }"#;
        let record: SourceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.key(), Some("CVE-2019-0001"));
        assert_eq!(record.published.as_deref(), Some("2019"));
        assert!(record.cwe_ids.is_empty());

        let normalized = record.normalize().unwrap();
        assert_eq!(normalized.source, Source::Secondary);
        assert_eq!(normalized.severity, Some(Severity::High));
        assert_eq!(normalized.cvss_score, None);
        assert_eq!(normalized.published, NaiveDate::from_ymd_opt(2019, 1, 1));
    }

    #[test]
    fn test_duplicate_spellings_resolve_by_precedence() {
        let json = r#"{
            "id": 17,
            "CVE_ID": "CVE-2024-0002",
            "description": "",
            "Description": "Stack overflow in the parser",
            "publish_date": "2020-01-01",
            "published": "2024-03-05",
            "cvss_severity": "LOW",
            "severity": "CRITICAL"
        }"#;
        let record: SourceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.key(), Some("CVE-2024-0002"));
        assert_eq!(record.description.as_deref(), Some("Stack overflow in the parser"));

        let normalized = record.normalize().unwrap();
        assert_eq!(normalized.published, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(normalized.severity, Some(Severity::Critical));
    }

    #[test]
    fn test_numeric_id_used_when_no_string_spelling() {
        let record: SourceRecord = serde_json::from_str(r#"{"Name": 20240001}"#).unwrap();
        assert_eq!(record.key(), Some("20240001"));

        let record: SourceRecord =
            serde_json::from_str(r#"{"cve_id": "CVE-2024-0003", "id": "CVE-2024-9999"}"#).unwrap();
        assert_eq!(record.key(), Some("CVE-2024-0003"));
    }

    #[test]
    fn test_normalize_marks_malformed_fields_absent() {
        let record = SourceRecord {
            id: Some("  CVE-2024-1  ".to_string()),
            description: Some("   ".to_string()),
            published: Some("not a date".to_string()),
            cvss_score: Some(serde_json::json!(42)),
            severity: Some("UNKNOWN".to_string()),
            cwe_ids: vec![" CWE-79 ".into(), "".into(), "CWE-79".into()],
            source: Some("nvd".to_string()),
        };
        let normalized = record.normalize().unwrap();
        assert_eq!(normalized.id, "CVE-2024-1");
        assert_eq!(normalized.description, None);
        assert_eq!(normalized.published, None);
        assert_eq!(normalized.cvss_score, None);
        assert_eq!(normalized.severity, None);
        assert_eq!(normalized.cwe_ids.len(), 1);
        assert_eq!(normalized.source, Source::Authoritative);
    }

    #[test]
    fn test_blank_id_is_unkeyed() {
        let record = SourceRecord {
            id: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(record.normalize().is_none());
    }
}
