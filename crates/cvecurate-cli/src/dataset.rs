//! JSONL dataset files

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, warn};

/// Records read from one or more JSONL files
#[derive(Debug, Clone)]
pub struct JsonlBatch<T> {
    pub records: Vec<T>,
    /// Lines that failed to parse
    pub skipped: usize,
}

impl<T> Default for JsonlBatch<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
        }
    }
}

impl<T> JsonlBatch<T> {
    fn extend(&mut self, other: JsonlBatch<T>) {
        self.records.extend(other.records);
        self.skipped += other.skipped;
    }
}

/// Read one record per line
///
/// Blank lines are ignored. A line that does not parse is logged with its
/// line number, counted, and skipped.
pub async fn read_jsonl<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<JsonlBatch<T>> {
    let path = path.as_ref();
    let file = File::open(path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut lines = BufReader::new(file).lines();
    let mut batch = JsonlBatch::default();
    let mut line_number = 0usize;

    while let Some(line) = lines
        .next_line()
        .await
        .with_context(|| format!("failed to read {}", path.display()))?
    {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line) {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    line = line_number,
                    error = %e,
                    "Skipping malformed record"
                );
                batch.skipped += 1;
            }
        }
    }

    debug!(
        path = %path.display(),
        records = batch.records.len(),
        skipped = batch.skipped,
        "Read dataset"
    );
    Ok(batch)
}

/// One JSON object; arrays and scalars are rejected
fn parse_line<T: DeserializeOwned>(line: &str) -> serde_json::Result<T> {
    let value: serde_json::Value = serde_json::from_str(line)?;
    if !value.is_object() {
        return Err(serde::de::Error::custom("expected a JSON object"));
    }
    serde_json::from_value(value)
}

/// Read several files, concatenated in the order given
pub async fn read_jsonl_files<T: DeserializeOwned>(paths: &[PathBuf]) -> anyhow::Result<JsonlBatch<T>> {
    let mut batch = JsonlBatch::default();
    for path in paths {
        batch.extend(read_jsonl(path).await?);
    }
    Ok(batch)
}

/// Write one record per line, creating parent directories as needed
pub async fn write_jsonl<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let file = File::create(path)
        .await
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for row in rows {
        let mut line = serde_json::to_vec(row)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
    }
    writer.flush().await?;

    debug!(path = %path.display(), rows = rows.len(), "Wrote dataset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvecurate_core::SourceRecord;

    #[tokio::test]
    async fn test_blank_and_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.jsonl");
        tokio::fs::write(
            &path,
            "{\"cve_id\": \"CVE-2024-0001\"}\n\n   \nnot json\n[1, 2]\n{\"id\": \"CVE-2024-0002\", \"cwe_ids\": \"CWE-79, CWE-89\"}\n",
        )
        .await
        .unwrap();

        let batch: JsonlBatch<SourceRecord> = read_jsonl(&path).await.unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.skipped, 2);
        assert_eq!(batch.records[1].key(), Some("CVE-2024-0002"));
        assert_eq!(batch.records[1].cwe_ids.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_field_spellings_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.jsonl");
        tokio::fs::write(
            &path,
            "{\"id\": 17, \"CVE_ID\": \"CVE-2024-0004\", \"severity\": \"HIGH\", \"cvss_severity\": \"LOW\", \"published\": \"2024-01-02\", \"publish_date\": \"2024\"}\n",
        )
        .await
        .unwrap();

        let batch: JsonlBatch<SourceRecord> = read_jsonl(&path).await.unwrap();
        assert_eq!(batch.skipped, 0);
        assert_eq!(batch.records[0].key(), Some("CVE-2024-0004"));
        assert_eq!(batch.records[0].severity.as_deref(), Some("HIGH"));
        assert_eq!(batch.records[0].published.as_deref(), Some("2024-01-02"));
    }

    #[tokio::test]
    async fn test_write_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/rows.jsonl");
        let rows = vec![SourceRecord {
            id: Some("CVE-2024-0003".to_string()),
            ..SourceRecord::default()
        }];

        write_jsonl(&path, &rows).await.unwrap();
        let batch: JsonlBatch<SourceRecord> = read_jsonl(&path).await.unwrap();
        assert_eq!(batch.records, rows);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result: anyhow::Result<JsonlBatch<SourceRecord>> =
            read_jsonl(dir.path().join("absent.jsonl")).await;
        assert!(result.is_err());
    }
}
