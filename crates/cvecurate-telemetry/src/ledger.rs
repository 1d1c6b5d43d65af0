//! Hash-chained run ledger
//!
//! Each stage of a run appends one entry holding the stage name, the number
//! of records it produced, and a SHA-256 digest over canonical lines for
//! those records. Entries are chained through their hashes, so editing any
//! entry breaks every later link. Digests never cover wall-clock metadata,
//! which makes two runs over the same input and configuration produce the
//! same chain.

use cvecurate_core::{Result, ScoredRecord};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// One stage of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub stage: String,
    pub count: usize,
    /// Digest of the stage output
    pub digest: String,
    pub previous_hash: Option<String>,
    pub hash: String,
}

/// Ledger of the stages of a single run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLedger {
    /// Random id; not part of any hash
    pub run_id: String,
    pub pipeline_version: String,
    entries: Vec<LedgerEntry>,
}

impl RunLedger {
    /// Start a ledger with a fresh run id
    pub fn new(pipeline_version: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            pipeline_version: pipeline_version.into(),
            entries: Vec::new(),
        }
    }

    /// Append a stage whose output is described by `lines`, in output order
    pub fn append<I, S>(&mut self, stage: impl Into<String>, lines: I) -> &LedgerEntry
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hasher = Sha256::new();
        let mut count = 0;
        for line in lines {
            hasher.update(line.as_ref().as_bytes());
            hasher.update(b"\n");
            count += 1;
        }

        let mut entry = LedgerEntry {
            stage: stage.into(),
            count,
            digest: format!("{:x}", hasher.finalize()),
            previous_hash: self.head().map(str::to_string),
            hash: String::new(),
        };
        entry.hash = Self::compute_hash(&self.pipeline_version, &entry);
        debug!(stage = %entry.stage, count, hash = %entry.hash, "Ledger entry appended");

        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Append a stage of scored records
    pub fn append_scored<'a>(
        &mut self,
        stage: impl Into<String>,
        records: impl IntoIterator<Item = &'a ScoredRecord>,
    ) -> &LedgerEntry {
        self.append(stage, records.into_iter().map(scored_line))
    }

    /// Verify the integrity of the chain
    pub fn verify(&self) -> bool {
        let mut prev_hash: Option<&str> = None;

        for entry in &self.entries {
            if entry.previous_hash.as_deref() != prev_hash {
                return false;
            }
            if entry.hash != Self::compute_hash(&self.pipeline_version, entry) {
                return false;
            }
            prev_hash = Some(&entry.hash);
        }

        true
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Hash of the last entry
    pub fn head(&self) -> Option<&str> {
        self.entries.last().map(|e| e.hash.as_str())
    }

    /// Write as pretty JSON
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn compute_hash(pipeline_version: &str, entry: &LedgerEntry) -> String {
        let mut hasher = Sha256::new();

        hasher.update(pipeline_version.as_bytes());
        hasher.update(entry.stage.as_bytes());
        hasher.update(entry.count.to_le_bytes());
        hasher.update(entry.digest.as_bytes());
        if let Some(ref prev) = entry.previous_hash {
            hasher.update(prev.as_bytes());
        }

        format!("{:x}", hasher.finalize())
    }
}

/// Canonical ledger line for a scored record: id and score fields only
pub fn scored_line(record: &ScoredRecord) -> String {
    let s = &record.scores;
    format!(
        "{}|{:.4}|{:.4}|{:.4}|{:.4}|{:.4}|{}",
        record.id(),
        s.relevance_score,
        s.completeness_score,
        s.source_credibility_score,
        s.clarity_score,
        record.composite_score,
        record.training_ready
    )
}
