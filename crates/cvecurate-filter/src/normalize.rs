//! Normalization and authority-based deduplication

use cvecurate_core::{RawRecord, SourceRecord};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Result of normalizing a batch
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    /// One record per distinct id, in first-seen order
    pub records: Vec<RawRecord>,

    /// Number of records dropped in favor of another with the same id
    pub duplicates_resolved: usize,

    /// Records without a usable id
    pub unkeyed: Vec<SourceRecord>,
}

/// Turns source records into canonical records, one per id
///
/// When several records share an id, the one from the most authoritative
/// source is kept; among equally authoritative records the first wins. The
/// surviving record takes the position where its id was first seen.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize and deduplicate a batch of source records
    pub fn normalize<I>(&self, input: I) -> NormalizeOutcome
    where
        I: IntoIterator<Item = SourceRecord>,
    {
        let mut keyed = Vec::new();
        let mut unkeyed = Vec::new();

        for source in input {
            match source.normalize() {
                Some(record) => keyed.push(record),
                None => unkeyed.push(source),
            }
        }

        if !unkeyed.is_empty() {
            warn!(count = unkeyed.len(), "Records without an id set aside");
        }

        let (records, duplicates_resolved) = self.deduplicate(keyed);
        info!(
            records = records.len(),
            duplicates_resolved,
            unkeyed = unkeyed.len(),
            "Normalization complete"
        );

        NormalizeOutcome {
            records,
            duplicates_resolved,
            unkeyed,
        }
    }

    /// Keep one record per id, preferring higher authority
    ///
    /// Returns the surviving records and the number dropped.
    pub fn deduplicate(&self, records: Vec<RawRecord>) -> (Vec<RawRecord>, usize) {
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(records.len());
        let mut kept: Vec<RawRecord> = Vec::with_capacity(records.len());
        let mut dropped = 0;

        for record in records {
            match positions.entry(record.id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(kept.len());
                    kept.push(record);
                }
                Entry::Occupied(slot) => {
                    dropped += 1;
                    let existing = &mut kept[*slot.get()];
                    if record.source > existing.source {
                        debug!(
                            id = %record.id,
                            kept = %record.source,
                            replaced = %existing.source,
                            "Duplicate resolved by authority"
                        );
                        *existing = record;
                    }
                }
            }
        }

        (kept, dropped)
    }
}
