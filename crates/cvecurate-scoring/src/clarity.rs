//! Clarity dimension: description length band with a placeholder penalty

use cvecurate_core::{RawRecord, Result};

use crate::placeholder::PlaceholderDetector;
use crate::scorer::{clamp_unit, DimensionScorer};

const PLACEHOLDER_PENALTY: f64 = 0.2;

/// Clarity band for a description of `len` characters
///
/// Bands are half-open: [100, 1000) scores 1.0, [50, 100) and [1000, 2000)
/// score 0.7, [2000, 5000) scores 0.4, anything else 0.0.
pub fn length_band(len: usize) -> f64 {
    match len {
        100..=999 => 1.0,
        50..=99 | 1000..=1999 => 0.7,
        2000..=4999 => 0.4,
        _ => 0.0,
    }
}

#[derive(Debug, Clone)]
pub struct ClarityScorer {
    placeholders: PlaceholderDetector,
}

impl ClarityScorer {
    pub fn new<I, S>(placeholder_patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            placeholders: PlaceholderDetector::new(placeholder_patterns)?,
        })
    }
}

impl DimensionScorer for ClarityScorer {
    fn score(&self, record: &RawRecord) -> f64 {
        let Some(description) = record.description.as_deref() else {
            return 0.0;
        };

        let mut score = length_band(record.description_chars());
        if self.placeholders.is_placeholder(description) {
            score -= PLACEHOLDER_PENALTY;
        }
        clamp_unit(score)
    }
}
