//! Structural validity gate applied before scoring

use cvecurate_core::{DescriptionBounds, RawRecord};
use std::fmt;

/// Outcome of the hard filter for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardFilterOutcome {
    /// Description present and within bounds
    Pass,
    /// No description (missing or blank)
    MissingDescription,
    /// Description shorter than `min_len` characters
    TooShort { len: usize, min_len: usize },
    /// Description longer than `max_len` characters
    TooLong { len: usize, max_len: usize },
}

impl HardFilterOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl fmt::Display for HardFilterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::MissingDescription => write!(f, "description missing or empty"),
            Self::TooShort { len, min_len } => {
                write!(f, "description too short ({} < {} chars)", len, min_len)
            }
            Self::TooLong { len, max_len } => {
                write!(f, "description too long ({} > {} chars)", len, max_len)
            }
        }
    }
}

/// Rejects records whose description is absent or outside the length bounds
///
/// Failing records are not dropped: the composite scorer gives them a fixed
/// all-zero outcome.
#[derive(Debug, Clone, Copy)]
pub struct HardFilter {
    bounds: DescriptionBounds,
}

impl HardFilter {
    pub fn new(bounds: DescriptionBounds) -> Self {
        Self { bounds }
    }

    /// Check a record against the description bounds
    pub fn check(&self, record: &RawRecord) -> HardFilterOutcome {
        if record.description.is_none() {
            return HardFilterOutcome::MissingDescription;
        }

        let len = record.description_chars();
        if len < self.bounds.min_len {
            HardFilterOutcome::TooShort {
                len,
                min_len: self.bounds.min_len,
            }
        } else if len > self.bounds.max_len {
            HardFilterOutcome::TooLong {
                len,
                max_len: self.bounds.max_len,
            }
        } else {
            HardFilterOutcome::Pass
        }
    }
}

impl Default for HardFilter {
    fn default() -> Self {
        Self::new(DescriptionBounds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvecurate_core::Source;

    fn record(description: &str) -> RawRecord {
        RawRecord::new("CVE-2024-0001", description, Source::Authoritative)
    }

    #[test]
    fn test_missing_description() {
        let filter = HardFilter::default();
        assert_eq!(filter.check(&record("")), HardFilterOutcome::MissingDescription);
        assert_eq!(filter.check(&record("   ")), HardFilterOutcome::MissingDescription);
    }

    #[test]
    fn test_bounds_are_closed() {
        let filter = HardFilter::default();
        assert!(filter.check(&record(&"a".repeat(50))).passed());
        assert!(filter.check(&record(&"a".repeat(5000))).passed());
        assert_eq!(
            filter.check(&record(&"a".repeat(49))),
            HardFilterOutcome::TooShort { len: 49, min_len: 50 }
        );
        assert_eq!(
            filter.check(&record(&"a".repeat(5001))),
            HardFilterOutcome::TooLong { len: 5001, max_len: 5000 }
        );
    }

    #[test]
    fn test_length_counts_characters() {
        let filter = HardFilter::new(DescriptionBounds { min_len: 5, max_len: 5 });
        assert!(filter.check(&record("ééééé")).passed());
    }

    #[test]
    fn test_outcome_display() {
        let outcome = HardFilterOutcome::TooShort { len: 10, min_len: 50 };
        assert_eq!(outcome.to_string(), "description too short (10 < 50 chars)");
    }
}
