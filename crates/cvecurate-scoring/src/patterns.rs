//! Security keyword matcher

use aho_corasick::AhoCorasick;
use cvecurate_core::{Error, Result};
use std::collections::BTreeSet;

/// Counts distinct configured keywords occurring in a text
///
/// Matching is case-insensitive substring matching using the Aho-Corasick
/// algorithm. Keywords and text are both folded with Unicode lowercasing, so
/// non-ASCII keywords ignore case too. Overlapping keywords ("overflow",
/// "buffer overflow") each count.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    patterns: AhoCorasick,
    keywords: Vec<String>,
}

impl KeywordMatcher {
    /// Create a new matcher; duplicate keywords (ignoring case) are merged
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let ac = AhoCorasick::new(&keywords)
            .map_err(|e| Error::scoring(format!("Failed to build keyword matcher: {}", e)))?;

        Ok(Self {
            patterns: ac,
            keywords,
        })
    }

    /// Number of distinct keywords found in `text`
    pub fn distinct_matches(&self, text: &str) -> usize {
        let folded = text.to_lowercase();
        let mut seen = vec![false; self.keywords.len()];
        let mut count = 0;
        for m in self.patterns.find_overlapping_iter(&folded) {
            let idx = m.pattern().as_usize();
            if !seen[idx] {
                seen[idx] = true;
                count += 1;
            }
        }
        count
    }

    /// Number of distinct configured keywords
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}
