//! Placeholder description detection

use cvecurate_core::{Error, Result};
use regex::RegexSet;

/// Detects stub descriptions such as reservation or rejection notices
#[derive(Debug, Clone)]
pub struct PlaceholderDetector {
    patterns: RegexSet,
}

impl PlaceholderDetector {
    /// Compile the configured patterns
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = RegexSet::new(patterns)
            .map_err(|e| Error::scoring(format!("Failed to compile placeholder patterns: {}", e)))?;
        Ok(Self { patterns })
    }

    /// Whether any placeholder pattern matches
    pub fn is_placeholder(&self, text: &str) -> bool {
        self.patterns.is_match(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvecurate_core::CurationConfig;

    fn detector() -> PlaceholderDetector {
        PlaceholderDetector::new(&CurationConfig::default().placeholder_patterns).unwrap()
    }

    #[test]
    fn test_reserved_notice() {
        let text = "** RESERVED ** This candidate has been reserved by an organization.";
        assert!(detector().is_placeholder(text));
    }

    #[test]
    fn test_reject_notice() {
        assert!(detector().is_placeholder("** REJECT ** DO NOT USE THIS CANDIDATE NUMBER."));
    }

    #[test]
    fn test_substantive_description() {
        assert!(!detector().is_placeholder(
            "A SQL injection vulnerability in the login form allows remote attackers to read data."
        ));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PlaceholderDetector::new(["(unclosed"]).is_err());
    }
}
