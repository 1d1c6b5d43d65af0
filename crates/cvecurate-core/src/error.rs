//! Error types for cvecurate

/// Result type alias using cvecurate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cvecurate operations
///
/// Sparse or malformed records are not errors: they degrade to absent
/// fields or zero scores. Errors are reserved for conditions that make a
/// run meaningless, chiefly an invalid configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors (fatal at startup)
    #[error("configuration error: {0}")]
    Config(String),

    /// Source document could not be interpreted at all
    #[error("source error: {0}")]
    Source(String),

    /// Scoring setup errors
    #[error("scoring error: {0}")]
    Scoring(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new source error
    pub fn source_doc(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a new scoring error
    pub fn scoring(msg: impl Into<String>) -> Self {
        Self::Scoring(msg.into())
    }

    /// Whether this error came from configuration validation
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("weights sum to 0.9");
        assert_eq!(err.to_string(), "configuration error: weights sum to 0.9");
        assert!(err.is_config());

        let err = Error::scoring("bad keyword set");
        assert!(!err.is_config());
    }
}
