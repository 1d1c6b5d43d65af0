//! Layered configuration loading
//!
//! Layers, lowest precedence first:
//! 1. Defaults of [`CurationConfig`]
//! 2. YAML file (`cvecurate.yaml` unless `--config` names another)
//! 3. Environment variables `CVECURATE__SECTION__KEY`
//! 4. Command-line overrides
//!
//! The merged configuration is validated once before it is returned.

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use config::{Config, Environment, File, FileFormat};
use cvecurate_core::{AbsentDatePolicy, CurationConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file read when `--config` is not given; optional
pub const DEFAULT_CONFIG_PATH: &str = "cvecurate.yaml";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "CVECURATE";

const ENV_SEPARATOR: &str = "__";

/// Command-line overrides, applied after file and environment
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// Knowledge cutoff date; records published after it are quarantined
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    pub cutoff: Option<NaiveDate>,

    /// Default per-severity sampling quota
    #[arg(long, global = true, value_name = "N")]
    pub quota: Option<usize>,

    /// Minimum composite score for the review tier
    #[arg(long, global = true, value_name = "SCORE")]
    pub review_threshold: Option<f64>,

    /// Treatment of records without a publication date (flagged or unflagged)
    #[arg(long, global = true, value_name = "POLICY")]
    pub absent_date_policy: Option<AbsentDatePolicy>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut CurationConfig) {
        if let Some(cutoff) = self.cutoff {
            config.decontamination.cutoff_date = cutoff;
        }
        if let Some(quota) = self.quota {
            config.sampling.default_quota = quota;
        }
        if let Some(review) = self.review_threshold {
            config.thresholds.review = review;
        }
        if let Some(policy) = self.absent_date_policy {
            config.decontamination.absent_date_policy = policy;
        }
    }
}

/// Builds the effective [`CurationConfig`]
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    env: Option<config::Map<String, String>>,
}

impl ConfigLoader {
    /// Loader for an explicit config file, or the optional default file
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path, env: None }
    }

    /// Read variables from `vars` instead of the process environment
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Merge every layer and validate the result
    ///
    /// An explicitly named file must exist; the default file may be absent.
    pub fn load(&self, overrides: &ConfigOverrides) -> anyhow::Result<CurationConfig> {
        let (path, required) = match &self.path {
            Some(path) => (path.as_path(), true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };
        debug!(path = %path.display(), required, "Loading configuration");

        let layered = Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .source(self.env.clone()),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;

        let mut config: CurationConfig = layered
            .try_deserialize()
            .context("configuration has an invalid shape")?;

        overrides.apply(&mut config);
        config.validate()?;

        info!(
            path = %path.display(),
            cutoff = %config.decontamination.cutoff_date,
            training_threshold = config.thresholds.training,
            review_threshold = config.thresholds.review,
            default_quota = config.sampling.default_quota,
            "Configuration loaded"
        );
        Ok(config)
    }
}
