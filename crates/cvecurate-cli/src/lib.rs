//! cvecurate command-line driver
//!
//! File handling around the curation engine: layered configuration, JSONL
//! datasets, and the `import-nvd`, `score`, `filter`, and `run` commands.
//! The binary in `main.rs` only parses arguments and wires logging and
//! metrics.

pub mod commands;
pub mod config;
pub mod dataset;

pub use commands::{RunReport, STREAM_EXTENSION};
pub use config::{ConfigLoader, ConfigOverrides, DEFAULT_CONFIG_PATH, ENV_PREFIX};
pub use dataset::{read_jsonl, read_jsonl_files, write_jsonl, JsonlBatch};
