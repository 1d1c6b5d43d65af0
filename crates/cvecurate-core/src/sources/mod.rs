//! Source document adapters
//!
//! Adapters turn documents saved by ingestion collaborators into
//! [`SourceRecord`](crate::ingest::SourceRecord)s. They never fetch anything.

pub mod nvd;

pub use nvd::{NvdFeedAdapter, NVD_SOURCE_TAG};
