//! Dimension scorer trait and scoring helpers

use cvecurate_core::RawRecord;

/// Decimal places each dimension score is rounded to
pub const DIMENSION_PRECISION: u32 = 4;

/// Trait for the per-dimension quality scorers
///
/// Implementations must be pure: the score depends only on the record and
/// the scorer's own configuration, never on wall-clock time, randomness, or
/// other records.
pub trait DimensionScorer: Send + Sync {
    /// Score the record; the result lies in [0, 1]
    fn score(&self, record: &RawRecord) -> f64;
}

/// Clamp a summed contribution into [0, 1]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Round half away from zero to a fixed number of decimal places
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
