//! Temporal decontamination against a knowledge cutoff

use chrono::NaiveDate;
use cvecurate_core::{AbsentDatePolicy, DecontaminationConfig, RawRecord};

/// Flags records published after the cutoff date
#[derive(Debug, Clone, Copy)]
pub struct Decontaminator {
    cutoff: NaiveDate,
    absent_date_policy: AbsentDatePolicy,
}

impl Decontaminator {
    pub fn new(config: DecontaminationConfig) -> Self {
        Self {
            cutoff: config.cutoff_date,
            absent_date_policy: config.absent_date_policy,
        }
    }

    pub fn cutoff(&self) -> NaiveDate {
        self.cutoff
    }

    /// `published > cutoff`; records without a date follow the absent-date policy
    pub fn is_flagged(&self, record: &RawRecord) -> bool {
        match record.published {
            Some(published) => published > self.cutoff,
            None => self.absent_date_policy == AbsentDatePolicy::Flagged,
        }
    }
}
