use serde::{Deserialize, Serialize};

/// Summary of one batch-generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub requested: usize,
    pub generated: usize,
    /// Combinations accepted as repeats after retry exhaustion.
    pub duplicates_tolerated: usize,
    /// Total re-draws spent chasing uniqueness.
    pub retries: u64,
}

impl BatchReport {
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            generated: 0,
            duplicates_tolerated: 0,
            retries: 0,
        }
    }

    pub fn record_generated(&mut self) {
        self.generated += 1;
    }

    pub fn record_retry(&mut self) {
        self.retries += 1;
    }

    pub fn record_duplicate(&mut self) {
        self.duplicates_tolerated += 1;
    }
}
