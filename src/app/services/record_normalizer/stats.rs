//! Normalisation statistics

use serde::{Deserialize, Serialize};

/// Per-file counts of kept and dropped rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationStats {
    /// Data rows seen by the normaliser
    pub rows_read: usize,

    /// Records emitted
    pub records_emitted: usize,

    /// Rows the CSV parser rejected before normalisation
    pub malformed_rows: usize,

    /// Rows shorter than the mapping's widest column
    pub short_rows: usize,

    /// Rows dropped for unparseable or out-of-range coordinates
    pub invalid_coordinates: usize,

    /// Rows kept after swapping latitude and longitude
    pub swapped_coordinates: usize,
}

impl NormalizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows dropped for any reason after reading
    pub fn dropped(&self) -> usize {
        self.short_rows + self.invalid_coordinates
    }

    /// Fold another file's counts into this one
    pub fn merge(&mut self, other: &NormalizationStats) {
        self.rows_read += other.rows_read;
        self.records_emitted += other.records_emitted;
        self.malformed_rows += other.malformed_rows;
        self.short_rows += other.short_rows;
        self.invalid_coordinates += other.invalid_coordinates;
        self.swapped_coordinates += other.swapped_coordinates;
    }

    /// Share of read rows that produced records, as a percentage
    pub fn retention_rate(&self) -> f64 {
        if self.rows_read == 0 {
            0.0
        } else {
            (self.records_emitted as f64 / self.rows_read as f64) * 100.0
        }
    }
}
