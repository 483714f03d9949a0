//! Record normalisation from raw rows to the fixed target schema
//!
//! This module turns one raw row plus the file's column mapping into a
//! [`NormalizedRecord`](crate::app::models::NormalizedRecord), applying the
//! cleaning rules shared by every source layout.
//!
//! ## Architecture
//!
//! - [`extraction`] - concatenating mapped cells into trimmed field values
//! - [`coordinates`] - numeric coercion, combined-pair splitting and swap repair
//! - [`normalizer`] - per-row and per-table orchestration
//! - [`stats`] - counts of kept and dropped rows
//!
//! ## Dropped rows
//!
//! Rows shorter than the mapping's widest column and rows whose coordinates
//! are still out of range after swap repair are dropped silently; only the
//! aggregate counts in [`NormalizationStats`] report them.

pub mod coordinates;
pub mod extraction;
pub mod normalizer;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use coordinates::{CoordinateRepair, coerce_number, repair_coordinates, split_pair};
pub use extraction::extract_value;
pub use normalizer::{NormalizedFile, RecordNormalizer, RowRejection};
pub use stats::NormalizationStats;
