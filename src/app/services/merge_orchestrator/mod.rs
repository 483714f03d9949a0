//! Directory-level merge of facility CSV files
//!
//! The orchestrator drives every other pipeline stage across a directory:
//! detect encoding, read, map columns, normalise rows, then compute the
//! category colour table once over the merged set.
//!
//! ## Architecture
//!
//! - [`orchestrator`] - the sequential per-file pipeline
//! - [`report`] - per-file outcomes and run totals
//!
//! ## Failure policy
//!
//! A file that cannot be read is reported and skipped. A file the operator
//! skips, or whose required fields stay unmapped, is excluded without being
//! an error. Only fatal errors (an interrupt) abort the run.

pub mod orchestrator;
pub mod report;

#[cfg(test)]
pub mod tests;

pub use orchestrator::{MergeOrchestrator, MergeResult};
pub use report::{FileOutcome, FileReport, MergeReport};
