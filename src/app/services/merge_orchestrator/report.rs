//! Merge run reporting

use crate::app::models::TargetField;
use crate::app::services::record_normalizer::NormalizationStats;

/// What happened to one input file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Rows were normalised and appended to the merged set
    Merged {
        encoding: String,
        had_replacements: bool,
        stats: NormalizationStats,
    },
    /// Operator entered the skip keyword
    SkippedByOperator,
    /// Required fields had no source columns
    Unmapped { fields: Vec<TargetField> },
    /// File could not be read
    Unreadable { reason: String },
}

impl FileOutcome {
    /// Short label for summaries
    pub fn label(&self) -> &'static str {
        match self {
            FileOutcome::Merged { .. } => "merged",
            FileOutcome::SkippedByOperator => "skipped",
            FileOutcome::Unmapped { .. } => "unmapped",
            FileOutcome::Unreadable { .. } => "unreadable",
        }
    }

    pub fn stats(&self) -> Option<&NormalizationStats> {
        match self {
            FileOutcome::Merged { stats, .. } => Some(stats),
            _ => None,
        }
    }
}

/// Outcome for one file, in processing order
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub file_name: String,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn new(file_name: impl Into<String>, outcome: FileOutcome) -> Self {
        Self {
            file_name: file_name.into(),
            outcome,
        }
    }
}

/// Per-file outcomes for a whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    pub files: Vec<FileReport>,

    /// Operator declined to continue before every file was processed
    pub stopped_early: bool,
}

impl MergeReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, report: FileReport) {
        self.files.push(report);
    }

    pub fn merged_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Merged { .. }))
    }

    /// Files excluded by the operator or for unmapped fields
    pub fn skipped_count(&self) -> usize {
        self.count(|outcome| {
            matches!(
                outcome,
                FileOutcome::SkippedByOperator | FileOutcome::Unmapped { .. }
            )
        })
    }

    pub fn unreadable_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Unreadable { .. }))
    }

    /// Normalisation counts summed over merged files
    pub fn totals(&self) -> NormalizationStats {
        let mut totals = NormalizationStats::new();
        for stats in self.files.iter().filter_map(|file| file.outcome.stats()) {
            totals.merge(stats);
        }
        totals
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files
            .iter()
            .filter(|file| predicate(&file.outcome))
            .count()
    }
}
