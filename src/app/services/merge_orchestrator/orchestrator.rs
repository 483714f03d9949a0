//! Sequential per-file merge pipeline

use super::report::{FileOutcome, FileReport, MergeReport};
use crate::app::adapters::filesystem::{discover_csv_files, display_name};
use crate::app::models::{CategoryColorTable, NormalizedRecord, PartialMapping};
use crate::app::services::category_colors::CategoryColorAssigner;
use crate::app::services::column_mapper::{ColumnMapper, ColumnResolver, MappingRequest, Resolution};
use crate::app::services::encoding_detector::EncodingDetector;
use crate::app::services::record_normalizer::RecordNormalizer;
use crate::app::services::tabular_reader::TabularReader;
use crate::config::Config;
use crate::{Error, Result};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Merged records, their colour table and the per-file report
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub records: Vec<NormalizedRecord>,
    pub colors: CategoryColorTable,
    pub report: MergeReport,
}

impl MergeResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One file's contribution before it is folded into the run
struct FileContribution {
    outcome: FileOutcome,
    records: Vec<NormalizedRecord>,
}

impl FileContribution {
    fn excluded(outcome: FileOutcome) -> Self {
        Self {
            outcome,
            records: Vec::new(),
        }
    }
}

/// Drives detection, reading, mapping and normalisation across files
///
/// # Example
///
/// ```rust,no_run
/// use facility_merger::app::services::column_mapper::BatchResolver;
/// use facility_merger::app::services::merge_orchestrator::MergeOrchestrator;
/// use facility_merger::Config;
///
/// # fn example() -> facility_merger::Result<()> {
/// let config = Config::default();
/// let orchestrator = MergeOrchestrator::from_config(&config);
/// let mut resolver = BatchResolver::from_schema(&config.schema);
///
/// let result = orchestrator.run(&config.processing.data_dir, &mut resolver, None)?;
/// println!("Merged {} records", result.records.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MergeOrchestrator {
    detector: EncodingDetector,
    reader: TabularReader,
    mapper: ColumnMapper,
    normalizer: RecordNormalizer,
    colors: CategoryColorAssigner,
    auto_suggest: bool,
}

impl MergeOrchestrator {
    pub fn new(
        detector: EncodingDetector,
        reader: TabularReader,
        mapper: ColumnMapper,
        colors: CategoryColorAssigner,
    ) -> Self {
        Self {
            detector,
            reader,
            mapper,
            normalizer: RecordNormalizer::new(),
            colors,
            auto_suggest: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            EncodingDetector::from_config(&config.processing),
            TabularReader::new(),
            ColumnMapper::new(&config.schema),
            CategoryColorAssigner::from_config(&config.palette),
        )
        .with_auto_suggest(config.processing.auto_suggest)
    }

    /// Offer heuristic suggestions to the resolver (otherwise it sees none)
    pub fn with_auto_suggest(mut self, auto_suggest: bool) -> Self {
        self.auto_suggest = auto_suggest;
        self
    }

    /// Merge every `*.csv` file in `data_dir`
    ///
    /// Fails with `NoInputFiles` when the directory holds no CSV files.
    pub fn run(
        &self,
        data_dir: &Path,
        resolver: &mut dyn ColumnResolver,
        progress: Option<&ProgressBar>,
    ) -> Result<MergeResult> {
        let files = discover_csv_files(data_dir)?;
        if files.is_empty() {
            return Err(Error::no_input_files(data_dir.display().to_string()));
        }
        info!("Found {} CSV files in {}", files.len(), data_dir.display());

        if let Some(pb) = progress {
            pb.set_length(files.len() as u64);
        }

        self.run_files(&files, resolver, progress)
    }

    /// Merge the given files in order
    pub fn run_files(
        &self,
        files: &[PathBuf],
        resolver: &mut dyn ColumnResolver,
        progress: Option<&ProgressBar>,
    ) -> Result<MergeResult> {
        let mut records = Vec::new();
        let mut report = MergeReport::new();

        for (index, path) in files.iter().enumerate() {
            let file_name = display_name(path);
            if let Some(pb) = progress {
                pb.set_message(file_name.clone());
            }

            let contribution = match self.process_file(path, &file_name, resolver) {
                Ok(contribution) => contribution,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Skipping {}: {}", file_name, e);
                    FileContribution::excluded(FileOutcome::Unreadable {
                        reason: e.to_string(),
                    })
                }
            };

            let merged = matches!(contribution.outcome, FileOutcome::Merged { .. });
            records.extend(contribution.records);
            report.push(FileReport::new(file_name.as_str(), contribution.outcome));

            if let Some(pb) = progress {
                pb.inc(1);
            }

            let remaining = files.len() - index - 1;
            if merged && remaining > 0 && !resolver.continue_after(&file_name)? {
                info!("Stopping after {} with {} files left", file_name, remaining);
                report.stopped_early = true;
                break;
            }
        }

        let colors = self.colors.assign(&records);
        info!(
            "Merged {} records from {} of {} files ({} categories)",
            records.len(),
            report.merged_count(),
            files.len(),
            colors.len()
        );

        Ok(MergeResult {
            records,
            colors,
            report,
        })
    }

    fn process_file(
        &self,
        path: &Path,
        file_name: &str,
        resolver: &mut dyn ColumnResolver,
    ) -> Result<FileContribution> {
        let detected = self.detector.detect(path)?;
        let read = self.reader.read(path, &detected)?;

        if read.table.column_count() == 0 {
            return Err(Error::file_unreadable(file_name, "no header row"));
        }

        let suggestions = if self.auto_suggest {
            self.mapper.suggest(&read.table)
        } else {
            PartialMapping::new()
        };

        let request = MappingRequest::new(file_name, &read.encoding, &read.table, &suggestions);
        let mapping = match self.mapper.resolve(&request, resolver)? {
            Resolution::Mapped(mapping) => mapping,
            Resolution::SkipFile => {
                info!("Operator skipped {}", file_name);
                return Ok(FileContribution::excluded(FileOutcome::SkippedByOperator));
            }
            Resolution::Unmapped(fields) => {
                warn!("{}", Error::unmapped_fields(file_name, &fields));
                return Ok(FileContribution::excluded(FileOutcome::Unmapped { fields }));
            }
        };
        debug!("Mapping for {}: {:?}", file_name, mapping);

        let mut normalized = self.normalizer.normalize_table(&read.table, &mapping, file_name);
        normalized.stats.malformed_rows = read.malformed_rows;

        Ok(FileContribution {
            outcome: FileOutcome::Merged {
                encoding: read.encoding,
                had_replacements: read.had_replacements,
                stats: normalized.stats,
            },
            records: normalized.records,
        })
    }
}
