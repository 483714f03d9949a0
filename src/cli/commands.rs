//! Command implementation for the facility merger CLI
//!
//! This module contains the complete workflow: logging and configuration
//! setup, the merge itself (interactive or batch), writing the output
//! artifacts and the final summary.

use crate::app::services::column_mapper::BatchResolver;
use crate::app::services::merge_orchestrator::{FileOutcome, MergeOrchestrator, MergeReport, MergeResult};
use crate::app::services::output_writer::{build_map_payload, write_csv, write_map_payload};
use crate::cli::args::Args;
use crate::cli::input::InteractiveResolver;
use crate::config::Config;
use crate::{Error, Result};
use anyhow::Context;
use colored::*;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What a run produced, for the final report
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub report: MergeReport,
    pub records_written: usize,
    pub categories: usize,
    /// Merged CSV path, absent when nothing was collected
    pub csv_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
    pub processing_time: Duration,
}

/// Main command runner
///
/// 1. Set up logging and configuration
/// 2. Merge every input file (prompting the operator unless in batch mode)
/// 3. Write the merged CSV and optional JSON payload
/// 4. Print the summary
pub async fn run(args: Args) -> Result<RunSummary> {
    let start_time = Instant::now();

    setup_logging(&args)?;
    info!("Starting facility merger");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let config = load_configuration(&args)?;
    debug!("Loaded configuration: {:?}", config);

    let mut summary = execute(config, args.show_progress()).await?;
    summary.processing_time = start_time.elapsed();

    if !args.quiet {
        print_summary(&summary);
    }

    Ok(summary)
}

/// [`run`] with the failure wrapped for top-level reporting
pub async fn run_with_context(args: Args) -> anyhow::Result<RunSummary> {
    run(args).await.context("Facility merge failed")
}

/// Merge and write outputs for a fully resolved configuration
///
/// The merge runs on a blocking thread because interactive mapping waits on
/// stdin for as long as the operator takes.
pub async fn execute(config: Config, show_progress: bool) -> Result<RunSummary> {
    let merge_config = config.clone();
    let result = tokio::task::spawn_blocking(move || merge(&merge_config, show_progress))
        .await
        .map_err(|e| Error::processing_interrupted(format!("Merge task failed: {}", e)))??;

    let mut summary = RunSummary {
        categories: result.colors.len(),
        ..RunSummary::default()
    };

    if result.is_empty() {
        warn!("No records collected; no output written");
        summary.report = result.report;
        return Ok(summary);
    }

    write_outputs(&config, &result)?;

    summary.records_written = result.records.len();
    summary.csv_path = Some(config.output.csv_path.clone());
    summary.json_path = config.output.json_path.clone();
    summary.report = result.report;
    Ok(summary)
}

fn merge(config: &Config, show_progress: bool) -> Result<MergeResult> {
    let orchestrator = MergeOrchestrator::from_config(config);
    let data_dir = &config.processing.data_dir;

    if config.processing.interactive {
        let mut resolver = InteractiveResolver::stdio(config.processing.preview_rows);
        let auto_suggest = config.processing.auto_suggest
            && resolver.confirm("Enable automatic column pre-selection?", true)?;
        info!("Automatic column pre-selection: {}", auto_suggest);

        return orchestrator
            .with_auto_suggest(auto_suggest)
            .run(data_dir, &mut resolver, None);
    }

    if !config.processing.auto_suggest {
        warn!("Batch mode without suggestions cannot map required fields; every file will be skipped");
    }

    let mut resolver = BatchResolver::from_schema(&config.schema);
    let progress = show_progress.then(|| create_progress_bar(0, "Merging files"));
    let result = orchestrator.run(data_dir, &mut resolver, progress.as_ref());

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    result
}

fn write_outputs(config: &Config, result: &MergeResult) -> Result<()> {
    let csv_path = &config.output.csv_path;
    if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::io(format!("Failed to create output directory {}", parent.display()), e)
        })?;
    }
    write_csv(csv_path, &result.records, &config.schema)?;

    if let Some(json_path) = &config.output.json_path {
        let payload = build_map_payload(&result.records, &result.colors, config.output.map_center);
        write_map_payload(json_path, &payload)?;
    }
    Ok(())
}

/// Set up structured logging
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("facility_merger={}", log_level)));

    // An already installed subscriber (a second run in the same process) is kept
    let init = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if let Err(e) = init {
        debug!("Keeping existing logging subscriber: {}", e);
        return Ok(());
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (defaults -> file -> env -> args)
pub fn load_configuration(args: &Args) -> Result<Config> {
    let default_config_path = if args.config_file.is_none() {
        Config::default_config_path().ok()
    } else {
        None
    };

    let config_file = match &args.config_file {
        Some(path) => Some(path.as_path()),
        None => default_config_path
            .as_ref()
            .filter(|path| path.exists())
            .map(|path| path.as_path()),
    };

    if let Some(config_path) = config_file {
        info!("Using config file: {}", config_path.display());
    } else {
        debug!("No config file found, using defaults and environment variables");
    }

    let mut config = Config::load_layered(config_file)?;
    apply_cli_overrides(&mut config, args);
    config.validate()?;

    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut Config, args: &Args) {
    if let Some(data_dir) = &args.data_dir {
        config.processing.data_dir = data_dir.clone();
    }
    if let Some(output) = &args.output {
        config.output.csv_path = output.clone();
    }
    if let Some(json) = &args.json {
        config.output.json_path = Some(json.clone());
    }

    if args.batch {
        config.processing.interactive = false;
    }
    if args.no_suggest {
        config.processing.auto_suggest = false;
    }
    if args.no_category {
        config.schema.include_category = false;
    }
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// One summary line for a file
pub fn describe_outcome(outcome: &FileOutcome) -> String {
    match outcome {
        FileOutcome::Merged {
            encoding,
            had_replacements,
            stats,
        } => {
            let mut line = format!(
                "{} rows read, {} kept, {} dropped ({})",
                stats.rows_read,
                stats.records_emitted,
                stats.dropped(),
                encoding
            );
            if stats.swapped_coordinates > 0 {
                line.push_str(&format!(", {} swapped", stats.swapped_coordinates));
            }
            if stats.malformed_rows > 0 {
                line.push_str(&format!(", {} malformed", stats.malformed_rows));
            }
            if *had_replacements {
                line.push_str(", undecodable bytes replaced");
            }
            line
        }
        FileOutcome::SkippedByOperator => "skipped by operator".to_string(),
        FileOutcome::Unmapped { fields } => {
            let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
            format!("no columns for {}", names.join(", "))
        }
        FileOutcome::Unreadable { reason } => reason.clone(),
    }
}

fn print_summary(summary: &RunSummary) {
    let report = &summary.report;

    println!();
    println!("{}", "Merge summary".bright_green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for file in &report.files {
        let label = match &file.outcome {
            FileOutcome::Merged { .. } => file.outcome.label().green(),
            FileOutcome::Unreadable { .. } => file.outcome.label().red(),
            _ => file.outcome.label().yellow(),
        };
        println!(
            "   • {} [{}] {}",
            file.file_name.bright_cyan(),
            label,
            describe_outcome(&file.outcome)
        );
    }

    let totals = report.totals();
    println!();
    println!(
        "   Files: {} merged, {} skipped, {} unreadable",
        report.merged_count(),
        report.skipped_count(),
        report.unreadable_count()
    );
    println!(
        "   Rows: {} read, {} kept ({:.1}%)",
        totals.rows_read,
        totals.records_emitted,
        totals.retention_rate()
    );
    if report.stopped_early {
        println!("   {}", "Stopped early at operator request".yellow());
    }

    match &summary.csv_path {
        Some(csv_path) => {
            println!(
                "   Wrote {} records ({} categories) to {}",
                summary.records_written,
                summary.categories,
                csv_path.display()
            );
            if let Some(json_path) = &summary.json_path {
                println!("   Map payload: {}", json_path.display());
            }
        }
        None => println!("{}", "No data collected".yellow().bold()),
    }

    println!(
        "   Processing time: {}",
        HumanDuration(summary.processing_time)
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::TargetField;
    use crate::app::services::record_normalizer::NormalizationStats;
    use crate::constants::UTF8_BOM;
    use tempfile::TempDir;

    fn batch_config(data_dir: PathBuf, out_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.processing.data_dir = data_dir;
        config.processing.interactive = false;
        config.processing.statistical_detection = false;
        config.output.csv_path = out_dir.path().join("merged.csv");
        config.output.json_path = Some(out_dir.path().join("map.json"));
        config
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();
        let args = Args {
            data_dir: Some(PathBuf::from("/srv/opendata")),
            output: Some(PathBuf::from("out.csv")),
            json: Some(PathBuf::from("map.json")),
            batch: true,
            no_suggest: true,
            no_category: true,
            ..Args::default()
        };

        apply_cli_overrides(&mut config, &args);

        assert_eq!(config.processing.data_dir, PathBuf::from("/srv/opendata"));
        assert_eq!(config.output.csv_path, PathBuf::from("out.csv"));
        assert_eq!(config.output.json_path, Some(PathBuf::from("map.json")));
        assert!(!config.processing.interactive);
        assert!(!config.processing.auto_suggest);
        assert!(!config.schema.include_category);
    }

    #[test]
    fn test_overrides_leave_unset_values() {
        let mut config = Config::default();
        apply_cli_overrides(&mut config, &Args::default());

        assert!(config.processing.interactive);
        assert!(config.processing.auto_suggest);
        assert!(config.output.json_path.is_none());
    }

    #[test]
    fn test_load_configuration_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[processing]\npreview_rows = 2\n").unwrap();

        let args = Args {
            config_file: Some(config_path),
            batch: true,
            ..Args::default()
        };
        let config = load_configuration(&args).unwrap();

        assert_eq!(config.processing.preview_rows, 2);
        assert!(!config.processing.interactive);
    }

    #[test]
    fn test_describe_outcomes() {
        let merged = FileOutcome::Merged {
            encoding: "cp932".to_string(),
            had_replacements: true,
            stats: NormalizationStats {
                rows_read: 10,
                records_emitted: 7,
                short_rows: 2,
                invalid_coordinates: 1,
                swapped_coordinates: 3,
                ..NormalizationStats::default()
            },
        };
        assert_eq!(
            describe_outcome(&merged),
            "10 rows read, 7 kept, 3 dropped (cp932), 3 swapped, undecodable bytes replaced"
        );

        let with_malformed = FileOutcome::Merged {
            encoding: "utf-8".to_string(),
            had_replacements: false,
            stats: NormalizationStats {
                rows_read: 2,
                records_emitted: 2,
                malformed_rows: 1,
                ..NormalizationStats::default()
            },
        };
        assert_eq!(
            describe_outcome(&with_malformed),
            "2 rows read, 2 kept, 0 dropped (utf-8), 1 malformed"
        );

        let unmapped = FileOutcome::Unmapped {
            fields: vec![TargetField::Name, TargetField::Latitude],
        };
        assert_eq!(describe_outcome(&unmapped), "no columns for name, latitude");
    }

    #[tokio::test]
    async fn test_batch_execute_writes_outputs() {
        let data_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        std::fs::write(
            data_dir.path().join("parks.csv"),
            "名称,所在地,緯度,経度,種別\n中央公園,新宿区,35.69,139.69,公園\n",
        )
        .unwrap();

        let config = batch_config(data_dir.path().to_path_buf(), &out_dir);
        let summary = execute(config, false).await.unwrap();

        assert_eq!(summary.records_written, 1);
        assert_eq!(summary.categories, 1);
        assert_eq!(summary.report.merged_count(), 1);

        let csv = std::fs::read(out_dir.path().join("merged.csv")).unwrap();
        assert!(csv.starts_with(UTF8_BOM));
        assert!(out_dir.path().join("map.json").exists());
    }

    #[tokio::test]
    async fn test_no_records_writes_nothing() {
        let data_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        std::fs::write(data_dir.path().join("notes.csv"), "memo\nhello\n").unwrap();

        let config = batch_config(data_dir.path().to_path_buf(), &out_dir);
        let summary = execute(config, false).await.unwrap();

        assert!(summary.csv_path.is_none());
        assert_eq!(summary.report.skipped_count(), 1);
        assert!(!out_dir.path().join("merged.csv").exists());
        assert!(!out_dir.path().join("map.json").exists());
    }

    #[test]
    fn test_setup_logging_tolerates_repeat_calls() {
        let args = Args::default();
        assert!(setup_logging(&args).is_ok());
        assert!(setup_logging(&args).is_ok());
    }

    #[tokio::test]
    async fn test_run_failure_carries_context() {
        let args = Args {
            data_dir: Some(PathBuf::from("/nonexistent/opendata")),
            quiet: true,
            ..Args::default()
        };

        let error = run_with_context(args).await.unwrap_err();
        let rendered = format!("{:#}", error);

        assert!(rendered.starts_with("Facility merge failed: Configuration error"));
        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_directory_is_fatal() {
        let data_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();

        let config = batch_config(data_dir.path().to_path_buf(), &out_dir);
        let result = execute(config, false).await;

        assert!(matches!(result, Err(Error::NoInputFiles { .. })));
    }
}
