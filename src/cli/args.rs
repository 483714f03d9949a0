//! Command-line argument definitions for the facility merger
//!
//! This module defines the CLI surface using the clap derive API. Every flag
//! here overrides the matching configuration value after the config file and
//! environment variables have been applied.

use crate::{Error, Result};
use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the facility merger
///
/// Normalises Japanese public-facility CSV files with mixed encodings and
/// column layouts into one merged CSV, optionally with a JSON map payload.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "facility-merger",
    version,
    about = "Merge Japanese public-facility CSV files into one normalised dataset",
    long_about = "Detects each CSV file's encoding (UTF-8, UTF-8 with BOM, Shift-JIS family), \
                  maps its columns onto name/address/url/latitude/longitude/category either \
                  interactively or from header patterns, repairs swapped coordinates and writes \
                  a single UTF-8 CSV plus an optional JSON payload for a web map."
)]
pub struct Args {
    /// Directory containing the input CSV files
    ///
    /// Only `*.csv` files directly inside the directory are merged, in file
    /// name order. Defaults to ./data.
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Merged CSV output path
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Merged CSV output path [default: public_facilities_merged.csv]"
    )]
    pub output: Option<PathBuf>,

    /// Also write the JSON map payload to this path
    #[arg(long = "json", value_name = "FILE", help = "Write the JSON map payload")]
    pub json: Option<PathBuf>,

    /// Accept suggested mappings without prompting
    ///
    /// Files missing a required field (name, latitude) are skipped and
    /// reported instead of being asked about.
    #[arg(
        long = "batch",
        help = "Accept header-based mappings without prompting"
    )]
    pub batch: bool,

    /// Disable header-based column pre-selection
    #[arg(
        long = "no-suggest",
        help = "Do not pre-select columns from header names"
    )]
    pub no_suggest: bool,

    /// Drop the category field (park-only layout)
    #[arg(
        long = "no-category",
        help = "Omit the category field and colour table"
    )]
    pub no_category: bool,

    /// Path to configuration file
    ///
    /// TOML configuration file for schema patterns, palette and defaults.
    /// If not specified, looks for ~/.config/facility-merger/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Args {
    /// Validate the arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(data_dir) = &self.data_dir {
            if !data_dir.is_dir() {
                return Err(Error::configuration(format!(
                    "Data directory does not exist: {}",
                    data_dir.display()
                )));
            }
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if let (Some(output), Some(json)) = (&self.output, &self.json) {
            if output == json {
                return Err(Error::configuration(
                    "CSV and JSON outputs cannot share a path",
                ));
            }
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Whether to draw a progress bar (batch runs only, never when quiet)
    pub fn show_progress(&self) -> bool {
        self.batch && !self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::try_parse_from([
            "facility-merger",
            "opendata",
            "-o",
            "merged.csv",
            "--json",
            "map.json",
            "--batch",
            "--no-category",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.data_dir, Some(PathBuf::from("opendata")));
        assert_eq!(args.output, Some(PathBuf::from("merged.csv")));
        assert_eq!(args.json, Some(PathBuf::from("map.json")));
        assert!(args.batch);
        assert!(args.no_category);
        assert!(!args.no_suggest);
        assert_eq!(args.get_log_level(), "debug");
        assert!(args.show_progress());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["facility-merger"]).unwrap();
        assert!(args.data_dir.is_none());
        assert_eq!(args.get_log_level(), "warn");
        assert!(!args.show_progress());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["facility-merger", "-q", "-v"]).is_err());

        let args = Args::try_parse_from(["facility-merger", "-q", "--batch"]).unwrap();
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }

    #[test]
    fn test_validate_rejects_missing_paths() {
        let args = Args {
            data_dir: Some(PathBuf::from("/nonexistent/data")),
            ..Args::default()
        };
        assert!(matches!(args.validate(), Err(Error::Configuration { .. })));

        let args = Args {
            config_file: Some(PathBuf::from("/nonexistent/config.toml")),
            ..Args::default()
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_shared_output_path() {
        let temp_dir = TempDir::new().unwrap();
        let args = Args {
            data_dir: Some(temp_dir.path().to_path_buf()),
            output: Some(PathBuf::from("out")),
            json: Some(PathBuf::from("out")),
            ..Args::default()
        };
        assert!(args.validate().is_err());
    }
}
