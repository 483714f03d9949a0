//! Input file discovery
//!
//! Finds the `*.csv` files directly inside the data directory and returns
//! them sorted by file name, which is the order files are merged in.

use crate::constants::INPUT_FILE_PATTERN;
use crate::{Error, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Discover input CSV files in `data_dir`, sorted by file name
///
/// Sub-directories are not searched. An empty result is not an error here;
/// the caller decides whether no input is fatal.
pub fn discover_csv_files(data_dir: &Path) -> Result<Vec<PathBuf>> {
    if !data_dir.is_dir() {
        return Err(Error::configuration(format!(
            "Data directory not found: {}",
            data_dir.display()
        )));
    }

    let escaped = Pattern::escape(&data_dir.to_string_lossy());
    let pattern = Path::new(&escaped).join(INPUT_FILE_PATTERN);
    let pattern = pattern.to_string_lossy();
    debug!("Searching for input files with pattern {}", pattern);

    let entries = glob::glob(&pattern)
        .map_err(|e| Error::configuration(format!("Invalid input pattern '{}': {}", pattern, e)))?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(path) => debug!("Ignoring non-file match {}", path.display()),
            Err(e) => warn!("Cannot inspect {}: {}", e.path().display(), e.error()),
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("Found {} input files in {}", files.len(), data_dir.display());
    Ok(files)
}

/// File name used for provenance and reporting
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
