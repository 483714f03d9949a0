//! Facility Merger Library
//!
//! A Rust library for normalising Japanese public-facility CSV datasets
//! (mixed encodings, inconsistent column layouts) into one record shape and
//! merging them into a single CSV or a JSON payload for a web map.
//!
//! This library provides tools for:
//! - Detecting file encodings with graceful fallback to replacement decoding
//! - Reading malformed tabular data without aborting on bad rows
//! - Mapping source columns onto a fixed target schema, heuristically or interactively
//! - Cleaning values and repairing swapped latitude/longitude pairs
//! - Assigning deterministic colours to categories
//! - Merging many files into one record set with a per-file report

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod category_colors;
        pub mod column_mapper;
        pub mod encoding_detector;
        pub mod merge_orchestrator;
        pub mod output_writer;
        pub mod record_normalizer;
        pub mod tabular_reader;
    }
    pub mod adapters {
        pub mod filesystem;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
    pub mod input;
}

// Re-export commonly used types
pub use app::models::{ColumnMapping, NormalizedRecord, RawTable, TargetField};
pub use config::Config;

/// Result type alias for the facility merger
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for facility merging operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing or writing error
    #[error("CSV error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// No candidate encoding could decode the sample
    #[error("Could not determine encoding of '{file}'")]
    EncodingUndetectable { file: String },

    /// Input file could not be opened or read
    #[error("Cannot read file '{path}': {reason}")]
    FileUnreadable { path: String, reason: String },

    /// Column selection entered by the operator was rejected
    #[error("Invalid column selection '{input}': {reason}")]
    InvalidColumnSelection { input: String, reason: String },

    /// Required target fields have no source columns
    #[error("No columns mapped for required fields in '{file}': {}", fields.join(", "))]
    UnmappedFields { file: String, fields: Vec<String> },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Input directory contained no CSV files
    #[error("No CSV files found in {path}")]
    NoInputFiles { path: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },

    /// JSON or TOML (de)serialisation failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an undetectable encoding error
    pub fn encoding_undetectable(file: impl Into<String>) -> Self {
        Self::EncodingUndetectable { file: file.into() }
    }

    /// Create a file unreadable error
    pub fn file_unreadable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FileUnreadable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid column selection error
    pub fn invalid_column_selection(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidColumnSelection {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create an unmapped fields error
    pub fn unmapped_fields(file: impl Into<String>, fields: &[TargetField]) -> Self {
        Self::UnmappedFields {
            file: file.into(),
            fields: fields.iter().map(|f| f.as_str().to_string()).collect(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a no input files error
    pub fn no_input_files(path: impl Into<String>) -> Self {
        Self::NoInputFiles { path: path.into() }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// Whether this error should end the whole run rather than one file
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoInputFiles { .. } | Self::ProcessingInterrupted { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV operation failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}
