//! Configuration management and validation.
//!
//! Provides the configuration structures for processing parameters, the
//! target schema descriptor, the category palette and output locations.
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables, then command-line overrides.

use crate::app::models::{MapCenter, TargetField};
use crate::constants::{
    self, CONFIG_DIR_NAME, DEFAULT_DATA_DIR, DEFAULT_MAP_CENTER, DEFAULT_OUTPUT_FILENAME,
    DEFAULT_PREVIEW_ROWS, DEFAULT_SAMPLE_SIZE, ENV_DATA_DIR, ENV_OUTPUT, FALLBACK_COLOR,
    MARKER_HEX, MARKER_PALETTE, MIN_PALETTE_SIZE,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub processing: ProcessingConfig,
    pub schema: TargetSchema,
    pub palette: PaletteConfig,
    pub output: OutputConfig,
}

/// Input discovery and pipeline behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Directory scanned for `*.csv` input files
    pub data_dir: PathBuf,

    /// Leading bytes inspected for encoding detection
    pub sample_size: usize,

    /// Use the statistical detector before the candidate list
    pub statistical_detection: bool,

    /// Pre-fill column selections from header patterns
    pub auto_suggest: bool,

    /// Ask the operator to confirm mappings (false = batch mode)
    pub interactive: bool,

    /// Rows shown in the interactive preview
    pub preview_rows: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            sample_size: DEFAULT_SAMPLE_SIZE,
            statistical_detection: true,
            auto_suggest: true,
            interactive: true,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

/// One target field with its header patterns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: TargetField,

    /// Exact header terms, compared after trim + lower-case
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Batch mode skips files where this field is unmapped
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn new(field: TargetField, patterns: &[&str], required: bool) -> Self {
        Self {
            field,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            required,
        }
    }
}

/// Ordered target schema descriptor
///
/// The order of `fields` is the interactive prompt order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSchema {
    /// Keep the category field (facility variant) or drop it (park variant)
    pub include_category: bool,
    pub fields: Vec<FieldSpec>,
}

impl Default for TargetSchema {
    fn default() -> Self {
        use constants::field_patterns as p;
        Self {
            include_category: true,
            fields: vec![
                FieldSpec::new(TargetField::Name, p::NAME, true),
                FieldSpec::new(TargetField::Address, p::ADDRESS, false),
                FieldSpec::new(TargetField::Url, p::URL, false),
                FieldSpec::new(TargetField::Latitude, p::LATITUDE, true),
                FieldSpec::new(TargetField::Longitude, p::LONGITUDE, false),
                FieldSpec::new(TargetField::Category, p::CATEGORY, false),
            ],
        }
    }
}

impl TargetSchema {
    /// Fields taking part in this run, in prompt order
    pub fn active_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|spec| self.include_category || spec.field != TargetField::Category)
    }

    pub fn includes(&self, field: TargetField) -> bool {
        self.active_fields().any(|spec| spec.field == field)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = TargetField> + '_ {
        self.active_fields()
            .filter(|spec| spec.required)
            .map(|spec| spec.field)
    }

    /// Output column order: schema text fields, coordinates, provenance, category
    pub fn output_columns(&self) -> Vec<&'static str> {
        let mut columns = vec!["name", "address", "url", "latitude", "longitude", "source_file"];
        if self.include_category {
            columns.push("category");
        }
        columns
    }
}

/// Category palette and colour names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Ordered palette; categories take `colors[rank % len]`
    pub colors: Vec<String>,

    /// Colour name to hex lookup
    pub hex: BTreeMap<String, String>,

    /// Colour for categories missing from the table
    pub fallback: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            colors: MARKER_PALETTE.iter().map(|c| c.to_string()).collect(),
            hex: MARKER_HEX
                .iter()
                .map(|(name, hex)| (name.to_string(), hex.to_string()))
                .collect(),
            fallback: FALLBACK_COLOR.to_string(),
        }
    }
}

/// Output artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Merged CSV path
    pub csv_path: PathBuf,

    /// Optional JSON map payload path
    pub json_path: Option<PathBuf>,

    pub map_center: MapCenter,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_OUTPUT_FILENAME),
            json_path: None,
            map_center: MapCenter {
                lat: DEFAULT_MAP_CENTER.0,
                lon: DEFAULT_MAP_CENTER.1,
            },
        }
    }
}

impl Config {
    /// Default config file location (`<config dir>/facility-merger/config.toml`)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::configuration("Could not determine user config directory"))?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Parse a TOML config file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config file {}", path.display()), e)
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Defaults, then the config file if any, then environment variables
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from an environment-like lookup
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(data_dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            debug!("{} overrides data directory: {}", ENV_DATA_DIR, data_dir);
            self.processing.data_dir = PathBuf::from(data_dir);
        }
        if let Some(output) = lookup(ENV_OUTPUT).filter(|v| !v.trim().is_empty()) {
            debug!("{} overrides output path: {}", ENV_OUTPUT, output);
            self.output.csv_path = PathBuf::from(output);
        }
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.processing.sample_size == 0 {
            return Err(Error::configuration(
                "Encoding sample size must be greater than 0",
            ));
        }

        if self.palette.colors.len() < MIN_PALETTE_SIZE {
            return Err(Error::configuration(format!(
                "Palette needs at least {} colours, found {}",
                MIN_PALETTE_SIZE,
                self.palette.colors.len()
            )));
        }

        if self.palette.fallback.trim().is_empty() {
            return Err(Error::configuration("Fallback colour cannot be empty"));
        }

        for field in [
            TargetField::Name,
            TargetField::Latitude,
            TargetField::Longitude,
        ] {
            if !self.schema.includes(field) {
                return Err(Error::configuration(format!(
                    "Target schema must include the '{}' field",
                    field
                )));
            }
        }

        let mut seen = Vec::new();
        for spec in &self.schema.fields {
            if seen.contains(&spec.field) {
                return Err(Error::configuration(format!(
                    "Target field '{}' is listed more than once",
                    spec.field
                )));
            }
            seen.push(spec.field);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.processing.sample_size, 200_000);
        assert_eq!(config.palette.colors.len(), 19);
        assert!(config.schema.include_category);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [processing]
            data_dir = "/srv/opendata"
            interactive = false

            [schema]
            include_category = false
            "#,
        )
        .unwrap();

        assert_eq!(config.processing.data_dir, PathBuf::from("/srv/opendata"));
        assert!(!config.processing.interactive);
        assert!(config.processing.auto_suggest);
        assert!(!config.schema.include_category);
        assert!(!config.schema.includes(TargetField::Category));
        assert_eq!(config.schema.fields.len(), 6);
        assert_eq!(
            config.schema.output_columns(),
            vec!["name", "address", "url", "latitude", "longitude", "source_file"]
        );
    }

    #[test]
    fn test_custom_field_patterns_from_toml() {
        let config = Config::from_toml_str(
            r#"
            [[schema.fields]]
            field = "name"
            patterns = ["公園名"]
            required = true

            [[schema.fields]]
            field = "latitude"
            patterns = ["y"]

            [[schema.fields]]
            field = "longitude"
            patterns = ["x"]
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.schema.fields[0].patterns, vec!["公園名".to_string()]);
        let required: Vec<_> = config.schema.required_fields().collect();
        assert_eq!(required, vec![TargetField::Name]);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            ENV_DATA_DIR => Some("/tmp/in".to_string()),
            ENV_OUTPUT => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(config.processing.data_dir, PathBuf::from("/tmp/in"));
        assert_eq!(config.output.csv_path, PathBuf::from(DEFAULT_OUTPUT_FILENAME));
    }

    #[test]
    fn test_validation_rejects_short_palette() {
        let mut config = Config::default();
        config.palette.colors.truncate(5);
        assert!(matches!(
            config.validate(),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_schema_without_coordinates() {
        let mut config = Config::default();
        config
            .schema
            .fields
            .retain(|spec| spec.field != TargetField::Longitude);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_duplicate_fields() {
        let mut config = Config::default();
        config
            .schema
            .fields
            .push(FieldSpec::new(TargetField::Url, &["link"], false));
        assert!(config.validate().is_err());
    }
}
