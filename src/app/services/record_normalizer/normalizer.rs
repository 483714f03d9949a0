//! Row and table normalisation

use super::coordinates::{CoordinateRepair, coerce_number, repair_coordinates, split_pair};
use super::extraction::extract_value;
use super::stats::NormalizationStats;
use crate::app::models::{ColumnMapping, NormalizedRecord, RawTable, TargetField};
use tracing::{debug, info};

/// Why a row produced no record
#[derive(Debug, Clone, PartialEq)]
pub enum RowRejection {
    /// Row has fewer cells than the mapping needs
    ShortRow { cells: usize, required: usize },
    /// Coordinate text present but not a number, or out of range after repair
    InvalidCoordinate {
        latitude: Option<String>,
        longitude: Option<String>,
    },
}

/// Records and statistics for one source file
#[derive(Debug, Clone, Default)]
pub struct NormalizedFile {
    pub records: Vec<NormalizedRecord>,
    pub stats: NormalizationStats,
}

/// Converts raw rows into normalised records
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNormalizer;

impl RecordNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalise one row
    ///
    /// Text fields are the space-joined trimmed cells of their columns.
    /// When latitude has a value but longitude is not mapped, the latitude
    /// cell is read as a combined `lat,lon` pair. Coordinates are swapped
    /// when transposed and the row is rejected if they remain invalid.
    pub fn normalize(
        &self,
        row: &[String],
        mapping: &ColumnMapping,
        source_file: &str,
    ) -> Result<NormalizedRecord, RowRejection> {
        self.normalize_row(row, mapping, source_file)
            .map(|(record, _swapped)| record)
    }

    fn normalize_row(
        &self,
        row: &[String],
        mapping: &ColumnMapping,
        source_file: &str,
    ) -> Result<(NormalizedRecord, bool), RowRejection> {
        let required = mapping.required_width();
        if row.len() < required {
            return Err(RowRejection::ShortRow {
                cells: row.len(),
                required,
            });
        }

        let field = |target: TargetField| extract_value(row, mapping.columns_for(target));

        let mut record = NormalizedRecord::new(source_file);
        record.name = field(TargetField::Name);
        record.address = field(TargetField::Address);
        record.url = field(TargetField::Url);
        record.category = field(TargetField::Category);

        let lat_raw = field(TargetField::Latitude);
        let lon_raw = field(TargetField::Longitude);
        let invalid = || RowRejection::InvalidCoordinate {
            latitude: lat_raw.clone(),
            longitude: lon_raw.clone(),
        };

        let (latitude, longitude) = match (&lat_raw, &lon_raw) {
            (Some(pair), None) if !mapping.is_mapped(TargetField::Longitude) => {
                match split_pair(pair) {
                    (Some(lat), Some(lon)) => (Some(lat), Some(lon)),
                    _ => return Err(invalid()),
                }
            }
            _ => (
                parse_present(lat_raw.as_deref()).ok_or_else(invalid)?,
                parse_present(lon_raw.as_deref()).ok_or_else(invalid)?,
            ),
        };

        let swapped = match repair_coordinates(latitude, longitude) {
            CoordinateRepair::Unchanged(lat, lon) => {
                record.latitude = lat;
                record.longitude = lon;
                false
            }
            CoordinateRepair::Swapped(lat, lon) => {
                record.latitude = Some(lat);
                record.longitude = Some(lon);
                true
            }
            CoordinateRepair::Invalid => return Err(invalid()),
        };

        Ok((record, swapped))
    }

    /// Normalise every row of a table, counting what was dropped
    pub fn normalize_table(
        &self,
        table: &RawTable,
        mapping: &ColumnMapping,
        source_file: &str,
    ) -> NormalizedFile {
        let mut stats = NormalizationStats::new();
        let mut records = Vec::with_capacity(table.row_count());

        for (index, row) in table.rows.iter().enumerate() {
            stats.rows_read += 1;

            match self.normalize_row(row, mapping, source_file) {
                Ok((record, swapped)) => {
                    if swapped {
                        stats.swapped_coordinates += 1;
                    }
                    records.push(record);
                    stats.records_emitted += 1;
                }
                Err(RowRejection::ShortRow { cells, required }) => {
                    stats.short_rows += 1;
                    debug!(
                        "{} row {}: {} cells, mapping needs {}",
                        source_file, index, cells, required
                    );
                }
                Err(rejection @ RowRejection::InvalidCoordinate { .. }) => {
                    stats.invalid_coordinates += 1;
                    debug!("{} row {}: dropped {:?}", source_file, index, rejection);
                }
            }
        }

        info!(
            "Normalised {}: {} records from {} rows ({} short, {} invalid coordinates, {} swapped)",
            source_file,
            stats.records_emitted,
            stats.rows_read,
            stats.short_rows,
            stats.invalid_coordinates,
            stats.swapped_coordinates
        );

        NormalizedFile { records, stats }
    }
}

/// `Some(None)` for absent text, `None` when text is present but not numeric
fn parse_present(raw: Option<&str>) -> Option<Option<f64>> {
    match raw {
        None => Some(None),
        Some(text) => coerce_number(text).map(Some),
    }
}
