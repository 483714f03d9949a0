//! Data models for facility merging
//!
//! This module contains the core data structures passed between pipeline
//! stages: the raw table read from disk, the per-file column mapping, the
//! normalised output record and the category colour table.

use crate::constants::{MAX_LATITUDE, MAX_LONGITUDE};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Target Schema Fields
// =============================================================================

/// Fields of the fixed target schema
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TargetField {
    Name,
    Address,
    Url,
    Latitude,
    Longitude,
    Category,
}

impl TargetField {
    /// Every target field in schema order
    pub const ALL: [TargetField; 6] = [
        TargetField::Name,
        TargetField::Address,
        TargetField::Url,
        TargetField::Latitude,
        TargetField::Longitude,
        TargetField::Category,
    ];

    /// Field name as used in prompts and output headers
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetField::Name => "name",
            TargetField::Address => "address",
            TargetField::Url => "url",
            TargetField::Latitude => "latitude",
            TargetField::Longitude => "longitude",
            TargetField::Category => "category",
        }
    }

    /// Whether the field holds a coordinate rather than text
    pub fn is_coordinate(&self) -> bool {
        matches!(self, TargetField::Latitude | TargetField::Longitude)
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TargetField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| Error::configuration(format!("Unknown target field '{}'", s)))
    }
}

// =============================================================================
// Raw Table
// =============================================================================

/// Table of opaque string cells as read from one source file
///
/// Rows may be shorter or longer than the header; nothing is padded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Number of header columns
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at `(row, column)` if the row is long enough
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }
}

// =============================================================================
// Column Mapping
// =============================================================================

/// Field to source column suggestions, possibly incomplete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialMapping {
    selections: BTreeMap<TargetField, Vec<usize>>,
}

impl PartialMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the ordered source columns for a field; an empty list unsets it
    pub fn set(&mut self, field: TargetField, columns: Vec<usize>) {
        if columns.is_empty() {
            self.selections.remove(&field);
        } else {
            self.selections.insert(field, columns);
        }
    }

    pub fn get(&self, field: TargetField) -> Option<&[usize]> {
        self.selections.get(&field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Selection rendered the way an operator types it, e.g. `2+5`
    pub fn display_selection(&self, field: TargetField) -> Option<String> {
        self.get(field).map(format_selection)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TargetField, &[usize])> {
        self.selections
            .iter()
            .map(|(field, columns)| (*field, columns.as_slice()))
    }

    /// Freeze into an immutable mapping
    pub fn into_mapping(self) -> ColumnMapping {
        ColumnMapping {
            columns: self.selections,
        }
    }
}

/// Immutable per-file association from target field to source columns
///
/// Values of several columns are joined with a single space in listed order.
/// A field without columns yields an absent value for every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: BTreeMap<TargetField, Vec<usize>>,
}

impl ColumnMapping {
    /// Source columns for a field, empty when unmapped
    pub fn columns_for(&self, field: TargetField) -> &[usize] {
        self.columns
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_mapped(&self, field: TargetField) -> bool {
        !self.columns_for(field).is_empty()
    }

    /// Fields that have at least one source column
    pub fn mapped_fields(&self) -> impl Iterator<Item = TargetField> + '_ {
        self.columns.keys().copied()
    }

    /// Minimum row length needed to read every mapped column
    pub fn required_width(&self) -> usize {
        self.columns
            .values()
            .flatten()
            .max()
            .map(|max| max + 1)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Render a list of column indices as `a+b+c`
pub fn format_selection(columns: &[usize]) -> String {
    columns
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("+")
}

// =============================================================================
// Normalized Record
// =============================================================================

/// Fixed-schema output record
///
/// Empty strings are never stored. When both coordinates are present they
/// are within `|lat| <= 90` and `|lon| <= 180`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub name: Option<String>,
    pub address: Option<String>,
    pub url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub category: Option<String>,
    pub source_file: String,
}

impl NormalizedRecord {
    /// Empty record tagged with its source file
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            name: None,
            address: None,
            url: None,
            latitude: None,
            longitude: None,
            category: None,
            source_file: source_file.into(),
        }
    }

    /// Both coordinates present
    pub fn has_location(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Every present coordinate is inside its valid range
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_none_or(|lat| lat.abs() <= MAX_LATITUDE)
            && self.longitude.is_none_or(|lon| lon.abs() <= MAX_LONGITUDE)
    }
}

// =============================================================================
// Category Colours and Map Payload
// =============================================================================

/// Colour assigned to one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryColor {
    /// Palette colour name
    pub color: String,
    /// Hex string derived from the colour name, or the name itself
    pub hex: String,
}

/// Deterministic category to colour assignment for one merged record set
///
/// Lookups for categories not in the table return the fallback colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryColorTable {
    entries: BTreeMap<String, CategoryColor>,
    fallback: CategoryColor,
}

impl CategoryColorTable {
    pub fn new(entries: BTreeMap<String, CategoryColor>, fallback: CategoryColor) -> Self {
        Self { entries, fallback }
    }

    /// Colour entry for a category, falling back for unknown or absent ones
    pub fn lookup(&self, category: Option<&str>) -> &CategoryColor {
        category
            .and_then(|c| self.entries.get(c))
            .unwrap_or(&self.fallback)
    }

    pub fn color_for(&self, category: Option<&str>) -> &str {
        &self.lookup(category).color
    }

    pub fn hex_for(&self, category: Option<&str>) -> &str {
        &self.lookup(category).hex
    }

    /// Category to hex mapping consumed by the map front end
    pub fn hex_map(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(category, color)| (category.clone(), color.hex.clone()))
            .collect()
    }

    /// Categories in assignment order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Map centre coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapCenter {
    pub lat: f64,
    pub lon: f64,
}

/// JSON document consumed by the map presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPayload {
    pub records: Vec<NormalizedRecord>,
    #[serde(rename = "categoryColors")]
    pub category_colors: BTreeMap<String, String>,
    pub center: MapCenter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_field_round_trip_names() {
        for field in TargetField::ALL {
            assert_eq!(field.as_str().parse::<TargetField>().unwrap(), field);
        }
        assert_eq!(" Latitude ".parse::<TargetField>().unwrap(), TargetField::Latitude);
        assert!("description".parse::<TargetField>().is_err());
    }

    #[test]
    fn test_required_width() {
        let mut partial = PartialMapping::new();
        assert_eq!(partial.clone().into_mapping().required_width(), 0);

        partial.set(TargetField::Name, vec![2, 5]);
        partial.set(TargetField::Latitude, vec![1]);
        let mapping = partial.into_mapping();

        assert_eq!(mapping.required_width(), 6);
        assert_eq!(mapping.columns_for(TargetField::Name), &[2, 5]);
        assert!(mapping.columns_for(TargetField::Url).is_empty());
        assert!(!mapping.is_mapped(TargetField::Url));
    }

    #[test]
    fn test_partial_mapping_empty_selection_unsets() {
        let mut partial = PartialMapping::new();
        partial.set(TargetField::Url, vec![3]);
        partial.set(TargetField::Url, vec![]);
        assert!(partial.get(TargetField::Url).is_none());
        assert!(partial.is_empty());
    }

    #[test]
    fn test_display_selection() {
        let mut partial = PartialMapping::new();
        partial.set(TargetField::Address, vec![0, 3, 4]);
        assert_eq!(
            partial.display_selection(TargetField::Address),
            Some("0+3+4".to_string())
        );
        assert_eq!(partial.display_selection(TargetField::Name), None);
    }

    #[test]
    fn test_record_coordinate_validity() {
        let mut record = NormalizedRecord::new("a.csv");
        assert!(record.has_valid_coordinates());
        assert!(!record.has_location());

        record.latitude = Some(35.6);
        record.longitude = Some(139.7);
        assert!(record.has_valid_coordinates());
        assert!(record.has_location());

        record.latitude = Some(139.7);
        assert!(!record.has_valid_coordinates());
    }

    #[test]
    fn test_color_table_fallback_at_lookup() {
        let mut entries = BTreeMap::new();
        entries.insert(
            "公園".to_string(),
            CategoryColor {
                color: "red".to_string(),
                hex: "#d63e2a".to_string(),
            },
        );
        let table = CategoryColorTable::new(
            entries,
            CategoryColor {
                color: "gray".to_string(),
                hex: "#575757".to_string(),
            },
        );

        assert_eq!(table.color_for(Some("公園")), "red");
        assert_eq!(table.color_for(Some("図書館")), "gray");
        assert_eq!(table.hex_for(None), "#575757");
        assert_eq!(table.hex_map().len(), 1);
    }

    #[test]
    fn test_map_payload_serializes_category_colors_key() {
        let payload = MapPayload {
            records: vec![NormalizedRecord::new("a.csv")],
            category_colors: BTreeMap::new(),
            center: MapCenter {
                lat: 35.681236,
                lon: 139.767125,
            },
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("categoryColors").is_some());
        assert!(json["records"][0]["name"].is_null());
        assert_eq!(json["records"][0]["source_file"], "a.csv");
    }
}
