//! Test utilities for record normalisation

use crate::app::models::{ColumnMapping, PartialMapping, TargetField};

mod normalizer_tests;

/// Helper to build a row of owned cells
pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

/// Helper to build a mapping from `(field, columns)` pairs
pub fn mapping(entries: &[(TargetField, &[usize])]) -> ColumnMapping {
    let mut partial = PartialMapping::new();
    for (field, columns) in entries {
        partial.set(*field, columns.to_vec());
    }
    partial.into_mapping()
}

/// Name, address, latitude and longitude in columns 0..=3
pub fn basic_mapping() -> ColumnMapping {
    mapping(&[
        (TargetField::Name, &[0]),
        (TargetField::Address, &[1]),
        (TargetField::Latitude, &[2]),
        (TargetField::Longitude, &[3]),
    ])
}
