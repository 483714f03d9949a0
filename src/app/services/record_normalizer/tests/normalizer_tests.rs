//! Tests for row and table normalisation

use super::*;
use crate::app::models::{RawTable, TargetField};
use crate::app::services::record_normalizer::{RecordNormalizer, RowRejection};

#[test]
fn test_normalize_trims_text_fields() {
    let record = RecordNormalizer
        .normalize(
            &row(&["  中央公園 ", "東京都新宿区", "35.6905", "139.6899"]),
            &basic_mapping(),
            "parks.csv",
        )
        .unwrap();

    assert_eq!(record.name.as_deref(), Some("中央公園"));
    assert_eq!(record.address.as_deref(), Some("東京都新宿区"));
    assert_eq!(record.latitude, Some(35.6905));
    assert_eq!(record.longitude, Some(139.6899));
    assert_eq!(record.url, None);
    assert_eq!(record.source_file, "parks.csv");
}

#[test]
fn test_normalize_concatenates_multiple_columns() {
    let mapping = mapping(&[
        (TargetField::Name, &[2, 5]),
        (TargetField::Latitude, &[0]),
        (TargetField::Longitude, &[1]),
    ]);
    let record = RecordNormalizer
        .normalize(
            &row(&["35.6", "139.7", "Central", "x", "y", "Park"]),
            &mapping,
            "a.csv",
        )
        .unwrap();

    assert_eq!(record.name.as_deref(), Some("Central Park"));
}

#[test]
fn test_normalize_skips_blank_parts_when_concatenating() {
    let mapping = mapping(&[
        (TargetField::Address, &[0, 1, 2]),
        (TargetField::Latitude, &[3]),
    ]);
    let record = RecordNormalizer
        .normalize(&row(&["東京都", " ", "新宿区", ""]), &mapping, "a.csv")
        .unwrap();

    assert_eq!(record.address.as_deref(), Some("東京都 新宿区"));
    assert_eq!(record.latitude, None);
}

#[test]
fn test_normalize_splits_combined_pair() {
    let mapping = mapping(&[(TargetField::Name, &[0]), (TargetField::Latitude, &[1])]);
    let record = RecordNormalizer
        .normalize(&row(&["Tokyo Station", "35.681236, 139.767125"]), &mapping, "a.csv")
        .unwrap();

    assert_eq!(record.latitude, Some(35.681236));
    assert_eq!(record.longitude, Some(139.767125));
}

#[test]
fn test_normalize_rejects_unsplittable_pair() {
    let mapping = mapping(&[(TargetField::Name, &[0]), (TargetField::Latitude, &[1])]);
    let result = RecordNormalizer.normalize(&row(&["Somewhere", "35.6"]), &mapping, "a.csv");

    assert!(matches!(result, Err(RowRejection::InvalidCoordinate { .. })));
}

#[test]
fn test_normalize_swaps_transposed_coordinates() {
    let record = RecordNormalizer
        .normalize(
            &row(&["公園", "", "139.7", "35.6"]),
            &basic_mapping(),
            "a.csv",
        )
        .unwrap();

    assert_eq!(record.latitude, Some(35.6));
    assert_eq!(record.longitude, Some(139.7));
}

#[test]
fn test_normalize_drops_out_of_range_coordinates() {
    let result = RecordNormalizer.normalize(
        &row(&["公園", "", "200", "35"]),
        &basic_mapping(),
        "a.csv",
    );

    match result {
        Err(RowRejection::InvalidCoordinate {
            latitude,
            longitude,
        }) => {
            assert_eq!(latitude.as_deref(), Some("200"));
            assert_eq!(longitude.as_deref(), Some("35"));
        }
        other => panic!("Expected invalid coordinate, got {:?}", other),
    }
}

#[test]
fn test_normalize_drops_unparseable_coordinate_text() {
    let result = RecordNormalizer.normalize(
        &row(&["公園", "", "不明", "139.7"]),
        &basic_mapping(),
        "a.csv",
    );
    assert!(matches!(result, Err(RowRejection::InvalidCoordinate { .. })));
}

#[test]
fn test_normalize_keeps_rows_without_coordinates() {
    let record = RecordNormalizer
        .normalize(&row(&["公園", "東京都", "", " "]), &basic_mapping(), "a.csv")
        .unwrap();

    assert_eq!(record.latitude, None);
    assert_eq!(record.longitude, None);
    assert!(!record.has_location());
}

#[test]
fn test_normalize_full_width_coordinates() {
    let record = RecordNormalizer
        .normalize(
            &row(&["公園", "", "35．6", "139．767"]),
            &basic_mapping(),
            "a.csv",
        )
        .unwrap();

    assert_eq!(record.latitude, Some(35.6));
    assert_eq!(record.longitude, Some(139.767));
}

#[test]
fn test_normalize_rejects_short_row() {
    let result = RecordNormalizer.normalize(&row(&["公園", "東京都"]), &basic_mapping(), "a.csv");

    assert_eq!(
        result,
        Err(RowRejection::ShortRow {
            cells: 2,
            required: 4
        })
    );
}

#[test]
fn test_empty_category_is_absent() {
    let mapping = mapping(&[(TargetField::Name, &[0]), (TargetField::Category, &[1])]);
    let record = RecordNormalizer
        .normalize(&row(&["公園", "  "]), &mapping, "a.csv")
        .unwrap();

    assert_eq!(record.category, None);
}

#[test]
fn test_empty_mapping_yields_empty_record() {
    let record = RecordNormalizer
        .normalize(&row(&["a", "b"]), &mapping(&[]), "a.csv")
        .unwrap();

    assert_eq!(record.name, None);
    assert_eq!(record.source_file, "a.csv");
}

#[test]
fn test_normalize_table_counts_outcomes() {
    let table = RawTable::new(
        row(&["名称", "住所", "緯度", "経度"]),
        vec![
            row(&["中央公園", "新宿区", "35.69", "139.69"]),
            row(&["逆公園", "港区", "139.7", "35.6"]),
            row(&["遠公園", "", "200", "35"]),
            row(&["短い"]),
            row(&["無座標", "", "", ""]),
        ],
    );

    let file = RecordNormalizer.normalize_table(&table, &basic_mapping(), "parks.csv");

    assert_eq!(file.records.len(), 3);
    assert_eq!(file.stats.rows_read, 5);
    assert_eq!(file.stats.records_emitted, 3);
    assert_eq!(file.stats.short_rows, 1);
    assert_eq!(file.stats.invalid_coordinates, 1);
    assert_eq!(file.stats.swapped_coordinates, 1);
    assert_eq!(file.stats.dropped(), 2);
    assert!(file.records.iter().all(|r| r.has_valid_coordinates()));
}

#[test]
fn test_all_short_rows_produce_no_records() {
    let table = RawTable::new(
        row(&["a", "b", "c", "d"]),
        vec![row(&["x"]), row(&["y", "z"])],
    );

    let file = RecordNormalizer.normalize_table(&table, &basic_mapping(), "short.csv");

    assert!(file.records.is_empty());
    assert_eq!(file.stats.short_rows, 2);
    assert_eq!(file.stats.retention_rate(), 0.0);
}
