//! Tests for header-term column suggestions

use super::*;
use crate::app::models::TargetField;
use crate::app::services::column_mapper::ColumnMapper;
use crate::app::services::column_mapper::heuristic::{HeuristicMatcher, normalize_header};
use crate::config::TargetSchema;

#[test]
fn test_suggests_every_field_for_standard_headers() {
    let mapper = ColumnMapper::new(&TargetSchema::default());
    let suggestions = mapper.suggest(&park_table());

    assert_eq!(suggestions.get(TargetField::Name), Some(&[1][..]));
    assert_eq!(suggestions.get(TargetField::Address), Some(&[2][..]));
    assert_eq!(suggestions.get(TargetField::Url), Some(&[3][..]));
    assert_eq!(suggestions.get(TargetField::Latitude), Some(&[4][..]));
    assert_eq!(suggestions.get(TargetField::Longitude), Some(&[5][..]));
    assert_eq!(suggestions.get(TargetField::Category), Some(&[6][..]));
}

#[test]
fn test_match_is_exact_not_substring() {
    let mapper = ColumnMapper::new(&TargetSchema::default());
    let suggestions = mapper.suggest(&table(&["施設名称", "緯度経度", "URL2"], &[]));

    assert!(suggestions.is_empty());
}

#[test]
fn test_match_is_case_insensitive_after_trim() {
    let mapper = ColumnMapper::new(&TargetSchema::default());
    let suggestions = mapper.suggest(&table(&["  Url ", "LATITUDE", "Lng"], &[]));

    assert_eq!(suggestions.get(TargetField::Url), Some(&[0][..]));
    assert_eq!(suggestions.get(TargetField::Latitude), Some(&[1][..]));
    assert_eq!(suggestions.get(TargetField::Longitude), Some(&[2][..]));
}

#[test]
fn test_multiple_matches_are_kept_in_header_order() {
    let matcher = HeuristicMatcher::new(vec![(
        TargetField::Address,
        vec!["住所".to_string(), "所在地".to_string()],
    )]);
    let suggestions = matcher.suggest(&table(&["所在地", "名称", "住所"], &[]));

    assert_eq!(suggestions.get(TargetField::Address), Some(&[0, 2][..]));
    assert_eq!(
        suggestions.display_selection(TargetField::Address),
        Some("0+2".to_string())
    );
}

#[test]
fn test_category_not_suggested_when_schema_excludes_it() {
    let schema = TargetSchema {
        include_category: false,
        ..TargetSchema::default()
    };
    let mapper = ColumnMapper::new(&schema);
    let suggestions = mapper.suggest(&park_table());

    assert!(suggestions.get(TargetField::Category).is_none());
    assert!(!mapper.fields().contains(&TargetField::Category));
}

#[test]
fn test_normalize_header_strips_bom_and_case() {
    assert_eq!(normalize_header("\u{feff}URL "), "url");
    assert_eq!(normalize_header(" 名称"), "名称");
}
