//! Test utilities for column mapping
//!
//! Shared fixtures for the heuristic, selection and resolver tests.

use crate::app::models::RawTable;

mod heuristic_tests;

/// Helper to build a table from string slices
pub fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

/// Typical municipal park listing layout
pub fn park_table() -> RawTable {
    table(
        &["No", " 名称 ", "所在地", "URL", "緯度", "経度", "種別"],
        &[&[
            "1",
            "中央公園",
            "東京都新宿区",
            "https://example.jp/park",
            "35.6905",
            "139.6899",
            "公園",
        ]],
    )
}
