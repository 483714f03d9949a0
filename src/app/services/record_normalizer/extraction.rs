//! Field value extraction from mapped source cells

use crate::constants::CONCAT_SEPARATOR;

/// Join the trimmed, non-empty cells at `columns` with a single space
///
/// Returns `None` when no column is mapped or every mapped cell is blank.
/// Columns past the end of the row contribute nothing.
pub fn extract_value(row: &[String], columns: &[usize]) -> Option<String> {
    let values: Vec<&str> = columns
        .iter()
        .filter_map(|&index| row.get(index))
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join(CONCAT_SEPARATOR))
    }
}
