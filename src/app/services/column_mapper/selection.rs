//! Parsing of operator column selections
//!
//! Accepted forms: a single index (`2`), a plus-joined list (`0+3`), an empty
//! line (take the suggestion, if any) or the skip-file keyword. Anything else,
//! including indices outside `[0, column_count)`, is rejected so the caller
//! can ask again. Indices are never clamped.

use crate::constants::SKIP_FILE_KEYWORD;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static SELECTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\+[0-9]+)*$").expect("valid selection pattern"));

/// One parsed answer to a column prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionInput {
    /// Blank input: accept the suggestion or leave the field unset
    UseDefault,
    /// Abort mapping and exclude the current file
    SkipFile,
    /// Explicit ordered source columns
    Columns(Vec<usize>),
}

/// Parse one line of operator input against a table width
pub fn parse_selection(input: &str, column_count: usize) -> Result<SelectionInput> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Ok(SelectionInput::UseDefault);
    }

    if trimmed.eq_ignore_ascii_case(SKIP_FILE_KEYWORD) {
        return Ok(SelectionInput::SkipFile);
    }

    if !SELECTION_PATTERN.is_match(trimmed) {
        return Err(Error::invalid_column_selection(
            trimmed,
            "use indices like 3 or 0+2",
        ));
    }

    let mut columns = Vec::new();
    for part in trimmed.split('+') {
        let index: usize = part.parse().map_err(|_| {
            Error::invalid_column_selection(trimmed, format!("'{}' is not a column index", part))
        })?;
        if index >= column_count {
            return Err(Error::invalid_column_selection(
                trimmed,
                format!(
                    "index {} out of range (0-{})",
                    index,
                    column_count.saturating_sub(1)
                ),
            ));
        }
        columns.push(index);
    }

    Ok(SelectionInput::Columns(columns))
}
