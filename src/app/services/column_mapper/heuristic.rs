//! Header-term matching for column suggestions
//!
//! A header matches a field only when its trimmed, lower-cased text equals
//! one of the field's known terms. Every matching column is kept, in header
//! order, so a field split across several columns is concatenated later.

use crate::app::models::{PartialMapping, RawTable, TargetField};
use crate::config::TargetSchema;

/// Exact-match header patterns per target field
#[derive(Debug, Clone, Default)]
pub struct HeuristicMatcher {
    patterns: Vec<(TargetField, Vec<String>)>,
}

impl HeuristicMatcher {
    pub fn new(patterns: Vec<(TargetField, Vec<String>)>) -> Self {
        let patterns = patterns
            .into_iter()
            .map(|(field, terms)| (field, terms.iter().map(|t| normalize_header(t)).collect()))
            .collect();
        Self { patterns }
    }

    /// Patterns for the active fields of a schema
    pub fn from_schema(schema: &TargetSchema) -> Self {
        Self::new(
            schema
                .active_fields()
                .map(|spec| (spec.field, spec.patterns.clone()))
                .collect(),
        )
    }

    /// Suggest source columns for each field; unmatched fields stay unset
    pub fn suggest(&self, table: &RawTable) -> PartialMapping {
        let normalized: Vec<String> = table.headers.iter().map(|h| normalize_header(h)).collect();
        let mut suggestions = PartialMapping::new();

        for (field, terms) in &self.patterns {
            let matched: Vec<usize> = normalized
                .iter()
                .enumerate()
                .filter(|(_, header)| terms.iter().any(|term| term == *header))
                .map(|(index, _)| index)
                .collect();
            suggestions.set(*field, matched);
        }

        suggestions
    }
}

/// Header text as compared against patterns
pub fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}
