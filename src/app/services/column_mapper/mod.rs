//! Column mapping from heterogeneous source headers onto the target schema
//!
//! Mapping happens once per file, before any row is normalised, and is split
//! into two independent capabilities:
//! - [`heuristic`] - exact header-term matching that suggests a partial mapping
//! - [`resolver`] - turning suggestions into a final mapping, either in batch
//!   (accept suggestions, fail closed on required fields) or by asking an
//!   operator through any [`ColumnResolver`] implementation
//! - [`selection`] - parsing operator column selections such as `2` or `0+3`
//!
//! ## Usage
//!
//! ```rust
//! use facility_merger::app::models::RawTable;
//! use facility_merger::app::services::column_mapper::{
//!     BatchResolver, ColumnMapper, MappingRequest, Resolution,
//! };
//! use facility_merger::config::TargetSchema;
//!
//! # fn example() -> facility_merger::Result<()> {
//! let schema = TargetSchema::default();
//! let mapper = ColumnMapper::new(&schema);
//! let table = RawTable::new(
//!     vec!["名称".into(), "緯度".into(), "経度".into()],
//!     vec![vec!["中央公園".into(), "35.6".into(), "139.7".into()]],
//! );
//!
//! let suggestions = mapper.suggest(&table);
//! let mut resolver = BatchResolver::from_schema(&schema);
//! let request = MappingRequest::new("parks.csv", "utf-8", &table, &suggestions);
//! assert!(matches!(mapper.resolve(&request, &mut resolver)?, Resolution::Mapped(_)));
//! # Ok(())
//! # }
//! ```

pub mod heuristic;
pub mod resolver;
pub mod selection;

#[cfg(test)]
pub mod tests;

pub use heuristic::HeuristicMatcher;
pub use resolver::{BatchResolver, ColumnResolver, MappingRequest, Resolution};
pub use selection::{SelectionInput, parse_selection};

use crate::Result;
use crate::app::models::{PartialMapping, RawTable, TargetField};
use crate::config::TargetSchema;
use tracing::debug;

/// Schema-aware entry point for suggesting and resolving column mappings
#[derive(Debug, Clone)]
pub struct ColumnMapper {
    matcher: HeuristicMatcher,
    fields: Vec<TargetField>,
}

impl ColumnMapper {
    pub fn new(schema: &TargetSchema) -> Self {
        Self {
            matcher: HeuristicMatcher::from_schema(schema),
            fields: schema.active_fields().map(|spec| spec.field).collect(),
        }
    }

    /// Target fields in prompt order
    pub fn fields(&self) -> &[TargetField] {
        &self.fields
    }

    /// Heuristic suggestions from header names
    pub fn suggest(&self, table: &RawTable) -> PartialMapping {
        let suggestions = self.matcher.suggest(table);
        debug!(
            "Suggested {} of {} fields from headers",
            suggestions.iter().count(),
            self.fields.len()
        );
        suggestions
    }

    /// Resolve the final mapping through the given resolver
    pub fn resolve(
        &self,
        request: &MappingRequest<'_>,
        resolver: &mut dyn ColumnResolver,
    ) -> Result<Resolution> {
        resolver.resolve(request, &self.fields)
    }
}
