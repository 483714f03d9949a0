//! Resolution of suggested mappings into final per-file mappings

use crate::Result;
use crate::app::models::{ColumnMapping, PartialMapping, RawTable, TargetField};
use crate::config::TargetSchema;
use tracing::{debug, info};

/// Everything a resolver may show or consult for one file
#[derive(Debug, Clone, Copy)]
pub struct MappingRequest<'a> {
    pub file_name: &'a str,
    pub encoding: &'a str,
    pub table: &'a RawTable,
    pub suggestions: &'a PartialMapping,
}

impl<'a> MappingRequest<'a> {
    pub fn new(
        file_name: &'a str,
        encoding: &'a str,
        table: &'a RawTable,
        suggestions: &'a PartialMapping,
    ) -> Self {
        Self {
            file_name,
            encoding,
            table,
            suggestions,
        }
    }
}

/// Outcome of resolving one file's mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Final mapping for the file
    Mapped(ColumnMapping),
    /// Operator asked to exclude the file
    SkipFile,
    /// Required fields could not be mapped
    Unmapped(Vec<TargetField>),
}

/// Source of final column mappings
///
/// Implementations may block on a human. Returning an error aborts the run
/// only when the error is fatal (an interrupt); other errors skip the file.
pub trait ColumnResolver {
    /// Decide the mapping for `fields` (in prompt order)
    fn resolve(
        &mut self,
        request: &MappingRequest<'_>,
        fields: &[TargetField],
    ) -> Result<Resolution>;

    /// Asked after each merged file; `false` stops the run early
    fn continue_after(&mut self, _file_name: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Non-interactive resolver: accept suggestions, fail closed on required fields
#[derive(Debug, Clone, Default)]
pub struct BatchResolver {
    required: Vec<TargetField>,
}

impl BatchResolver {
    pub fn new(required: Vec<TargetField>) -> Self {
        Self { required }
    }

    pub fn from_schema(schema: &TargetSchema) -> Self {
        Self::new(schema.required_fields().collect())
    }
}

impl ColumnResolver for BatchResolver {
    fn resolve(
        &mut self,
        request: &MappingRequest<'_>,
        fields: &[TargetField],
    ) -> Result<Resolution> {
        let mut partial = PartialMapping::new();
        for &field in fields {
            if let Some(columns) = request.suggestions.get(field) {
                partial.set(field, columns.to_vec());
            }
        }

        let missing: Vec<TargetField> = self
            .required
            .iter()
            .copied()
            .filter(|field| fields.contains(field) && partial.get(*field).is_none())
            .collect();

        if !missing.is_empty() {
            info!(
                "Skipping {}: no header matched required fields {:?}",
                request.file_name, missing
            );
            return Ok(Resolution::Unmapped(missing));
        }

        debug!("Accepted suggested mapping for {}", request.file_name);
        Ok(Resolution::Mapped(partial.into_mapping()))
    }
}
