//! Deterministic category colour assignment
//!
//! Distinct non-empty categories of a merged record set are sorted
//! lexicographically (by code point) and the category at rank `i` takes
//! `palette[i % palette.len()]`. The same set of categories therefore always
//! yields the same table, whatever order the records arrived in.

use crate::app::models::{CategoryColor, CategoryColorTable, NormalizedRecord};
use crate::config::PaletteConfig;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Assigns palette colours to categories
#[derive(Debug, Clone)]
pub struct CategoryColorAssigner {
    palette: Vec<String>,
    hex: BTreeMap<String, String>,
    fallback: String,
}

impl Default for CategoryColorAssigner {
    fn default() -> Self {
        Self::from_config(&PaletteConfig::default())
    }
}

impl CategoryColorAssigner {
    pub fn new(palette: Vec<String>, hex: BTreeMap<String, String>, fallback: String) -> Self {
        Self {
            palette,
            hex,
            fallback,
        }
    }

    pub fn from_config(config: &PaletteConfig) -> Self {
        Self::new(
            config.colors.clone(),
            config.hex.clone(),
            config.fallback.clone(),
        )
    }

    /// Build the colour table for every distinct category in `records`
    pub fn assign(&self, records: &[NormalizedRecord]) -> CategoryColorTable {
        let categories: BTreeSet<&str> = records
            .iter()
            .filter_map(|record| record.category.as_deref())
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .collect();

        self.assign_categories(categories)
    }

    /// Build the colour table for an already collected category set
    pub fn assign_categories<'a>(
        &self,
        categories: impl IntoIterator<Item = &'a str>,
    ) -> CategoryColorTable {
        let sorted: BTreeSet<&str> = categories.into_iter().collect();

        if self.palette.is_empty() {
            warn!("Empty palette; every category gets {}", self.fallback);
        } else if sorted.len() > self.palette.len() {
            debug!(
                "{} categories share a {}-colour palette",
                sorted.len(),
                self.palette.len()
            );
        }

        let entries = sorted
            .into_iter()
            .enumerate()
            .map(|(rank, category)| {
                let color = if self.palette.is_empty() {
                    self.fallback.clone()
                } else {
                    self.palette[rank % self.palette.len()].clone()
                };
                (category.to_string(), self.color(color))
            })
            .collect();

        CategoryColorTable::new(entries, self.color(self.fallback.clone()))
    }

    /// Colour name plus its hex value; unknown names pass through as-is
    fn color(&self, name: String) -> CategoryColor {
        let hex = self.hex.get(&name).cloned().unwrap_or_else(|| name.clone());
        CategoryColor { color: name, hex }
    }
}
