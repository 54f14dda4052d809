use super::Rewrite;
use crate::document::{ModelEntry, SwaggerDocument};

/// Sorts the parent lists of composed entries for stable output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortModels;

impl Rewrite for SortModels {
    fn name(&self) -> &'static str {
        "sort-models"
    }

    fn apply(&self, doc: &mut SwaggerDocument) {
        for entry in doc.definitions.values_mut() {
            if let ModelEntry::Composed(c) = entry {
                c.parents.sort();
            }
        }
    }
}
