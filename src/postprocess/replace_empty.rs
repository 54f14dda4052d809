use super::Rewrite;
use crate::document::{ModelEntry, SwaggerDocument};
use std::collections::HashMap;
use tracing::debug;

/// Replaces `allOf: [X]` entries with no attributes of their own by `X`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceEmpty;

impl ReplaceEmpty {
    fn renames(doc: &SwaggerDocument) -> HashMap<String, String> {
        let direct: HashMap<String, String> = doc
            .definitions
            .iter()
            .filter_map(|(name, entry)| match entry {
                ModelEntry::Composed(c)
                    if c.parents.len() == 1
                        && c.child.as_ref().map_or(true, |s| s.properties.is_empty()) =>
                {
                    Some((name.clone(), c.parents[0].clone()))
                }
                _ => None,
            })
            .collect();

        // Follow chains so no rename points at a definition being removed.
        let mut resolved = HashMap::with_capacity(direct.len());
        for name in direct.keys() {
            let mut target = &direct[name];
            let mut hops = 0;
            while let Some(next) = direct.get(target) {
                if next == name || hops > direct.len() {
                    break;
                }
                target = next;
                hops += 1;
            }
            if target != name {
                resolved.insert(name.clone(), target.clone());
            }
        }
        resolved
    }
}

impl Rewrite for ReplaceEmpty {
    fn name(&self) -> &'static str {
        "replace-empty"
    }

    fn apply(&self, doc: &mut SwaggerDocument) {
        loop {
            let renames = Self::renames(doc);
            if renames.is_empty() {
                break;
            }
            for (from, to) in &renames {
                debug!(from = %from, to = %to, "empty composition replaced by its parent");
                doc.definitions.remove(from);
            }
            doc.rewrite_refs(&renames);
        }
    }
}
