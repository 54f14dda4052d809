use super::Rewrite;
use crate::document::{ModelEntry, SwaggerDocument};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Merges composed entries that consist of the same parent set and nothing
/// else.
///
/// The shortest name in each group survives (ties go to the
/// lexicographically smaller one); every reference to the others is
/// rewritten to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollapseDuplicates;

/// Order-independent signature of a parent set.
pub fn parent_signature(parents: &[String]) -> String {
    let mut sorted: Vec<&str> = parents.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    let mut hasher = Sha256::new();
    for parent in sorted {
        hasher.update(parent.as_bytes());
        hasher.update([0u8]);
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

impl CollapseDuplicates {
    fn renames(doc: &SwaggerDocument) -> HashMap<String, String> {
        let mut groups: BTreeMap<String, Vec<&String>> = BTreeMap::new();
        for (name, entry) in &doc.definitions {
            if let ModelEntry::Composed(c) = entry {
                if c.child.is_none() && !c.parents.is_empty() {
                    groups
                        .entry(parent_signature(&c.parents))
                        .or_default()
                        .push(name);
                }
            }
        }
        let mut renames = HashMap::new();
        for members in groups.values().filter(|m| m.len() > 1) {
            let Some(survivor) = members
                .iter()
                .copied()
                .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
            else {
                continue;
            };
            for member in members.iter().copied() {
                if member != survivor {
                    renames.insert(member.clone(), survivor.clone());
                }
            }
        }
        renames
    }
}

impl Rewrite for CollapseDuplicates {
    fn name(&self) -> &'static str {
        "collapse-duplicates"
    }

    fn apply(&self, doc: &mut SwaggerDocument) {
        loop {
            let renames = Self::renames(doc);
            if renames.is_empty() {
                break;
            }
            for (from, to) in &renames {
                debug!(from = %from, to = %to, "duplicate composition collapsed");
                doc.definitions.remove(from);
            }
            doc.rewrite_refs(&renames);
        }
    }
}
