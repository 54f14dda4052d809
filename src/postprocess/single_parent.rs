use super::Rewrite;
use crate::document::{ModelEntry, Schema, SwaggerDocument};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Reduces every composition to a single parent.
///
/// Parents after the first are unpacked into the entry's own attributes,
/// for consumers that cannot express multiple inheritance. Attributes the
/// entry declares itself win over inherited ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleParent;

/// Properties and required names a definition carries, inherited included.
fn effective_attributes(
    doc: &SwaggerDocument,
    name: &str,
    properties: &mut BTreeMap<String, Schema>,
    required: &mut Vec<String>,
    seen: &mut HashSet<String>,
) {
    if !seen.insert(name.to_string()) {
        return;
    }
    let own = match doc.definitions.get(name) {
        Some(ModelEntry::Simple(schema)) => Some(schema),
        Some(ModelEntry::Composed(c)) => {
            for parent in &c.parents {
                effective_attributes(doc, parent, properties, required, seen);
            }
            c.child.as_ref()
        }
        None => None,
    };
    if let Some(own) = own {
        for (key, prop) in &own.properties {
            properties.insert(key.clone(), prop.clone());
        }
        required.extend(own.required.iter().cloned());
    }
}

impl Rewrite for SingleParent {
    fn name(&self) -> &'static str {
        "single-parent"
    }

    fn apply(&self, doc: &mut SwaggerDocument) {
        let targets: Vec<String> = doc
            .definitions
            .iter()
            .filter_map(|(name, entry)| {
                entry
                    .as_composed()
                    .filter(|c| c.parents.len() > 1)
                    .map(|_| name.clone())
            })
            .collect();

        for name in targets {
            let Some(ModelEntry::Composed(entry)) = doc.definitions.get(&name) else {
                continue;
            };
            let mut properties = BTreeMap::new();
            let mut required = Vec::new();
            let mut seen = HashSet::from([name.clone()]);
            for parent in &entry.parents[1..] {
                effective_attributes(doc, parent, &mut properties, &mut required, &mut seen);
            }
            let mut child = entry.child.clone().unwrap_or_else(|| Schema::object(BTreeMap::new()));
            for (key, prop) in properties {
                child.properties.entry(key).or_insert(prop);
            }
            for r in required {
                if !child.required.contains(&r) {
                    child.required.push(r);
                }
            }
            if let Some(ModelEntry::Composed(entry)) = doc.definitions.get_mut(&name) {
                entry.parents.truncate(1);
                entry.child = Some(child);
            }
            debug!(name = %name, "composition reduced to a single parent");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postprocess::fixtures::*;

    #[test]
    fn test_extra_parents_are_unpacked() {
        let mut doc = doc_rooted_at(&["x.Node"]);
        doc.definitions.insert("x.A".to_string(), simple(&[("a", string())]));
        doc.definitions.insert("x.B".to_string(), simple(&[("b", string())]));
        doc.definitions.insert("x.C".to_string(), composed(&["x.B"], Some(Schema::object(
            [("c".to_string(), string())].into(),
        ))));
        doc.definitions.insert(
            "x.Node".to_string(),
            composed(&["x.A", "x.C"], Some(Schema::object(
                [("own".to_string(), string())].into(),
            ))),
        );

        SingleParent.apply(&mut doc);

        let node = doc.definitions["x.Node"].as_composed().unwrap();
        assert_eq!(node.parents, vec!["x.A"]);
        let keys: Vec<_> = node.child.as_ref().unwrap().properties.keys().cloned().collect();
        assert_eq!(keys, vec!["b", "c", "own"]);
        assert!(doc.check_references().is_ok());
    }

    #[test]
    fn test_single_parent_entries_untouched() {
        let mut doc = doc_rooted_at(&["x.Node"]);
        doc.definitions.insert("x.A".to_string(), simple(&[]));
        doc.definitions.insert("x.Node".to_string(), composed(&["x.A"], None));
        let before = doc.clone();
        SingleParent.apply(&mut doc);
        assert_eq!(doc, before);
    }
}
