use crate::document::{RefKind, SwaggerDocument};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Outgoing edges of one definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeNode {
    /// Definitions referenced as property values.
    pub uses: BTreeSet<String>,
    /// Definitions referenced as composition parents.
    pub references: BTreeSet<String>,
}

impl TypeNode {
    pub fn edges(&self) -> impl Iterator<Item = &String> {
        self.uses.iter().chain(self.references.iter())
    }
}

/// Reference graph of a document's definitions.
///
/// Roots are the definitions referenced straight from path operations.
#[derive(Debug, Clone, Default)]
pub struct UsageGraph {
    nodes: BTreeMap<String, TypeNode>,
    roots: BTreeSet<String>,
}

impl UsageGraph {
    pub fn build(doc: &SwaggerDocument) -> Self {
        let mut nodes = BTreeMap::new();
        for (name, entry) in &doc.definitions {
            let mut node = TypeNode::default();
            entry.visit_refs(&mut |kind, target| {
                match kind {
                    RefKind::Uses => node.uses.insert(target.to_string()),
                    RefKind::References => node.references.insert(target.to_string()),
                };
            });
            nodes.insert(name.clone(), node);
        }
        let roots = doc.path_references().into_iter().collect();
        UsageGraph { nodes, roots }
    }

    pub fn node(&self, name: &str) -> Option<&TypeNode> {
        self.nodes.get(name)
    }

    pub fn roots(&self) -> &BTreeSet<String> {
        &self.roots
    }

    /// Definitions reachable from a root over either edge kind.
    pub fn live(&self) -> BTreeSet<String> {
        let mut live = BTreeSet::new();
        let mut queue: VecDeque<&String> = self.roots.iter().collect();
        while let Some(name) = queue.pop_front() {
            if !live.insert(name.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get(name) {
                queue.extend(node.edges().filter(|e| !live.contains(*e)));
            }
        }
        live
    }

    /// Definitions that are neither roots nor reachable from one.
    pub fn unused(&self) -> Vec<String> {
        let live = self.live();
        self.nodes
            .keys()
            .filter(|n| !live.contains(*n))
            .cloned()
            .collect()
    }
}
