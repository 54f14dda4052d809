use super::source::TypeSource;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Index of a node in the [`SchemaContext`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Module-qualified identifier of a schema node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub module: String,
    pub name: String,
    pub revision: Option<String>,
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.name)
    }
}

/// Leaf payload shared by leaves and leaf-lists.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafInfo {
    pub type_ref: TypeSource,
    pub mandatory: bool,
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Container { presence: bool },
    List { keys: Vec<String> },
    Leaf(LeafInfo),
    LeafList(LeafInfo),
    Choice,
    Case,
    Grouping,
    Rpc,
    Input,
    Output,
    Augmentation { target: NodeId },
}

impl NodeKind {
    /// Kinds that hold children and become named definitions.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            NodeKind::Container { .. }
                | NodeKind::List { .. }
                | NodeKind::Grouping
                | NodeKind::Input
                | NodeKind::Output
        )
    }

    /// Kinds that are transparent in data paths and models.
    pub fn is_choice_or_case(&self) -> bool {
        matches!(self, NodeKind::Choice | NodeKind::Case)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            NodeKind::Container { .. } => "container",
            NodeKind::List { .. } => "list",
            NodeKind::Leaf(_) => "leaf",
            NodeKind::LeafList(_) => "leaf-list",
            NodeKind::Choice => "choice",
            NodeKind::Case => "case",
            NodeKind::Grouping => "grouping",
            NodeKind::Rpc => "rpc",
            NodeKind::Input => "input",
            NodeKind::Output => "output",
            NodeKind::Augmentation { .. } => "augment",
        }
    }
}

/// One node of the effective schema tree.
///
/// `uses` content is already expanded into `children` as copies. A copy keeps
/// an `original` link to the node it was copied from until an augmentation
/// makes it diverge.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub id: NodeId,
    pub qname: QName,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// Effective configuration flag after inheritance.
    pub config: bool,
    /// The `config` statement as written, if any.
    pub config_stmt: Option<bool>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub children: Vec<NodeId>,
    /// Groupings this node uses, in declaration order.
    pub uses: Vec<NodeId>,
    /// Augmentations applied to this node.
    pub augmentations: Vec<NodeId>,
    /// Node whose `uses` statement introduced this copy.
    pub introduced_by: Option<NodeId>,
    /// Node this one was copied from.
    pub original: Option<NodeId>,
    /// Grouping named by the `uses` that brought this copy in.
    pub via_grouping: Option<NodeId>,
    /// Module whose augmentation added this node.
    pub augmented_by: Option<String>,
}

impl SchemaNode {
    pub fn name(&self) -> &str {
        &self.qname.name
    }

    pub fn module(&self) -> &str {
        &self.qname.module
    }

    pub fn leaf_info(&self) -> Option<&LeafInfo> {
        match &self.kind {
            NodeKind::Leaf(info) | NodeKind::LeafList(info) => Some(info),
            _ => None,
        }
    }

    pub fn keys(&self) -> &[String] {
        match &self.kind {
            NodeKind::List { keys } => keys,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Typedef {
    pub name: String,
    pub type_ref: TypeSource,
    pub description: Option<String>,
    pub default: Option<Value>,
}

/// A loaded module and the roots it owns.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub prefix: String,
    pub namespace: Option<String>,
    pub revision: Option<String>,
    pub description: Option<String>,
    pub typedefs: HashMap<String, Typedef>,
    pub groupings: Vec<NodeId>,
    pub data: Vec<NodeId>,
    pub rpcs: Vec<NodeId>,
    pub augments: Vec<NodeId>,
}

/// The effective schema forest of one compilation run.
///
/// Read-only once built; the compiler never mutates it.
#[derive(Debug, Clone, Default)]
pub struct SchemaContext {
    pub(crate) nodes: Vec<SchemaNode>,
    pub(crate) modules: Vec<Module>,
}

impl SchemaContext {
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.index()]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.iter()
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn module_by_prefix(&self, prefix: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.prefix == prefix)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Ancestors from the nearest parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
    }

    /// Direct child by local name (schema tree, choice/case are visible).
    pub fn child_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .find(|c| self.node(*c).name() == name)
    }

    /// Child by local name in the data tree: choice/case are looked through.
    pub fn data_child_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        for child in &self.node(id).children {
            let node = self.node(*child);
            if node.kind.is_choice_or_case() {
                if let Some(found) = self.data_child_named(*child, name) {
                    return Some(found);
                }
            } else if node.name() == name {
                return Some(*child);
            }
        }
        None
    }

    /// Nearest ancestor that is a data node (not choice/case).
    pub fn data_parent(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|a| !self.node(*a).kind.is_choice_or_case())
    }

    /// `/module:a/b/c` style path used in log and error messages.
    pub fn schema_path(&self, id: NodeId) -> String {
        let mut names: Vec<&str> = self.ancestors(id).map(|a| self.node(a).name()).collect();
        names.reverse();
        names.push(self.node(id).name());
        format!("/{}:{}", self.node(id).module(), names.join("/"))
    }
}
