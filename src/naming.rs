//! # Naming Module
//!
//! Stable, collision-free definition names for schema nodes.
//!
//! A name has the form `<package>.<ancestors>.<Class>`: the package comes from
//! the module name (`acme-system` → `acme.system`), the class from the node's
//! local name (`server-group` → `ServerGroup`). Ancestor segments are only
//! inserted when the shorter name is already owned by another node.
//!
//! Copies made by `uses` resolve to the node they were copied from, and a
//! node that is nothing but a single `uses` resolves to its grouping, so
//! shared structure ends up under one name.

use crate::schema::{NodeId, NodeKind, SchemaContext};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::{trace, warn};

static WORD_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("word split pattern is valid"));

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where",
    "while", "async", "await", "dyn",
];

/// Convert a schema identifier to CamelCase.
///
/// ```rust
/// use yang2rest::naming::to_camel_case;
/// assert_eq!(to_camel_case("server-group"), "ServerGroup");
/// assert_eq!(to_camel_case("ipv4.address_v2"), "Ipv4AddressV2");
/// ```
pub fn to_camel_case(s: &str) -> String {
    WORD_SPLIT
        .split(s)
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Class-like name for a local identifier.
///
/// Digit-leading results get a `_` prefix and reserved words a `_` suffix.
pub fn class_name(local: &str) -> String {
    let mut name = to_camel_case(local);
    if name.is_empty() {
        name.push('_');
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if KEYWORDS.contains(&name.to_lowercase().as_str()) {
        name.push('_');
    }
    name
}

/// Package prefix for a module name.
pub fn package_name(module: &str) -> String {
    module
        .to_lowercase()
        .split(['-', '_', '.'])
        .filter(|p| !p.is_empty())
        .map(|p| {
            if p.starts_with(|c: char| c.is_ascii_digit()) {
                format!("_{p}")
            } else {
                p.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Make `name` unique within `seen`, appending `_1`, `_2`, ... on collision.
pub(crate) fn unique_name(seen: &mut HashSet<String>, name: &str) -> String {
    if seen.insert(name.to_string()) {
        return name.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{name}_{counter}");
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Class name of a node; RPC input/output are named after their RPC.
fn node_class_name(ctx: &SchemaContext, id: NodeId) -> String {
    let node = ctx.node(id);
    let suffix = match node.kind {
        NodeKind::Input => Some("Input"),
        NodeKind::Output => Some("Output"),
        _ => None,
    };
    match (suffix, node.parent) {
        (Some(suffix), Some(rpc)) => format!("{}{suffix}", class_name(ctx.node(rpc).name())),
        _ => class_name(node.name()),
    }
}

/// Grouping a node merely stands in for, if it is a pure alias.
///
/// A pure alias has exactly one `uses`, no augmentation, and every child came
/// in through that `uses` without diverging since.
pub fn alias_target(ctx: &SchemaContext, id: NodeId) -> Option<NodeId> {
    let node = ctx.node(id);
    if !node.kind.is_structural() || node.uses.len() != 1 || !node.augmentations.is_empty() {
        return None;
    }
    let all_inherited = node.children.iter().all(|c| {
        let child = ctx.node(*c);
        child.introduced_by == Some(id) && child.original.is_some()
    });
    all_inherited.then(|| node.uses[0])
}

/// Name cache for one compilation run.
#[derive(Debug, Default)]
pub struct NameRegistry {
    names: HashMap<NodeId, String>,
    owners: HashMap<String, NodeId>,
    canonical: HashMap<NodeId, NodeId>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The node whose name and structure `id` shares.
    ///
    /// Follows `original` links to the earliest copy source, then pure-alias
    /// links to groupings, until neither applies.
    pub fn canonical(&mut self, ctx: &SchemaContext, id: NodeId) -> NodeId {
        if let Some(c) = self.canonical.get(&id) {
            return *c;
        }
        let node = ctx.node(id);
        let result = if let Some(original) = node.original {
            self.canonical(ctx, original)
        } else if let Some(grouping) = alias_target(ctx, id) {
            self.canonical(ctx, grouping)
        } else {
            id
        };
        self.canonical.insert(id, result);
        result
    }

    /// Resolve the definition name of `id`; idempotent for the run.
    pub fn resolve(&mut self, ctx: &SchemaContext, id: NodeId) -> String {
        if let Some(name) = self.names.get(&id) {
            return name.clone();
        }
        let canonical = self.canonical(ctx, id);
        let name = if canonical != id {
            self.resolve(ctx, canonical)
        } else {
            let name = self.generate(ctx, id);
            self.owners.insert(name.clone(), id);
            trace!(node = %ctx.schema_path(id), name = %name, "name assigned");
            name
        };
        self.names.insert(id, name.clone());
        name
    }

    /// Node owning `name`, if any.
    fn owner(&self, name: &str) -> Option<NodeId> {
        self.owners.get(name).copied()
    }

    fn generate(&self, ctx: &SchemaContext, id: NodeId) -> String {
        let package = package_name(ctx.node(id).module());
        let class = node_class_name(ctx, id);
        let mut candidate = format!("{package}.{class}");
        if !self.owners.contains_key(&candidate) {
            return candidate;
        }
        let mut segments: Vec<String> = Vec::new();
        for ancestor in ctx.ancestors(id) {
            segments.insert(0, node_class_name(ctx, ancestor).to_lowercase());
            candidate = format!("{package}.{}.{class}", segments.join("."));
            if !self.owners.contains_key(&candidate) {
                return candidate;
            }
        }
        let mut taken: HashSet<String> = self.owners.keys().cloned().collect();
        let fallback = unique_name(&mut taken, &candidate);
        let holder = self
            .owner(&candidate)
            .map(|owner| ctx.schema_path(owner))
            .unwrap_or_default();
        warn!(
            node = %ctx.schema_path(id),
            name = %fallback,
            taken_by = %holder,
            "name collision not resolved by ancestors, using numeric suffix"
        );
        fallback
    }
}
