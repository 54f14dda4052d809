//! # Types Module
//!
//! Maps leaf types to property schemas.
//!
//! Built-in types go through [`BUILTIN_TYPES`]. Typedefs are followed to
//! their base type, and a `leafref` takes on the base type of the leaf it
//! points at and records its path under `x-path`. Anything unrecognised
//! becomes a plain string and is logged.

use crate::document::{Schema, SchemaType};
use crate::schema::source::TypeSource;
use crate::schema::{NodeId, NodeKind, SchemaContext, Typedef};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

/// Vendor extension recording the path of a `leafref`.
pub const X_PATH: &str = "x-path";

/// Typedef and leafref chains longer than this are treated as cycles.
const MAX_TYPE_DEPTH: usize = 32;

/// Built-in type name, JSON type, format.
///
/// Widths decide wire compatibility, so every built-in is listed here.
pub const BUILTIN_TYPES: &[(&str, SchemaType, Option<&str>)] = &[
    ("int8", SchemaType::Integer, Some("int32")),
    ("int16", SchemaType::Integer, Some("int32")),
    ("int32", SchemaType::Integer, Some("int32")),
    ("uint8", SchemaType::Integer, Some("int32")),
    ("uint16", SchemaType::Integer, Some("int32")),
    ("uint32", SchemaType::Integer, Some("int64")),
    ("int64", SchemaType::Integer, Some("int64")),
    ("uint64", SchemaType::Integer, Some("int64")),
    ("decimal64", SchemaType::Number, Some("double")),
    ("boolean", SchemaType::Boolean, None),
    ("empty", SchemaType::Boolean, None),
    ("binary", SchemaType::String, Some("byte")),
    ("string", SchemaType::String, None),
    ("bits", SchemaType::String, None),
    ("identityref", SchemaType::String, None),
    ("instance-identifier", SchemaType::String, None),
    ("union", SchemaType::String, None),
    ("enumeration", SchemaType::String, None),
];

static PREDICATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("predicate pattern is valid"));

fn string_schema() -> Schema {
    Schema::of_type(SchemaType::String)
}

/// Converts leaf and leaf-list types for one schema context.
#[derive(Debug, Clone, Copy)]
pub struct TypeConverter<'c> {
    ctx: &'c SchemaContext,
}

impl<'c> TypeConverter<'c> {
    pub fn new(ctx: &'c SchemaContext) -> Self {
        TypeConverter { ctx }
    }

    /// Full property schema of a leaf or leaf-list, with description and
    /// default. Leaf-lists become arrays of the base type.
    pub fn property(&self, id: NodeId) -> Schema {
        let node = self.ctx.node(id);
        let mut base = self.convert(id);
        if let Some(default) = node.leaf_info().and_then(|i| i.default.clone()) {
            base.default = Some(default);
        }
        if node.description.is_some() {
            base.description = node.description.clone();
        }
        match node.kind {
            NodeKind::LeafList(_) => {
                let description = base.description.take();
                let mut array = Schema::array_of(base);
                array.description = description;
                array
            }
            _ => base,
        }
    }

    /// Base type of a leaf, as used for path parameters.
    pub fn convert(&self, id: NodeId) -> Schema {
        self.convert_at(id, 0)
    }

    fn convert_at(&self, id: NodeId, depth: usize) -> Schema {
        let node = self.ctx.node(id);
        match node.leaf_info() {
            Some(info) => {
                let module = self.defining_module(id);
                self.resolve(&info.type_ref, module, id, depth)
            }
            None => {
                warn!(
                    node = %self.ctx.schema_path(id),
                    kind = node.kind.keyword(),
                    "type requested for a non-leaf node, using string"
                );
                string_schema()
            }
        }
    }

    /// Module whose typedefs are in scope: that of the node a copy came from.
    fn defining_module(&self, id: NodeId) -> &'c str {
        self.ctx.node(self.origin(id)).module()
    }

    fn origin(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(original) = self.ctx.node(current).original {
            current = original;
        }
        current
    }

    fn in_grouping(&self, id: NodeId) -> bool {
        self.ctx
            .ancestors(id)
            .any(|a| matches!(self.ctx.node(a).kind, NodeKind::Grouping))
    }

    fn resolve(&self, ty: &TypeSource, module: &str, scope: NodeId, depth: usize) -> Schema {
        if depth > MAX_TYPE_DEPTH {
            warn!(
                node = %self.ctx.schema_path(scope),
                r#type = ty.name(),
                "type chain too deep, using string"
            );
            return string_schema();
        }
        let spec = match ty {
            TypeSource::Spec(spec) => Some(spec),
            TypeSource::Name(_) => None,
        };
        let name = ty.name();
        let mut schema = if name == "leafref" {
            self.leafref(spec.and_then(|s| s.path.as_deref()), module, scope, depth)
        } else if let Some((_, schema_type, format)) =
            BUILTIN_TYPES.iter().find(|(n, _, _)| *n == name)
        {
            match format {
                Some(format) => Schema::with_format(*schema_type, format),
                None => Schema::of_type(*schema_type),
            }
        } else if let Some((typedef, typedef_module)) = self.typedef(name, module) {
            let mut resolved = self.resolve(&typedef.type_ref, typedef_module, scope, depth + 1);
            if resolved.description.is_none() {
                resolved.description = typedef.description.clone();
            }
            if resolved.default.is_none() {
                resolved.default = typedef.default.clone();
            }
            resolved
        } else {
            warn!(
                node = %self.ctx.schema_path(scope),
                r#type = name,
                "unknown type, using string"
            );
            string_schema()
        };
        if let Some(spec) = spec {
            if !spec.enumeration.is_empty() {
                schema.enumeration = spec.enumeration.clone();
            }
            if spec.pattern.is_some() {
                schema.pattern = spec.pattern.clone();
            }
        }
        schema
    }

    /// Typedef named `name` (optionally `prefix:name`) visible from `module`.
    fn typedef(&self, name: &str, module: &str) -> Option<(&'c Typedef, &'c str)> {
        let (module, local) = match name.split_once(':') {
            Some((prefix, local)) => {
                let m = self
                    .ctx
                    .module_by_prefix(prefix)
                    .or_else(|| self.ctx.module(prefix))?;
                (m, local)
            }
            None => (self.ctx.module(module)?, name),
        };
        module
            .typedefs
            .get(local)
            .map(|t| (t, module.name.as_str()))
    }

    fn leafref(&self, path: Option<&str>, module: &str, scope: NodeId, depth: usize) -> Schema {
        let Some(path) = path else {
            warn!(node = %self.ctx.schema_path(scope), "leafref without path, using string");
            return string_schema();
        };
        let usable = |t: &NodeId| *t != scope && self.ctx.node(*t).leaf_info().is_some();
        let target = self
            .resolve_path(path, module, scope)
            .filter(usable)
            .or_else(|| self.resolve_from_copies(path, module, scope, &usable));
        let mut schema = match target {
            Some(target) => {
                let mut base = self.convert_at(target, depth + 1);
                base.description = None;
                base.default = None;
                base
            }
            None => {
                warn!(
                    node = %self.ctx.schema_path(scope),
                    path,
                    "leafref target not found, using string"
                );
                string_schema()
            }
        };
        schema
            .extensions
            .insert(X_PATH.to_string(), Value::String(path.to_string()));
        schema
    }

    /// A relative path inside a grouping may leave the grouping; walk it from
    /// the first data-tree copy where it resolves.
    fn resolve_from_copies(
        &self,
        path: &str,
        module: &str,
        scope: NodeId,
        usable: &dyn Fn(&NodeId) -> bool,
    ) -> Option<NodeId> {
        if !self.in_grouping(scope) {
            return None;
        }
        let (copy, target) = self
            .ctx
            .nodes()
            .filter(|n| n.id != scope && !self.in_grouping(n.id) && self.origin(n.id) == scope)
            .find_map(|n| {
                self.resolve_path(path, module, n.id)
                    .filter(usable)
                    .map(|t| (n.id, t))
            })?;
        debug!(
            node = %self.ctx.schema_path(scope),
            copy = %self.ctx.schema_path(copy),
            path,
            "grouping leafref resolved through a copy"
        );
        Some(target)
    }

    /// Walk a leafref path from `scope`. Predicates are ignored and
    /// choice/case levels are looked through.
    fn resolve_path(&self, path: &str, module: &str, scope: NodeId) -> Option<NodeId> {
        let stripped = PREDICATE.replace_all(path, "");
        let mut segments = stripped
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != ".");
        let mut current = if stripped.starts_with('/') {
            let first = segments.next()?;
            let (root_module, local) = match first.split_once(':') {
                Some((prefix, local)) => {
                    let m = self
                        .ctx
                        .module_by_prefix(prefix)
                        .or_else(|| self.ctx.module(prefix))?;
                    (m, local)
                }
                None => (self.ctx.module(module)?, first),
            };
            root_module
                .data
                .iter()
                .copied()
                .find(|id| self.ctx.node(*id).name() == local)?
        } else {
            scope
        };
        for segment in segments {
            current = if segment == ".." {
                self.ctx.data_parent(current)?
            } else {
                let local = segment.split_once(':').map_or(segment, |(_, l)| l);
                self.ctx.data_child_named(current, local)?
            };
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{load_schema_str, SourceFormat};
    use serde_json::json;

    const SCHEMA: &str = r#"
modules:
  - name: acme
    prefix: ac
    typedefs:
      - name: port-number
        type: uint16
        description: A TCP port.
        default: 80
      - name: service-port
        type: ac:port-number
    data:
      - kind: container
        name: system
        children:
          - { kind: leaf, name: counter, type: uint64 }
          - { kind: leaf, name: ratio, type: decimal64 }
          - { kind: leaf, name: blob, type: binary }
          - { kind: leaf, name: flag, type: empty }
          - { kind: leaf, name: port, type: service-port }
          - { kind: leaf, name: colour, type: rgb-triplet }
          - kind: leaf
            name: mode
            type: { name: enumeration, enum: [fast, slow] }
          - kind: leaf
            name: label
            type: { name: string, pattern: "[a-z]+" }
          - { kind: leaf-list, name: tags, type: string, description: Free-form tags. }
          - kind: list
            name: server
            key: [name]
            children:
              - { kind: leaf, name: name, type: string }
              - { kind: leaf, name: port, type: int8 }
          - kind: leaf
            name: default-server
            type: { name: leafref, path: "../server/name" }
          - kind: leaf
            name: default-port
            type: { name: leafref, path: "/ac:system/ac:server[ac:name = current()/../default-server]/ac:port" }
          - kind: leaf
            name: broken
            type: { name: leafref, path: "../nowhere" }
"#;

    fn leaf(ctx: &SchemaContext, name: &str) -> NodeId {
        let system = ctx.module("acme").unwrap().data[0];
        ctx.child_named(system, name).unwrap()
    }

    #[test]
    fn test_width_table() {
        let ctx = load_schema_str(SCHEMA, SourceFormat::Yaml).unwrap();
        let conv = TypeConverter::new(&ctx);
        let v = |n| serde_json::to_value(conv.convert(leaf(&ctx, n))).unwrap();
        assert_eq!(v("counter"), json!({ "type": "integer", "format": "int64" }));
        assert_eq!(v("ratio"), json!({ "type": "number", "format": "double" }));
        assert_eq!(v("blob"), json!({ "type": "string", "format": "byte" }));
        assert_eq!(v("flag"), json!({ "type": "boolean" }));
    }

    #[test]
    fn test_typedef_chain_keeps_description_and_default() {
        let ctx = load_schema_str(SCHEMA, SourceFormat::Yaml).unwrap();
        let conv = TypeConverter::new(&ctx);
        let schema = conv.property(leaf(&ctx, "port"));
        assert_eq!(
            serde_json::to_value(schema).unwrap(),
            json!({ "type": "integer", "format": "int32", "description": "A TCP port.", "default": 80 })
        );
    }

    #[test]
    fn test_enumeration_pattern_and_leaf_list() {
        let ctx = load_schema_str(SCHEMA, SourceFormat::Yaml).unwrap();
        let conv = TypeConverter::new(&ctx);
        let mode = conv.convert(leaf(&ctx, "mode"));
        assert_eq!(mode.enumeration, vec!["fast", "slow"]);
        let label = conv.convert(leaf(&ctx, "label"));
        assert_eq!(label.pattern.as_deref(), Some("[a-z]+"));
        let tags = serde_json::to_value(conv.property(leaf(&ctx, "tags"))).unwrap();
        assert_eq!(
            tags,
            json!({ "type": "array", "description": "Free-form tags.", "items": { "type": "string" } })
        );
    }

    #[test]
    fn test_leafref_relative_and_absolute() {
        let ctx = load_schema_str(SCHEMA, SourceFormat::Yaml).unwrap();
        let conv = TypeConverter::new(&ctx);
        let relative = serde_json::to_value(conv.convert(leaf(&ctx, "default-server"))).unwrap();
        assert_eq!(relative, json!({ "type": "string", "x-path": "../server/name" }));
        let absolute = conv.convert(leaf(&ctx, "default-port"));
        assert_eq!(absolute.schema_type, Some(SchemaType::Integer));
        assert_eq!(absolute.format.as_deref(), Some("int32"));
        assert!(absolute.extensions.contains_key(X_PATH));
    }

    #[test]
    fn test_degrades_to_string() {
        let ctx = load_schema_str(SCHEMA, SourceFormat::Yaml).unwrap();
        let conv = TypeConverter::new(&ctx);
        let unknown = conv.convert(leaf(&ctx, "colour"));
        assert_eq!(unknown, Schema::of_type(SchemaType::String));
        let broken = conv.convert(leaf(&ctx, "broken"));
        assert_eq!(broken.schema_type, Some(SchemaType::String));
        assert_eq!(broken.extensions.get(X_PATH), Some(&json!("../nowhere")));
    }

    #[test]
    fn test_grouping_leafref_resolves_through_its_copies() {
        let ctx = load_schema_str(
            r#"
modules:
  - name: acme
    groupings:
      - name: peering
        children:
          - kind: leaf
            name: peer
            type: { name: leafref, path: "../id" }
    data:
      - kind: list
        name: node
        key: [id]
        uses: [peering]
        children:
          - { kind: leaf, name: id, type: uint8 }
"#,
            SourceFormat::Yaml,
        )
        .unwrap();
        let grouping = ctx.module("acme").unwrap().groupings[0];
        let peer = ctx.child_named(grouping, "peer").unwrap();
        let schema = serde_json::to_value(TypeConverter::new(&ctx).convert(peer)).unwrap();
        assert_eq!(
            schema,
            json!({ "type": "integer", "format": "int32", "x-path": "../id" })
        );
    }
}
