use super::source::{AugmentSource, IoSource, ModuleSource, NodeSource, RpcSource};
use super::types::{
    LeafInfo, Module, NodeId, NodeKind, QName, SchemaContext, SchemaNode, Typedef,
};
use crate::error::SchemaError;
use std::collections::HashMap;
use tracing::debug;

impl SchemaContext {
    /// Build the effective schema forest from source modules.
    ///
    /// Groupings are instantiated on first use, `uses` statements are expanded
    /// into copies, and augmentations are applied in declaration order once
    /// every module's data tree exists.
    pub fn from_sources(sources: &[ModuleSource]) -> Result<SchemaContext, SchemaError> {
        ContextBuilder::new(sources)?.build()
    }
}

struct ContextBuilder<'s> {
    sources: &'s [ModuleSource],
    source_index: HashMap<&'s str, usize>,
    ctx: SchemaContext,
    groupings: HashMap<(String, String), NodeId>,
    in_progress: Vec<(String, String)>,
}

impl<'s> ContextBuilder<'s> {
    fn new(sources: &'s [ModuleSource]) -> Result<Self, SchemaError> {
        let mut source_index = HashMap::new();
        let mut modules = Vec::with_capacity(sources.len());
        for (idx, src) in sources.iter().enumerate() {
            if source_index.insert(src.name.as_str(), idx).is_some() {
                return Err(SchemaError::DuplicateModule {
                    module: src.name.clone(),
                });
            }
            let typedefs = src
                .typedefs
                .iter()
                .map(|t| {
                    (
                        t.name.clone(),
                        Typedef {
                            name: t.name.clone(),
                            type_ref: t.type_ref.clone(),
                            description: t.description.clone(),
                            default: t.default.clone(),
                        },
                    )
                })
                .collect();
            modules.push(Module {
                name: src.name.clone(),
                prefix: src.prefix.clone().unwrap_or_else(|| src.name.clone()),
                namespace: src.namespace.clone(),
                revision: src.revision.clone(),
                description: src.description.clone(),
                typedefs,
                groupings: Vec::new(),
                data: Vec::new(),
                rpcs: Vec::new(),
                augments: Vec::new(),
            });
        }
        Ok(ContextBuilder {
            sources,
            source_index,
            ctx: SchemaContext {
                nodes: Vec::new(),
                modules,
            },
            groupings: HashMap::new(),
            in_progress: Vec::new(),
        })
    }

    fn build(mut self) -> Result<SchemaContext, SchemaError> {
        let sources = self.sources;
        for (idx, src) in sources.iter().enumerate() {
            for grouping in &src.groupings {
                let location = format!("/{}", src.name);
                self.ensure_grouping(&src.name, &grouping.name, &location)?;
            }
            for data in &src.data {
                let id = self.build_node(data, None, &src.name)?;
                self.ctx.modules[idx].data.push(id);
            }
            for rpc in &src.rpcs {
                let id = self.build_rpc(rpc, &src.name)?;
                self.ctx.modules[idx].rpcs.push(id);
            }
        }
        for (idx, src) in sources.iter().enumerate() {
            for augment in &src.augments {
                let id = self.apply_augment(augment, &src.name)?;
                self.ctx.modules[idx].augments.push(id);
            }
        }
        debug!(
            modules = self.ctx.modules.len(),
            nodes = self.ctx.nodes.len(),
            "schema context built"
        );
        Ok(self.ctx)
    }

    #[allow(clippy::too_many_arguments)]
    fn alloc(
        &mut self,
        module: &str,
        name: &str,
        kind: NodeKind,
        parent: Option<NodeId>,
        config_stmt: Option<bool>,
        description: Option<String>,
        reference: Option<String>,
    ) -> NodeId {
        let id = NodeId(self.ctx.nodes.len() as u32);
        let inherited = parent.map(|p| self.ctx.node(p).config).unwrap_or(true);
        let revision = self
            .ctx
            .module(module)
            .and_then(|m| m.revision.clone());
        self.ctx.nodes.push(SchemaNode {
            id,
            qname: QName {
                module: module.to_string(),
                name: name.to_string(),
                revision,
            },
            kind,
            parent,
            config: inherited && config_stmt.unwrap_or(true),
            config_stmt,
            description,
            reference,
            children: Vec::new(),
            uses: Vec::new(),
            augmentations: Vec::new(),
            introduced_by: None,
            original: None,
            via_grouping: None,
            augmented_by: None,
        });
        id
    }

    fn node_mut(&mut self, id: NodeId) -> &mut SchemaNode {
        &mut self.ctx.nodes[id.index()]
    }

    /// Map a `prefix:name` reference to (module, local name).
    fn split_qualified(
        &self,
        reference: &str,
        default_module: &str,
        location: &str,
    ) -> Result<(String, String), SchemaError> {
        match reference.split_once(':') {
            Some((prefix, local)) => {
                let module = self
                    .ctx
                    .modules
                    .iter()
                    .find(|m| m.prefix == prefix || m.name == prefix)
                    .ok_or_else(|| SchemaError::UnknownPrefix {
                        prefix: prefix.to_string(),
                        location: location.to_string(),
                    })?;
                Ok((module.name.clone(), local.to_string()))
            }
            None => Ok((default_module.to_string(), reference.to_string())),
        }
    }

    fn ensure_grouping(
        &mut self,
        module: &str,
        name: &str,
        location: &str,
    ) -> Result<NodeId, SchemaError> {
        let key = (module.to_string(), name.to_string());
        if let Some(id) = self.groupings.get(&key) {
            return Ok(*id);
        }
        if self.in_progress.contains(&key) {
            let mut chain: Vec<String> = self
                .in_progress
                .iter()
                .skip_while(|k| **k != key)
                .map(|(m, n)| format!("{m}:{n}"))
                .collect();
            chain.push(format!("{module}:{name}"));
            return Err(SchemaError::CyclicGrouping { chain });
        }
        let sources = self.sources;
        let source = self
            .source_index
            .get(module)
            .and_then(|idx| sources[*idx].groupings.iter().find(|g| g.name == name))
            .ok_or_else(|| SchemaError::UnknownGrouping {
                grouping: format!("{module}:{name}"),
                location: location.to_string(),
            })?;

        self.in_progress.push(key.clone());
        let id = self.alloc(
            module,
            name,
            NodeKind::Grouping,
            None,
            None,
            source.description.clone(),
            source.reference.clone(),
        );
        for child in &source.children {
            let child_id = self.build_node(child, Some(id), module)?;
            self.node_mut(id).children.push(child_id);
        }
        for uses in &source.uses {
            self.apply_uses(id, uses, module, id)?;
        }
        self.in_progress.pop();

        self.groupings.insert(key, id);
        if let Some(m) = self.ctx.modules.iter_mut().find(|m| m.name == module) {
            m.groupings.push(id);
        }
        Ok(id)
    }

    fn build_node(
        &mut self,
        source: &NodeSource,
        parent: Option<NodeId>,
        module: &str,
    ) -> Result<NodeId, SchemaError> {
        let id = match source {
            NodeSource::Container(c) => {
                let id = self.alloc(
                    module,
                    &c.name,
                    NodeKind::Container {
                        presence: c.presence.is_some(),
                    },
                    parent,
                    c.config,
                    c.description.clone(),
                    c.reference.clone(),
                );
                self.build_body(id, &c.children, &c.uses, module)?;
                id
            }
            NodeSource::List(l) => {
                let id = self.alloc(
                    module,
                    &l.name,
                    NodeKind::List {
                        keys: l.key.clone(),
                    },
                    parent,
                    l.config,
                    l.description.clone(),
                    l.reference.clone(),
                );
                self.build_body(id, &l.children, &l.uses, module)?;
                id
            }
            NodeSource::Leaf(l) | NodeSource::LeafList(l) => {
                let info = LeafInfo {
                    type_ref: l.type_ref.clone(),
                    mandatory: l.mandatory,
                    default: l.default.clone(),
                };
                let kind = if matches!(source, NodeSource::Leaf(_)) {
                    NodeKind::Leaf(info)
                } else {
                    NodeKind::LeafList(info)
                };
                self.alloc(
                    module,
                    &l.name,
                    kind,
                    parent,
                    l.config,
                    l.description.clone(),
                    l.reference.clone(),
                )
            }
            NodeSource::Choice(c) => {
                let id = self.alloc(
                    module,
                    &c.name,
                    NodeKind::Choice,
                    parent,
                    c.config,
                    c.description.clone(),
                    None,
                );
                for case in &c.cases {
                    let case_id = self.alloc(
                        module,
                        &case.name,
                        NodeKind::Case,
                        Some(id),
                        None,
                        case.description.clone(),
                        None,
                    );
                    self.build_body(case_id, &case.children, &case.uses, module)?;
                    self.node_mut(id).children.push(case_id);
                }
                id
            }
        };
        Ok(id)
    }

    fn build_body(
        &mut self,
        id: NodeId,
        children: &[NodeSource],
        uses: &[String],
        module: &str,
    ) -> Result<(), SchemaError> {
        for child in children {
            let child_id = self.build_node(child, Some(id), module)?;
            self.node_mut(id).children.push(child_id);
        }
        for u in uses {
            self.apply_uses(id, u, module, id)?;
        }
        Ok(())
    }

    /// Expand a `uses` into `target`, recording `introducer` on each copy.
    fn apply_uses(
        &mut self,
        target: NodeId,
        uses: &str,
        module: &str,
        introducer: NodeId,
    ) -> Result<(), SchemaError> {
        let location = self.ctx.schema_path(target);
        let (g_module, g_name) = self.split_qualified(uses, module, &location)?;
        let grouping = self.ensure_grouping(&g_module, &g_name, &location)?;
        self.node_mut(introducer).uses.push(grouping);

        let children = self.ctx.node(grouping).children.clone();
        let mut mapping = HashMap::new();
        for child in children {
            let copy = self.copy_subtree(child, target, module, Some(introducer), &mut mapping);
            self.node_mut(copy).via_grouping = Some(grouping);
            self.node_mut(target).children.push(copy);
        }
        Ok(())
    }

    fn copy_subtree(
        &mut self,
        source: NodeId,
        parent: NodeId,
        module: &str,
        introduced_by: Option<NodeId>,
        mapping: &mut HashMap<NodeId, NodeId>,
    ) -> NodeId {
        let src = self.ctx.node(source).clone();
        let id = self.alloc(
            module,
            src.name(),
            src.kind.clone(),
            Some(parent),
            src.config_stmt,
            src.description.clone(),
            src.reference.clone(),
        );
        mapping.insert(source, id);
        {
            let node = self.node_mut(id);
            node.original = Some(source);
            node.introduced_by = introduced_by;
            node.via_grouping = src.via_grouping;
            node.uses = src.uses.clone();
            node.augmented_by = src.augmented_by.clone();
        }
        for child in src.children {
            let child_introducer = self
                .ctx
                .node(child)
                .introduced_by
                .and_then(|i| mapping.get(&i).copied());
            let copy = self.copy_subtree(child, id, module, child_introducer, mapping);
            self.node_mut(id).children.push(copy);
        }
        id
    }

    fn build_rpc(&mut self, rpc: &RpcSource, module: &str) -> Result<NodeId, SchemaError> {
        let id = self.alloc(
            module,
            &rpc.name,
            NodeKind::Rpc,
            None,
            None,
            rpc.description.clone(),
            rpc.reference.clone(),
        );
        let io: [(&Option<IoSource>, &str, NodeKind); 2] = [
            (&rpc.input, "input", NodeKind::Input),
            (&rpc.output, "output", NodeKind::Output),
        ];
        for (source, name, kind) in io {
            if let Some(source) = source {
                let io_id = self.alloc(module, name, kind, Some(id), None, None, None);
                self.build_body(io_id, &source.children, &source.uses, module)?;
                self.node_mut(id).children.push(io_id);
            }
        }
        Ok(id)
    }

    fn resolve_target(&self, target: &str, module: &str) -> Result<NodeId, SchemaError> {
        let unresolved = || SchemaError::UnresolvedAugmentTarget {
            module: module.to_string(),
            target: target.to_string(),
        };
        let mut current: Option<NodeId> = None;
        for segment in target.split('/').filter(|s| !s.is_empty()) {
            let (seg_module, local) = self.split_qualified(segment, module, target)?;
            let next = match current {
                None => {
                    let m = self.ctx.module(&seg_module).ok_or_else(unresolved)?;
                    m.data
                        .iter()
                        .chain(m.rpcs.iter())
                        .copied()
                        .find(|id| self.ctx.node(*id).name() == local)
                }
                Some(parent) => self.ctx.child_named(parent, &local),
            };
            current = Some(next.ok_or_else(unresolved)?);
        }
        let id = current.ok_or_else(unresolved)?;
        let kind = &self.ctx.node(id).kind;
        if kind.is_structural() || matches!(kind, NodeKind::Case) {
            Ok(id)
        } else {
            Err(unresolved())
        }
    }

    fn apply_augment(
        &mut self,
        augment: &AugmentSource,
        module: &str,
    ) -> Result<NodeId, SchemaError> {
        let target = self.resolve_target(&augment.target, module)?;
        let aug = self.alloc(
            module,
            &augment.target,
            NodeKind::Augmentation { target },
            None,
            None,
            augment.description.clone(),
            None,
        );
        for child in &augment.children {
            let id = self.build_node(child, Some(target), module)?;
            self.node_mut(id).augmented_by = Some(module.to_string());
            self.node_mut(target).children.push(id);
            self.node_mut(aug).children.push(id);
        }
        for u in &augment.uses {
            let before = self.ctx.node(target).children.len();
            self.apply_uses(target, u, module, aug)?;
            let added: Vec<NodeId> = self.ctx.node(target).children[before..].to_vec();
            for id in added {
                self.node_mut(id).augmented_by = Some(module.to_string());
                self.node_mut(aug).children.push(id);
            }
        }
        self.node_mut(target).augmentations.push(aug);

        // An augmented copy no longer matches what it was copied from.
        let mut current = Some(target);
        while let Some(id) = current {
            if self.ctx.node(id).original.is_none() {
                break;
            }
            self.node_mut(id).original = None;
            current = self.ctx.parent(id);
        }
        debug!(
            module,
            target = %augment.target,
            "augmentation applied"
        );
        Ok(aug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::source::SchemaFile;

    fn context(yaml: &str) -> Result<SchemaContext, SchemaError> {
        let file: SchemaFile = serde_yaml::from_str(yaml).unwrap();
        SchemaContext::from_sources(&file.modules)
    }

    const USES: &str = r#"
modules:
  - name: acme
    groupings:
      - name: endpoint
        children:
          - { kind: leaf, name: address, type: string }
          - kind: container
            name: tls
            children:
              - { kind: leaf, name: enabled, type: boolean }
    data:
      - kind: container
        name: system
        children:
          - kind: container
            name: primary
            uses: [endpoint]
          - kind: container
            name: state
            config: false
            uses: [endpoint]
"#;

    #[test]
    fn test_uses_copies_keep_original_links() {
        let ctx = context(USES).unwrap();
        let system = ctx.module("acme").unwrap().data[0];
        let primary = ctx.child_named(system, "primary").unwrap();
        let tls = ctx.child_named(primary, "tls").unwrap();
        let tls_node = ctx.node(tls);
        assert_eq!(tls_node.introduced_by, Some(primary));
        let original = tls_node.original.unwrap();
        assert_eq!(ctx.node(original).name(), "tls");
        assert!(matches!(
            ctx.node(ctx.parent(original).unwrap()).kind,
            NodeKind::Grouping
        ));
        assert_eq!(ctx.node(primary).uses.len(), 1);
        assert_eq!(tls_node.via_grouping, Some(ctx.node(primary).uses[0]));
    }

    #[test]
    fn test_config_false_is_inherited_by_copies() {
        let ctx = context(USES).unwrap();
        let system = ctx.module("acme").unwrap().data[0];
        let state = ctx.child_named(system, "state").unwrap();
        let enabled = ctx
            .child_named(ctx.child_named(state, "tls").unwrap(), "enabled")
            .unwrap();
        assert!(!ctx.node(enabled).config);
        let primary = ctx.child_named(system, "primary").unwrap();
        assert!(ctx.node(primary).config);
    }

    #[test]
    fn test_augment_diverges_copied_ancestors() {
        let yaml = format!(
            "{USES}    augments:\n      - target: /acme:system/acme:primary/acme:tls\n        children:\n          - {{ kind: leaf, name: cipher, type: string }}\n"
        );
        let ctx = context(&yaml).unwrap();
        let system = ctx.module("acme").unwrap().data[0];
        let primary = ctx.child_named(system, "primary").unwrap();
        let tls = ctx.child_named(primary, "tls").unwrap();
        assert!(ctx.node(tls).original.is_none());
        assert_eq!(ctx.node(tls).augmentations.len(), 1);
        assert_eq!(ctx.node(tls).via_grouping, Some(ctx.node(primary).uses[0]));
        let cipher = ctx.child_named(tls, "cipher").unwrap();
        assert_eq!(ctx.node(cipher).augmented_by.as_deref(), Some("acme"));
        // the untouched copy keeps its link
        let state = ctx.child_named(system, "state").unwrap();
        assert!(ctx.node(ctx.child_named(state, "tls").unwrap()).original.is_some());
    }

    #[test]
    fn test_cyclic_grouping_rejected() {
        let yaml = r#"
modules:
  - name: acme
    groupings:
      - name: a
        uses: [b]
      - name: b
        children:
          - kind: container
            name: inner
            uses: [a]
"#;
        let err = context(yaml).unwrap_err();
        match err {
            SchemaError::CyclicGrouping { chain } => {
                assert_eq!(chain.first().map(String::as_str), Some("acme:a"));
                assert_eq!(chain.last().map(String::as_str), Some("acme:a"));
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_grouping_and_target() {
        let yaml = r#"
modules:
  - name: acme
    data:
      - { kind: container, name: root, uses: [missing] }
"#;
        assert!(matches!(
            context(yaml).unwrap_err(),
            SchemaError::UnknownGrouping { .. }
        ));

        let yaml = r#"
modules:
  - name: acme
    augments:
      - target: /acme:nowhere
        children:
          - { kind: leaf, name: x, type: string }
"#;
        assert!(matches!(
            context(yaml).unwrap_err(),
            SchemaError::UnresolvedAugmentTarget { .. }
        ));
    }

    #[test]
    fn test_duplicate_module_rejected() {
        let yaml = r#"
modules:
  - name: acme
  - name: acme
"#;
        assert_eq!(
            context(yaml).unwrap_err(),
            SchemaError::DuplicateModule {
                module: "acme".to_string()
            }
        );
    }
}
