use super::{flatten_attributes, DataObjectBuilder, ModelState};
use crate::document::{ComposedModel, ModelEntry, Schema};
use crate::error::CompileError;
use crate::schema::{NodeId, SchemaContext, SchemaNode};
use std::collections::BTreeMap;
use tracing::debug;

/// Composition-based builder.
///
/// Copies resolve to the node they were copied from and pure aliases to their
/// grouping, so each piece of shared structure is modelled once. A node that
/// uses groupings and adds attributes of its own becomes a composed entry
/// whose parents are the groupings.
#[derive(Debug)]
pub struct OptimizingBuilder<'c> {
    state: ModelState<'c>,
}

impl<'c> OptimizingBuilder<'c> {
    pub fn new(ctx: &'c SchemaContext) -> Self {
        OptimizingBuilder {
            state: ModelState::new(ctx),
        }
    }

    fn build_entry(&mut self, id: NodeId) -> Result<ModelEntry, CompileError> {
        let ctx = self.state.ctx;
        let converter = self.state.converter;
        let node = ctx.node(id);

        // A grouping whose copies diverged here is flattened, not inherited.
        let inherited_from = |child: &SchemaNode| child.introduced_by == Some(id);
        let diverged: Vec<NodeId> = node
            .children
            .iter()
            .map(|c| ctx.node(*c))
            .filter(|c| inherited_from(*c) && c.original.is_none())
            .filter_map(|c| c.via_grouping)
            .collect();

        let mut parents = Vec::with_capacity(node.uses.len());
        for grouping in &node.uses {
            if diverged.contains(grouping) {
                debug!(
                    node = %ctx.schema_path(id),
                    grouping = %ctx.schema_path(*grouping),
                    "grouping diverged, flattening"
                );
                continue;
            }
            let parent = self.build(*grouping)?;
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }

        // Children copied in by this node's own uses live in the parents.
        let own = |child: &SchemaNode| {
            !(inherited_from(child)
                && child.original.is_some()
                && child.via_grouping.is_some_and(|g| !diverged.contains(&g)))
        };
        let attrs = flatten_attributes(ctx, converter, id, &own, &mut |child| {
            let name = self.build(child)?;
            Ok(Schema::reference_to(&name))
        })?;

        let description = node.description.clone();
        if parents.is_empty() {
            return Ok(ModelEntry::Simple(attrs.into_object(description)));
        }
        let child = (!attrs.is_empty()).then(|| attrs.into_object(None));
        Ok(ModelEntry::Composed(ComposedModel {
            parents,
            child,
            description,
        }))
    }
}

impl DataObjectBuilder for OptimizingBuilder<'_> {
    fn build(&mut self, id: NodeId) -> Result<String, CompileError> {
        let ctx = self.state.ctx;
        let canonical = self.state.names.canonical(ctx, id);
        let name = self.state.names.resolve(ctx, id);
        if self.state.definitions.contains_key(&name) {
            return Ok(name);
        }
        self.state.enter(&name, canonical)?;
        let entry = self.build_entry(canonical);
        self.state.leave(&name);
        let entry = entry?;
        debug!(
            name = %name,
            node = %ctx.schema_path(canonical),
            composed = entry.as_composed().is_some(),
            "definition built"
        );
        self.state.definitions.insert(name.clone(), entry);
        Ok(name)
    }

    fn definitions(&self) -> &BTreeMap<String, ModelEntry> {
        &self.state.definitions
    }

    fn take_definitions(&mut self) -> BTreeMap<String, ModelEntry> {
        std::mem::take(&mut self.state.definitions)
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
    groupings:
      - name: endpoint
        children:
          - { kind: leaf, name: address, type: string, mandatory: true }
          - { kind: leaf, name: port, type: uint16 }
      - name: credentials
        children:
          - { kind: leaf, name: user, type: string }
    data:
      - kind: container
        name: system
        description: System settings.
        children:
          - { kind: container, name: primary, uses: [endpoint] }
          - kind: list
            name: server
            key: [name]
            uses: [endpoint, credentials]
            children:
              - { kind: leaf, name: name, type: string }
          - kind: choice
            name: transport
            cases:
              - name: tcp
                children: [{ kind: leaf, name: tcp-port, type: uint16 }]
              - name: udp
                children: [{ kind: leaf, name: udp-port, type: uint16 }]
          - kind: container
            name: state
            config: false
            children: [{ kind: leaf, name: uptime, type: uint32 }]
"#;

    fn setup() -> SchemaContext {
        load_schema_str(SCHEMA, SourceFormat::Yaml).unwrap()
    }

    #[test]
    fn test_alias_emits_no_own_definition() {
        let ctx = setup();
        let system = ctx.module("acme").unwrap().data[0];
        let primary = ctx.child_named(system, "primary").unwrap();
        let mut builder = OptimizingBuilder::new(&ctx);
        assert_eq!(builder.build(primary).unwrap(), "acme.Endpoint");
        assert_eq!(builder.definitions().len(), 1);
        let endpoint = builder.definitions().get("acme.Endpoint").unwrap();
        assert_eq!(
            serde_json::to_value(endpoint).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "address": { "type": "string" },
                    "port": { "type": "integer", "format": "int32" }
                },
                "required": ["address"]
            })
        );
    }

    #[test]
    fn test_composed_entry_for_uses_plus_own_attributes() {
        let ctx = setup();
        let system = ctx.module("acme").unwrap().data[0];
        let server = ctx.child_named(system, "server").unwrap();
        let mut builder = OptimizingBuilder::new(&ctx);
        let name = builder.build(server).unwrap();
        assert_eq!(name, "acme.Server");
        let entry = builder.definitions().get(&name).unwrap().as_composed().unwrap();
        assert_eq!(entry.parents, vec!["acme.Endpoint", "acme.Credentials"]);
        let child = entry.child.as_ref().unwrap();
        assert_eq!(child.properties.keys().collect::<Vec<_>>(), vec!["name"]);
        assert_eq!(child.required, vec!["name"]);
    }

    #[test]
    fn test_choice_is_transparent_and_state_read_only() {
        let ctx = setup();
        let system = ctx.module("acme").unwrap().data[0];
        let mut builder = OptimizingBuilder::new(&ctx);
        let name = builder.build(system).unwrap();
        let defs = builder.take_definitions();
        let ModelEntry::Simple(system_def) = defs.get(&name).unwrap() else {
            panic!("system should be a simple entry");
        };
        assert_eq!(system_def.description.as_deref(), Some("System settings."));
        assert_eq!(
            system_def.properties["tcp-port"].extensions["x-choice"],
            json!("transport/tcp")
        );
        assert_eq!(
            system_def.properties["server"].items.as_ref().unwrap().reference.as_deref(),
            Some("#/definitions/acme.Server")
        );
        let ModelEntry::Simple(state) = defs.get("acme.State").unwrap() else {
            panic!("state should be a simple entry");
        };
        assert_eq!(state.properties["uptime"].read_only, Some(true));
        assert!(builder.definitions().is_empty());
    }

    fn property_names(defs: &BTreeMap<String, ModelEntry>, name: &str) -> Vec<String> {
        match &defs[name] {
            ModelEntry::Simple(schema) => schema.properties.keys().cloned().collect(),
            ModelEntry::Composed(composed) => {
                let mut names: Vec<String> = composed
                    .parents
                    .iter()
                    .flat_map(|p| property_names(defs, p))
                    .collect();
                if let Some(child) = &composed.child {
                    names.extend(child.properties.keys().cloned());
                }
                names
            }
        }
    }

    #[test]
    fn test_augmented_copy_flattens_its_grouping() {
        let ctx = load_schema_str(
            r#"
modules:
  - name: acme
    groupings:
      - name: endpoint
        children:
          - { kind: leaf, name: address, type: string }
          - kind: container
            name: tls
            children: [{ kind: leaf, name: enabled, type: boolean }]
      - name: credentials
        children: [{ kind: leaf, name: user, type: string }]
    data:
      - kind: container
        name: system
        children:
          - { kind: container, name: primary, uses: [endpoint, credentials] }
          - { kind: container, name: backup, uses: [endpoint] }
    augments:
      - target: /acme:system/acme:primary/acme:tls
        children: [{ kind: leaf, name: cipher, type: string }]
"#,
            SourceFormat::Yaml,
        )
        .unwrap();
        let system = ctx.module("acme").unwrap().data[0];
        let mut builder = OptimizingBuilder::new(&ctx);
        builder.build(system).unwrap();
        let defs = builder.take_definitions();

        let primary = defs["acme.Primary"].as_composed().unwrap();
        assert_eq!(primary.parents, vec!["acme.Credentials"]);
        let own = &primary.child.as_ref().unwrap().properties;
        assert_eq!(own.keys().collect::<Vec<_>>(), vec!["address", "tls"]);

        let names = property_names(&defs, "acme.Primary");
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(names.len(), unique.len(), "duplicated properties: {names:?}");

        let ModelEntry::Simple(endpoint) = &defs["acme.Endpoint"] else {
            panic!("endpoint should be a simple entry");
        };
        assert_ne!(
            endpoint.properties["tls"].reference,
            own["tls"].reference,
            "augmented tls must not share the grouping's definition"
        );
        let augmented = own["tls"].reference.as_deref().unwrap();
        let tls = augmented.trim_start_matches("#/definitions/");
        let ModelEntry::Simple(tls) = &defs[tls] else {
            panic!("tls should be a simple entry");
        };
        assert!(tls.properties.contains_key("acme:cipher"));
    }
}
