//! # Handler Module
//!
//! Emits the operations of one data node or RPC into the document.
//!
//! Every data node gets a `GET`. Read-write nodes additionally get `PUT`,
//! `POST` and `DELETE` when full CRUD is enabled, `PATCH` when patch is
//! enabled, and lists a `POST` on their collection path. RPCs get a single
//! `POST` under `/operations/`.

pub mod operations;

use crate::document::{HttpMethod, Operation, Parameter, Schema, SchemaType, SwaggerDocument};
use crate::error::CompileError;
use crate::model::DataObjectBuilder;
use crate::naming::unique_name;
use crate::path::{PathDialect, PathParam, PathPrinter, PathSegment, OPERATIONS_ROOT};
use crate::schema::{NodeId, NodeKind, SchemaContext};
use crate::types::TypeConverter;
use once_cell::sync::Lazy;
use operations::OperationTarget;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

static NON_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("identifier pattern is valid"));

/// Which optional operations are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerOptions {
    /// Emit `PUT`/`POST`/`DELETE` for read-write nodes.
    pub full_crud: bool,
    /// Emit `PATCH` for read-write nodes.
    pub patch: bool,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        HandlerOptions {
            full_crud: true,
            patch: false,
        }
    }
}

/// snake_case operation id from a method and path segment names.
pub fn operation_id(method: HttpMethod, names: &[&str]) -> String {
    let raw = format!("{}_{}", method.as_str(), names.join("_")).to_lowercase();
    NON_IDENT.replace_all(&raw, "_").trim_matches('_').to_string()
}

pub struct PathHandler<'c> {
    ctx: &'c SchemaContext,
    converter: TypeConverter<'c>,
    printer: Box<dyn PathPrinter>,
    data_root: &'static str,
    options: HandlerOptions,
    operation_ids: HashSet<String>,
}

impl<'c> PathHandler<'c> {
    pub fn new(
        ctx: &'c SchemaContext,
        dialect: PathDialect,
        use_module_name: bool,
        options: HandlerOptions,
    ) -> Self {
        PathHandler {
            ctx,
            converter: TypeConverter::new(ctx),
            printer: dialect.printer(use_module_name),
            data_root: dialect.data_root(),
            options,
            operation_ids: HashSet::new(),
        }
    }

    pub fn data_path(&self, segment: &PathSegment) -> String {
        format!("/{}/{}", self.data_root, self.printer.path(segment))
    }

    pub fn list_path(&self, segment: &PathSegment) -> String {
        format!("/{}/{}", self.data_root, self.printer.list_path(segment))
    }

    pub fn rpc_path(&self, rpc: NodeId) -> String {
        let node = self.ctx.node(rpc);
        let segment = PathSegment::named(node.name(), node.module(), None);
        format!("/{OPERATIONS_ROOT}/{}", self.printer.path(&segment))
    }

    /// Emit the operations of data node `id`, addressed by `segment`.
    pub fn handle_data(
        &mut self,
        doc: &mut SwaggerDocument,
        models: &mut dyn DataObjectBuilder,
        segment: &PathSegment,
        id: NodeId,
    ) -> Result<(), CompileError> {
        let ctx = self.ctx;
        let node = ctx.node(id);
        let names: Vec<&str> = segment.chain().into_iter().map(PathSegment::name).collect();
        let all_params = segment.params();
        let path = self.data_path(segment);
        let target = OperationTarget {
            name: node.name().to_string(),
            kind: node.kind.keyword(),
            module: node.module().to_string(),
            description: node.description.clone(),
            path_params: self.path_parameters(&all_params),
        };
        let schema = models.schema_for(id)?;

        let keyless_list = matches!(&node.kind, NodeKind::List { keys } if keys.is_empty());
        let read_schema = if keyless_list {
            Schema::array_of(schema.clone())
        } else {
            schema.clone()
        };
        self.add(doc, &path, HttpMethod::Get, &names, operations::get(&target, read_schema));

        if segment.is_read_only() || !self.options.full_crud {
            debug!(path = %path, "read-only path emitted");
            return Ok(());
        }
        self.add(doc, &path, HttpMethod::Put, &names, operations::put(&target, schema.clone()));
        self.add(doc, &path, HttpMethod::Post, &names, operations::post(&target, schema.clone()));
        self.add(doc, &path, HttpMethod::Delete, &names, operations::delete(&target));
        if self.options.patch {
            self.add(doc, &path, HttpMethod::Patch, &names, operations::patch(&target, schema.clone()));
        }

        if matches!(node.kind, NodeKind::List { .. }) {
            let own = segment.own_params().len();
            let collection = OperationTarget {
                path_params: self.path_parameters(&all_params[..all_params.len() - own]),
                ..target
            };
            let list_path = self.list_path(segment);
            let mut list_names = names.clone();
            list_names.push("list");
            self.add(
                doc,
                &list_path,
                HttpMethod::Post,
                &list_names,
                operations::post(&collection, schema),
            );
        }
        debug!(path = %path, "read-write path emitted");
        Ok(())
    }

    /// Emit the invocation of RPC `rpc`.
    pub fn handle_rpc(
        &mut self,
        doc: &mut SwaggerDocument,
        models: &mut dyn DataObjectBuilder,
        rpc: NodeId,
    ) -> Result<(), CompileError> {
        let ctx = self.ctx;
        let node = ctx.node(rpc);
        let mut input = None;
        let mut output = None;
        for child in &node.children {
            match ctx.node(*child).kind {
                NodeKind::Input => input = Some(models.schema_for(*child)?),
                NodeKind::Output => output = Some(models.schema_for(*child)?),
                _ => {}
            }
        }
        let target = OperationTarget {
            name: node.name().to_string(),
            kind: node.kind.keyword(),
            module: node.module().to_string(),
            description: node.description.clone(),
            path_params: Vec::new(),
        };
        let path = self.rpc_path(rpc);
        self.add(
            doc,
            &path,
            HttpMethod::Post,
            &[node.name()],
            operations::rpc(&target, input, output),
        );
        debug!(path = %path, "rpc path emitted");
        Ok(())
    }

    fn path_parameters(&self, params: &[&PathParam]) -> Vec<Parameter> {
        params
            .iter()
            .map(|p| {
                let schema = match p.key {
                    Some(key) => self.converter.convert(key),
                    None => Schema::of_type(SchemaType::String),
                };
                Parameter::path(&p.name, &schema)
            })
            .collect()
    }

    fn add(
        &mut self,
        doc: &mut SwaggerDocument,
        path: &str,
        method: HttpMethod,
        names: &[&str],
        mut op: Operation,
    ) {
        let id = unique_name(&mut self.operation_ids, &operation_id(method, names));
        op.operation_id = Some(id);
        doc.add_operation(path, method, op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OptimizingBuilder;
    use crate::schema::{load_schema_str, SourceFormat};

    const SCHEMA: &str = r#"
modules:
  - name: acme
    data:
      - kind: list
        name: server
        key: [name]
        children:
          - { kind: leaf, name: name, type: string }
          - { kind: leaf, name: port, type: uint16 }
    rpcs:
      - name: reboot
        input:
          children: [{ kind: leaf, name: delay, type: uint32 }]
"#;

    #[test]
    fn test_operation_id_is_snake_case() {
        assert_eq!(
            operation_id(HttpMethod::Get, &["server-group", "member.v2"]),
            "get_server_group_member_v2"
        );
    }

    #[test]
    fn test_list_paths_and_param_types() {
        let ctx = load_schema_str(SCHEMA, SourceFormat::Yaml).unwrap();
        let server = ctx.module("acme").unwrap().data[0];
        let mut doc = SwaggerDocument::default();
        let mut models = OptimizingBuilder::new(&ctx);
        let mut handler = PathHandler::new(&ctx, PathDialect::Rfc8040, false, HandlerOptions::default());
        let segment = PathSegment::for_node(&ctx, None, server);
        handler.handle_data(&mut doc, &mut models, &segment, server).unwrap();

        let get = doc.operation("/data/server={name}", HttpMethod::Get).unwrap();
        assert_eq!(get.operation_id.as_deref(), Some("get_server"));
        assert_eq!(get.parameters[0].param_type, Some(SchemaType::String));
        let collection = doc.operation("/data/server/", HttpMethod::Post).unwrap();
        assert!(collection.path_parameter_names().is_empty());
        assert_eq!(collection.operation_id.as_deref(), Some("post_server_list"));
        assert!(doc.operation("/data/server={name}", HttpMethod::Patch).is_none());
    }

    #[test]
    fn test_rpc_path_and_duplicate_ids() {
        let ctx = load_schema_str(SCHEMA, SourceFormat::Yaml).unwrap();
        let rpc = ctx.module("acme").unwrap().rpcs[0];
        let mut doc = SwaggerDocument::default();
        let mut models = OptimizingBuilder::new(&ctx);
        let mut handler = PathHandler::new(&ctx, PathDialect::Odl, true, HandlerOptions::default());
        handler.handle_rpc(&mut doc, &mut models, rpc).unwrap();
        handler.handle_rpc(&mut doc, &mut models, rpc).unwrap();
        let op = doc
            .operation("/operations/acme:reboot/", HttpMethod::Post)
            .unwrap();
        // second emission replaced the first, with a de-duplicated id
        assert_eq!(op.operation_id.as_deref(), Some("post_reboot_1"));
        assert_eq!(
            op.body().unwrap().schema.as_ref().unwrap().reference.as_deref(),
            Some("#/definitions/acme.RebootInput")
        );
        assert!(op.responses.contains_key("204"));
    }
}
