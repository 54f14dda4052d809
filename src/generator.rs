//! # Generator Module
//!
//! Drives one compilation run: validates the configuration, walks every
//! selected module depth first, runs the post-processing pipeline and checks
//! that no reference dangles.
//!
//! ```rust
//! use yang2rest::{GeneratorConfig, SwaggerGenerator};
//! use yang2rest::schema::{load_schema_str, SourceFormat};
//!
//! let ctx = load_schema_str(
//!     "modules:\n  - name: acme\n    data:\n      - { kind: container, name: system }\n",
//!     SourceFormat::Yaml,
//! )?;
//! let doc = SwaggerGenerator::new(&ctx, GeneratorConfig::default())?.generate()?;
//! assert!(doc.paths.contains_key("/data/system"));
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::config::{ElementKind, GeneratorConfig};
use crate::document::{Info, SwaggerDocument};
use crate::error::{CompileError, ConfigError};
use crate::handler::PathHandler;
use crate::model::{self, DataObjectBuilder};
use crate::path::PathSegment;
use crate::postprocess::Pipeline;
use crate::schema::{Module, NodeId, NodeKind, SchemaContext};
use std::rc::Rc;
use tracing::{debug, info};

/// Compiles selected modules of a schema context into a Swagger document.
#[derive(Debug)]
pub struct SwaggerGenerator<'c> {
    ctx: &'c SchemaContext,
    config: GeneratorConfig,
    modules: Vec<&'c Module>,
}

impl<'c> SwaggerGenerator<'c> {
    /// Validate `config` against `ctx`.
    ///
    /// # Errors
    ///
    /// `EmptySchema` when `ctx` holds no module, `NoModulesSelected` when the
    /// module filter matches nothing, `NoElementsSelected` when neither data
    /// nor RPCs are requested.
    pub fn new(ctx: &'c SchemaContext, config: GeneratorConfig) -> Result<Self, ConfigError> {
        if ctx.is_empty() {
            return Err(ConfigError::EmptySchema);
        }
        config.validate()?;
        let modules: Vec<&Module> = if config.modules.is_empty() {
            ctx.modules().iter().collect()
        } else {
            ctx.modules()
                .iter()
                .filter(|m| config.modules.contains(&m.name))
                .collect()
        };
        if modules.is_empty() {
            return Err(ConfigError::NoModulesSelected {
                requested: config.modules.clone(),
            });
        }
        Ok(SwaggerGenerator {
            ctx,
            config,
            modules,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Names of the modules paths are generated for.
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    fn info(&self) -> Info {
        let names = self.module_names();
        let descriptions: Vec<&str> = self
            .modules
            .iter()
            .filter_map(|m| m.description.as_deref())
            .collect();
        Info {
            title: self.config.title.clone().unwrap_or_else(|| names.join(",")),
            description: (!descriptions.is_empty()).then(|| descriptions.join("\n")),
            version: self.config.version.clone(),
        }
    }

    /// Run the compilation.
    ///
    /// # Errors
    ///
    /// Fails on a grouping cycle met while modelling, or when a reference
    /// dangles after post-processing.
    pub fn generate(&self) -> Result<SwaggerDocument, CompileError> {
        info!(
            modules = ?self.module_names(),
            dialect = %self.config.dialect,
            strategy = %self.config.strategy,
            "compilation started"
        );
        let mut walk = Walk {
            ctx: self.ctx,
            max_depth: self.config.max_depth,
            doc: SwaggerDocument {
                info: self.info(),
                host: self.config.host.clone(),
                base_path: self.config.base_path.clone(),
                consumes: self.config.consumes.clone(),
                produces: self.config.produces.clone(),
                ..Default::default()
            },
            models: model::builder(self.config.strategy, self.ctx),
            handler: PathHandler::new(
                self.ctx,
                self.config.dialect,
                self.config.use_module_name,
                self.config.handler_options(),
            ),
        };

        for module in &self.modules {
            if self.config.generates(ElementKind::Data) {
                for root in &module.data {
                    walk.visit(*root, None, 0)?;
                }
            }
            if self.config.generates(ElementKind::Rpc) {
                for rpc in &module.rpcs {
                    walk.handler.handle_rpc(&mut walk.doc, walk.models.as_mut(), *rpc)?;
                }
            }
            debug!(module = %module.name, "module traversed");
        }

        let mut doc = walk.doc;
        doc.definitions = walk.models.take_definitions();
        let pipeline = Pipeline::from_config(&self.config.passes(), self.config.security.as_ref());
        pipeline.apply(&mut doc);
        doc.check_references()?;
        info!(
            paths = doc.paths.len(),
            definitions = doc.definitions.len(),
            "compilation finished"
        );
        Ok(doc)
    }
}

/// Traversal state of one run.
struct Walk<'c> {
    ctx: &'c SchemaContext,
    max_depth: Option<usize>,
    doc: SwaggerDocument,
    models: Box<dyn DataObjectBuilder + 'c>,
    handler: PathHandler<'c>,
}

impl Walk<'_> {
    /// Emit `id` and descend. Choice and case are looked through without
    /// using up a depth level.
    fn visit(
        &mut self,
        id: NodeId,
        parent: Option<&Rc<PathSegment>>,
        depth: usize,
    ) -> Result<(), CompileError> {
        let ctx = self.ctx;
        let node = ctx.node(id);
        match node.kind {
            NodeKind::Choice | NodeKind::Case => {
                for child in &node.children {
                    self.visit(*child, parent, depth)?;
                }
            }
            NodeKind::Container { .. } | NodeKind::List { .. } => {
                if self.max_depth.is_some_and(|max| depth >= max) {
                    return Ok(());
                }
                let segment = PathSegment::for_node(ctx, parent, id);
                self.handler
                    .handle_data(&mut self.doc, self.models.as_mut(), &segment, id)?;
                for child in &node.children {
                    self.visit(*child, Some(&segment), depth + 1)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Compile `ctx` with `config` in one call.
pub fn generate(
    ctx: &SchemaContext,
    config: GeneratorConfig,
) -> Result<SwaggerDocument, CompileError> {
    SwaggerGenerator::new(ctx, config)?.generate()
}
