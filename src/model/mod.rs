//! # Model Module
//!
//! Builds the named object definitions for containers, lists, groupings and
//! RPC input/output.
//!
//! Two strategies implement [`DataObjectBuilder`]:
//!
//! - [`OptimizingBuilder`] keeps groupings as shared definitions and composes
//!   them (`allOf`) into the nodes that use them.
//! - [`UnpackingBuilder`] flattens everything into one property map per
//!   definition and never composes.
//!
//! Both share the attribute flattening below: choice/case are transparent,
//! augmented properties are prefixed with the augmenting module, and
//! config-false nodes are marked `readOnly`.

mod optimizing;
mod unpacking;

pub use optimizing::OptimizingBuilder;
pub use unpacking::UnpackingBuilder;

use crate::document::{ModelEntry, Schema};
use crate::error::{CompileError, ConfigError};
use crate::naming::NameRegistry;
use crate::schema::{NodeId, NodeKind, SchemaContext, SchemaNode};
use crate::types::TypeConverter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Records the `choice/case` a property came from.
pub const X_CHOICE: &str = "x-choice";
/// Records the module whose augmentation added a property.
pub const X_AUGMENTATION: &str = "x-augmentation";

/// How definitions are shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelStrategy {
    /// Groupings become shared parents of composed definitions.
    #[default]
    Optimizing,
    /// Every definition carries all of its attributes inline.
    Unpacking,
}

impl FromStr for ModelStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "optimizing" => Ok(ModelStrategy::Optimizing),
            "unpacking" => Ok(ModelStrategy::Unpacking),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for ModelStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelStrategy::Optimizing => write!(f, "optimizing"),
            ModelStrategy::Unpacking => write!(f, "unpacking"),
        }
    }
}

/// Produces and caches the definitions for one compilation run.
pub trait DataObjectBuilder {
    /// Definition name of `id`, building its model on first request.
    ///
    /// Repeated calls for nodes resolving to the same name are no-ops.
    fn build(&mut self, id: NodeId) -> Result<String, CompileError>;

    /// Schema a path operation uses to carry `id`.
    fn schema_for(&mut self, id: NodeId) -> Result<Schema, CompileError> {
        let name = self.build(id)?;
        Ok(Schema::reference_to(&name))
    }

    /// Definitions built so far.
    fn definitions(&self) -> &BTreeMap<String, ModelEntry>;

    /// Move the built definitions out, leaving the cache empty.
    fn take_definitions(&mut self) -> BTreeMap<String, ModelEntry>;
}

/// Builder for `strategy` over `ctx`.
pub fn builder(strategy: ModelStrategy, ctx: &SchemaContext) -> Box<dyn DataObjectBuilder + '_> {
    match strategy {
        ModelStrategy::Optimizing => Box::new(OptimizingBuilder::new(ctx)),
        ModelStrategy::Unpacking => Box::new(UnpackingBuilder::new(ctx)),
    }
}

/// Per-run caches shared by both strategies.
#[derive(Debug)]
pub(crate) struct ModelState<'c> {
    pub ctx: &'c SchemaContext,
    pub converter: TypeConverter<'c>,
    pub names: NameRegistry,
    pub definitions: BTreeMap<String, ModelEntry>,
    pub in_progress: HashSet<String>,
}

impl<'c> ModelState<'c> {
    pub fn new(ctx: &'c SchemaContext) -> Self {
        ModelState {
            ctx,
            converter: TypeConverter::new(ctx),
            names: NameRegistry::new(),
            definitions: BTreeMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Mark `name` as being built; a second entry means a cycle.
    pub fn enter(&mut self, name: &str, id: NodeId) -> Result<(), CompileError> {
        if !self.in_progress.insert(name.to_string()) {
            return Err(CompileError::CyclicGrouping {
                node: self.ctx.schema_path(id),
            });
        }
        Ok(())
    }

    pub fn leave(&mut self, name: &str) {
        self.in_progress.remove(name);
    }
}

/// Flattened properties of one object.
#[derive(Debug, Default)]
pub(crate) struct Attributes {
    pub properties: BTreeMap<String, Schema>,
    pub required: Vec<String>,
}

impl Attributes {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn into_object(self, description: Option<String>) -> Schema {
        let mut schema = Schema::object(self.properties);
        schema.required = self.required;
        schema.description = description;
        schema
    }
}

/// Property name: augmented properties carry their module.
pub fn property_name(node: &SchemaNode) -> String {
    match &node.augmented_by {
        Some(module) => format!("{module}:{}", node.name()),
        None => node.name().to_string(),
    }
}

/// Collect the properties of `owner` from the children `include` accepts.
///
/// `nested` decides how container and list children are represented.
pub(crate) fn flatten_attributes(
    ctx: &SchemaContext,
    converter: TypeConverter<'_>,
    owner: NodeId,
    include: &dyn Fn(&SchemaNode) -> bool,
    nested: &mut dyn FnMut(NodeId) -> Result<Schema, CompileError>,
) -> Result<Attributes, CompileError> {
    let mut attrs = Attributes::default();
    let keys = ctx.node(owner).keys();
    for child in &ctx.node(owner).children {
        if include(ctx.node(*child)) {
            add_property(ctx, converter, keys, *child, None, &mut attrs, nested)?;
        }
    }
    Ok(attrs)
}

fn add_property(
    ctx: &SchemaContext,
    converter: TypeConverter<'_>,
    keys: &[String],
    id: NodeId,
    choice: Option<&str>,
    attrs: &mut Attributes,
    nested: &mut dyn FnMut(NodeId) -> Result<Schema, CompileError>,
) -> Result<(), CompileError> {
    let node = ctx.node(id);
    let mut schema = match &node.kind {
        NodeKind::Choice => {
            for case in &node.children {
                let case_node = ctx.node(*case);
                let marker = format!("{}/{}", node.name(), case_node.name());
                let members: Vec<NodeId> = if matches!(case_node.kind, NodeKind::Case) {
                    case_node.children.clone()
                } else {
                    vec![*case]
                };
                for member in members {
                    add_property(ctx, converter, keys, member, Some(&marker), attrs, nested)?;
                }
            }
            return Ok(());
        }
        NodeKind::Case => {
            for member in &node.children {
                add_property(ctx, converter, keys, *member, choice, attrs, nested)?;
            }
            return Ok(());
        }
        NodeKind::Leaf(_) | NodeKind::LeafList(_) => converter.property(id),
        NodeKind::Container { .. } => nested(id)?,
        NodeKind::List { .. } => Schema::array_of(nested(id)?),
        _ => return Ok(()),
    };

    if !node.config && !schema.is_ref() {
        schema.read_only = Some(true);
    }
    if let Some(marker) = choice {
        schema
            .extensions
            .insert(X_CHOICE.to_string(), Value::String(marker.to_string()));
    }
    if let Some(module) = &node.augmented_by {
        schema
            .extensions
            .insert(X_AUGMENTATION.to_string(), Value::String(module.clone()));
    }

    let name = property_name(node);
    let is_key = keys.iter().any(|k| k == node.name()) && node.augmented_by.is_none();
    let mandatory = node.leaf_info().is_some_and(|i| i.mandatory) && choice.is_none();
    if is_key || mandatory {
        attrs.required.push(name.clone());
    }
    attrs.properties.insert(name, schema);
    Ok(())
}
