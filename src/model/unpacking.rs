use super::{flatten_attributes, Attributes, DataObjectBuilder, ModelState};
use crate::document::{ModelEntry, Schema};
use crate::error::CompileError;
use crate::schema::{NodeId, SchemaContext};
use std::collections::BTreeMap;
use tracing::debug;

/// Flat builder: one simple entry per node, no composition.
///
/// A nested container or list is referenced only when its definition was
/// built earlier in the run; otherwise it is embedded as an anonymous object.
/// This keeps forward references out of the document.
#[derive(Debug)]
pub struct UnpackingBuilder<'c> {
    state: ModelState<'c>,
}

impl<'c> UnpackingBuilder<'c> {
    pub fn new(ctx: &'c SchemaContext) -> Self {
        UnpackingBuilder {
            state: ModelState::new(ctx),
        }
    }

    fn attributes(&mut self, id: NodeId) -> Result<Attributes, CompileError> {
        let ctx = self.state.ctx;
        let converter = self.state.converter;
        flatten_attributes(ctx, converter, id, &|_| true, &mut |child| {
            self.nested(child)
        })
    }

    fn nested(&mut self, id: NodeId) -> Result<Schema, CompileError> {
        let ctx = self.state.ctx;
        let name = self.state.names.resolve(ctx, id);
        if self.state.definitions.contains_key(&name) {
            return Ok(Schema::reference_to(&name));
        }
        self.state.enter(&name, id)?;
        let attrs = self.attributes(id);
        self.state.leave(&name);
        Ok(attrs?.into_object(ctx.node(id).description.clone()))
    }
}

impl DataObjectBuilder for UnpackingBuilder<'_> {
    fn build(&mut self, id: NodeId) -> Result<String, CompileError> {
        let ctx = self.state.ctx;
        let name = self.state.names.resolve(ctx, id);
        if self.state.definitions.contains_key(&name) {
            return Ok(name);
        }
        self.state.enter(&name, id)?;
        let attrs = self.attributes(id);
        self.state.leave(&name);
        let schema = attrs?.into_object(ctx.node(id).description.clone());
        debug!(name = %name, node = %ctx.schema_path(id), "definition built");
        self.state
            .definitions
            .insert(name.clone(), ModelEntry::Simple(schema));
        Ok(name)
    }

    fn definitions(&self) -> &BTreeMap<String, ModelEntry> {
        &self.state.definitions
    }

    fn take_definitions(&mut self) -> BTreeMap<String, ModelEntry> {
        std::mem::take(&mut self.state.definitions)
    }
}
