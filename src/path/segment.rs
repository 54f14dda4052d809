use crate::schema::{NodeId, NodeKind, SchemaContext};
use smallvec::SmallVec;
use std::rc::Rc;
use tracing::trace;

/// A path parameter contributed by a list key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    /// Parameter name, already unique along the chain.
    pub name: String,
    /// Key leaf typing the parameter, when the key resolves.
    pub key: Option<NodeId>,
}

/// One level of a resource path.
///
/// Segments are immutable and linked to their parent, so descending creates
/// a new segment and returning is just dropping back to the parent `Rc`.
#[derive(Debug)]
pub struct PathSegment {
    name: String,
    module: String,
    read_only: bool,
    list: Option<NodeId>,
    params: SmallVec<[PathParam; 2]>,
    parent: Option<Rc<PathSegment>>,
}

impl PathSegment {
    /// Segment for a data node below `parent`; list keys become parameters.
    pub fn for_node(
        ctx: &SchemaContext,
        parent: Option<&Rc<PathSegment>>,
        id: NodeId,
    ) -> Rc<PathSegment> {
        let node = ctx.node(id);
        let mut segment = PathSegment {
            name: node.name().to_string(),
            module: node.module().to_string(),
            read_only: !node.config,
            list: None,
            params: SmallVec::new(),
            parent: parent.map(Rc::clone),
        };
        if let NodeKind::List { keys } = &node.kind {
            segment.list = Some(id);
            for key in keys {
                let leaf = ctx.data_child_named(id, key);
                let name = segment.unique_param_name(key);
                segment.params.push(PathParam { name, key: leaf });
            }
        }
        trace!(segment = %segment.name, params = segment.params.len(), "path segment pushed");
        Rc::new(segment)
    }

    /// Segment without parameters, e.g. for an RPC.
    pub fn named(name: &str, module: &str, parent: Option<&Rc<PathSegment>>) -> Rc<PathSegment> {
        Rc::new(PathSegment {
            name: name.to_string(),
            module: module.to_string(),
            read_only: false,
            list: None,
            params: SmallVec::new(),
            parent: parent.map(Rc::clone),
        })
    }

    /// `key`, or a variant of it not yet used on this chain:
    /// `<module>-<key>`, then `<segment>-<key>`, then numbered.
    fn unique_param_name(&self, key: &str) -> String {
        let taken = |name: &str| {
            self.params.iter().any(|p| p.name == name)
                || self.ancestors().any(|s| s.params.iter().any(|p| p.name == name))
        };
        let candidates = [
            key.to_string(),
            format!("{}-{key}", self.module),
            format!("{}-{key}", self.name),
        ];
        if let Some(free) = candidates.into_iter().find(|c| !taken(c)) {
            return free;
        }
        let mut counter = 1;
        loop {
            let candidate = format!("{}-{key}-{counter}", self.name);
            if !taken(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// List node supplying this segment's keys.
    pub fn list(&self) -> Option<NodeId> {
        self.list
    }

    pub fn parent(&self) -> Option<&Rc<PathSegment>> {
        self.parent.as_ref()
    }

    /// Parameters contributed by this segment alone.
    pub fn own_params(&self) -> &[PathParam] {
        &self.params
    }

    /// Every parameter along the chain, root first.
    pub fn params(&self) -> Vec<&PathParam> {
        self.chain()
            .into_iter()
            .flat_map(|s| s.params.iter())
            .collect()
    }

    /// Ancestors from the nearest parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &PathSegment> {
        std::iter::successors(self.parent.as_deref(), |s| s.parent.as_deref())
    }

    /// The chain from the root down to this segment.
    pub fn chain(&self) -> Vec<&PathSegment> {
        let mut chain: Vec<&PathSegment> = self.ancestors().collect();
        chain.reverse();
        chain.push(self);
        chain
    }

    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }
}
