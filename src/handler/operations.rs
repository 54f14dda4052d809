//! Operation generators, one per HTTP method.
//!
//! Each returns a finished [`Operation`] minus its `operationId`, which the
//! handler assigns so it can keep ids unique across the document.

use crate::document::{Operation, Parameter, Response, Schema};

/// What every generator needs to know about the target resource.
#[derive(Debug, Clone)]
pub struct OperationTarget {
    /// Local name of the node, used in descriptions and body parameter names.
    pub name: String,
    /// Schema keyword of the node (`container`, `list`, `rpc`).
    pub kind: &'static str,
    pub module: String,
    pub description: Option<String>,
    pub path_params: Vec<Parameter>,
}

impl OperationTarget {
    fn operation(&self, summary: String) -> Operation {
        let description = match &self.description {
            Some(d) => format!("{summary}\n\n{d}"),
            None => summary,
        };
        let mut op = Operation {
            tags: vec![self.module.clone()],
            description: Some(description),
            parameters: self.path_params.clone(),
            ..Default::default()
        };
        op.response(400, Response::new("Bad request"));
        op
    }

    fn body_param(&self, schema: Schema) -> Parameter {
        Parameter::body(
            &format!("{}.body-param", self.name),
            schema,
            Some(format!("{} to be added or updated", self.name)),
        )
    }
}

pub fn get(target: &OperationTarget, schema: Schema) -> Operation {
    let mut op = target.operation(format!("returns {} {}", target.kind, target.name));
    op.response(200, Response::with_schema(&target.name, schema));
    op
}

pub fn put(target: &OperationTarget, schema: Schema) -> Operation {
    let mut op = target.operation(format!("creates or updates {} {}", target.kind, target.name));
    op.parameters.push(target.body_param(schema));
    op.response(201, Response::new("Object created"));
    op.response(204, Response::new("Object modified"));
    op
}

pub fn post(target: &OperationTarget, schema: Schema) -> Operation {
    let mut op = target.operation(format!("creates {} {}", target.kind, target.name));
    op.parameters.push(target.body_param(schema));
    op.response(201, Response::new("Object created"));
    op.response(409, Response::new("Object already exists"));
    op
}

pub fn delete(target: &OperationTarget) -> Operation {
    let mut op = target.operation(format!("removes {} {}", target.kind, target.name));
    op.response(204, Response::new("Object deleted"));
    op
}

pub fn patch(target: &OperationTarget, schema: Schema) -> Operation {
    let mut op = target.operation(format!("patches {} {}", target.kind, target.name));
    op.parameters.push(target.body_param(schema));
    op.response(204, Response::new("Object modified"));
    op
}

/// RPC invocation; `input` becomes the body, `output` the 200 response.
pub fn rpc(target: &OperationTarget, input: Option<Schema>, output: Option<Schema>) -> Operation {
    let mut op = target.operation(format!("invokes rpc {}", target.name));
    if let Some(input) = input {
        op.parameters.push(Parameter::body(
            &format!("{}.body-param", target.name),
            input,
            Some(format!("{} input", target.name)),
        ));
    }
    match output {
        Some(output) => op.response(200, Response::with_schema("Correct response", output)),
        None => op.response(204, Response::new("Rpc succeeded")),
    }
    op
}
