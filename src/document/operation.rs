use super::model::{RefKind, Schema};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// HTTP methods an operation can be bound to.
///
/// Declaration order is the order methods appear under a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations bound to one resource path.
pub type PathItem = BTreeMap<HttpMethod, Operation>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Body,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Body => write!(f, "body"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Inline type of a path parameter.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<super::model::SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enumeration: Vec<String>,
    /// Payload schema of a body parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Parameter {
    /// A required path parameter typed after `schema`.
    pub fn path(name: &str, schema: &Schema) -> Self {
        Parameter {
            name: name.to_string(),
            location: ParameterLocation::Path,
            required: true,
            description: None,
            param_type: schema.schema_type,
            format: schema.format.clone(),
            enumeration: schema.enumeration.clone(),
            schema: None,
        }
    }

    pub fn body(name: &str, schema: Schema, description: Option<String>) -> Self {
        Parameter {
            name: name.to_string(),
            location: ParameterLocation::Body,
            required: true,
            description,
            param_type: None,
            format: None,
            enumeration: Vec::new(),
            schema: Some(schema),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Response {
    pub fn new(description: &str) -> Self {
        Response {
            description: description.to_string(),
            schema: None,
        }
    }

    pub fn with_schema(description: &str, schema: Schema) -> Self {
        Response {
            description: description.to_string(),
            schema: Some(schema),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Keyed by status code.
    pub responses: BTreeMap<String, Response>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<BTreeMap<String, Vec<String>>>,
}

impl Operation {
    pub fn response(&mut self, status: u16, response: Response) {
        self.responses.insert(status.to_string(), response);
    }

    /// Body parameter, if the operation carries one.
    pub fn body(&self) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.location == ParameterLocation::Body)
    }

    pub fn path_parameter_names(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Path)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Every schema the operation carries: body parameters, then responses.
    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.parameters
            .iter()
            .filter_map(|p| p.schema.as_ref())
            .chain(self.responses.values().filter_map(|r| r.schema.as_ref()))
    }

    pub fn schemas_mut(&mut self) -> impl Iterator<Item = &mut Schema> {
        self.parameters
            .iter_mut()
            .filter_map(|p| p.schema.as_mut())
            .chain(self.responses.values_mut().filter_map(|r| r.schema.as_mut()))
    }

    pub fn visit_refs(&self, f: &mut dyn FnMut(RefKind, &str)) {
        for schema in self.schemas() {
            schema.visit_refs(&mut |r| f(RefKind::Uses, r));
        }
    }

    pub fn rewrite_refs(&mut self, renames: &HashMap<String, String>) {
        for schema in self.schemas_mut() {
            schema.rewrite_refs(renames);
        }
    }
}
