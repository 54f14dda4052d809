//! # Document Module
//!
//! The Swagger 2.0 document the compiler produces: named definitions plus
//! resource paths with their operations.
//!
//! Every `$ref` points into `definitions`. [`SwaggerDocument::check_references`]
//! enforces that after post-processing.

mod model;
mod operation;

pub use model::*;
pub use operation::*;

use crate::error::CompileError;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Info {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
}

/// Entry of `securityDefinitions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerDocument {
    pub swagger: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    pub paths: BTreeMap<String, PathItem>,
    pub definitions: BTreeMap<String, ModelEntry>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub security_definitions: BTreeMap<String, SecurityScheme>,
}

impl Default for SwaggerDocument {
    fn default() -> Self {
        SwaggerDocument {
            swagger: "2.0".to_string(),
            info: Info::default(),
            host: None,
            base_path: None,
            consumes: Vec::new(),
            produces: Vec::new(),
            paths: BTreeMap::new(),
            definitions: BTreeMap::new(),
            security_definitions: BTreeMap::new(),
        }
    }
}

impl SwaggerDocument {
    /// Add an operation, replacing any earlier one for the same method.
    pub fn add_operation(&mut self, path: &str, method: HttpMethod, operation: Operation) {
        self.paths
            .entry(path.to_string())
            .or_default()
            .insert(method, operation);
    }

    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.get(&method))
    }

    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &Operation)> {
        self.paths.iter().flat_map(|(path, item)| {
            item.iter()
                .map(move |(method, op)| (path.as_str(), *method, op))
        })
    }

    pub fn operations_mut(&mut self) -> impl Iterator<Item = &mut Operation> {
        self.paths.values_mut().flat_map(|item| item.values_mut())
    }

    /// Definition names referenced directly from path operations.
    pub fn path_references(&self) -> Vec<String> {
        let mut names = Vec::new();
        for (_, _, op) in self.operations() {
            op.visit_refs(&mut |_, name| names.push(name.to_string()));
        }
        names
    }

    /// Point every reference in definitions and paths at its renamed target.
    pub fn rewrite_refs(&mut self, renames: &HashMap<String, String>) {
        if renames.is_empty() {
            return;
        }
        for entry in self.definitions.values_mut() {
            entry.rewrite_refs(renames);
        }
        for op in self.operations_mut() {
            op.rewrite_refs(renames);
        }
    }

    /// Fail on the first reference without a matching definition.
    pub fn check_references(&self) -> Result<(), CompileError> {
        let mut dangling: Option<(String, String)> = None;
        for (name, entry) in &self.definitions {
            entry.visit_refs(&mut |_, target| {
                if dangling.is_none() && !self.definitions.contains_key(target) {
                    dangling = Some((target.to_string(), name.clone()));
                }
            });
        }
        for (path, method, op) in self.operations() {
            op.visit_refs(&mut |_, target| {
                if dangling.is_none() && !self.definitions.contains_key(target) {
                    dangling = Some((target.to_string(), format!("{method} {path}")));
                }
            });
        }
        match dangling {
            Some((reference, location)) => Err(CompileError::DanglingReference {
                reference,
                location,
            }),
            None => Ok(()),
        }
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
