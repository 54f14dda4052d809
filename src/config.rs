//! Generator configuration
//!
//! Read from a TOML file; every field has a default, so an empty file is a
//! valid configuration. Command-line flags override file values.
//!
//! ```toml
//! title = "Acme devices"
//! dialect = "odl"
//! strategy = "unpacking"
//! elements = ["data"]
//! max-depth = 3
//! postprocess = ["remove-unused", "wrap-payload"]
//!
//! [security]
//! scheme = "api-key"
//! header = "X-Token"
//! ```

use crate::error::ConfigError;
use crate::handler::HandlerOptions;
use crate::model::ModelStrategy;
use crate::path::PathDialect;
use crate::postprocess::{PostProcessor, SecurityConfig};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Media type used for `consumes`/`produces` when none is configured.
pub const YANG_DATA_JSON: &str = "application/yang-data+json";

/// Schema elements to generate paths for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Configuration and state data trees
    Data,
    /// Remote procedure calls
    Rpc,
}

impl FromStr for ElementKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "data" => Ok(ElementKind::Data),
            "rpc" | "rpcs" => Ok(ElementKind::Rpc),
            _ => Err(ConfigError::UnknownElement(s.to_string())),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Data => write!(f, "data"),
            ElementKind::Rpc => write!(f, "rpc"),
        }
    }
}

/// Settings for one compilation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GeneratorConfig {
    /// `info.title`; defaults to the generated module names
    pub title: Option<String>,
    /// `info.version`
    pub version: String,
    /// `host` of the document
    pub host: Option<String>,
    /// `basePath` of the document
    pub base_path: Option<String>,
    /// Request media types
    pub consumes: Vec<String>,
    /// Response media types
    pub produces: Vec<String>,
    /// Element kinds to generate
    pub elements: Vec<ElementKind>,
    /// Model construction strategy
    pub strategy: ModelStrategy,
    /// Path rendering dialect
    pub dialect: PathDialect,
    /// Prefix every path segment with its module name
    pub use_module_name: bool,
    /// Emit PUT/POST/DELETE for read-write nodes
    pub full_crud: bool,
    /// Emit PATCH for read-write nodes
    pub patch: bool,
    /// Data-node levels expanded below a module root; unlimited when unset
    pub max_depth: Option<usize>,
    /// Modules to generate paths for; all when empty
    pub modules: Vec<String>,
    /// Post-processing passes, in order
    pub postprocess: Vec<PostProcessor>,
    /// Security scheme; adds the `security` pass when set
    pub security: Option<SecurityConfig>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            title: None,
            version: "1.0.0-SNAPSHOT".to_string(),
            host: None,
            base_path: None,
            consumes: vec![YANG_DATA_JSON.to_string()],
            produces: vec![YANG_DATA_JSON.to_string()],
            elements: vec![ElementKind::Data, ElementKind::Rpc],
            strategy: ModelStrategy::default(),
            dialect: PathDialect::default(),
            use_module_name: false,
            full_crud: true,
            patch: false,
            max_depth: None,
            modules: Vec::new(),
            postprocess: PostProcessor::default_pipeline(),
            security: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read generator config: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse generator config: {}", path.display()))
    }

    /// Checks that can fail without looking at the schema.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.elements.is_empty() {
            return Err(ConfigError::NoElementsSelected);
        }
        Ok(())
    }

    pub fn generates(&self, kind: ElementKind) -> bool {
        self.elements.contains(&kind)
    }

    pub fn handler_options(&self) -> HandlerOptions {
        HandlerOptions {
            full_crud: self.full_crud,
            patch: self.patch,
        }
    }

    /// Configured passes, with `security` appended when a scheme is set.
    pub fn passes(&self) -> Vec<PostProcessor> {
        let mut passes = self.postprocess.clone();
        if self.security.is_some() && !passes.contains(&PostProcessor::Security) {
            passes.push(PostProcessor::Security);
        }
        passes
    }
}
