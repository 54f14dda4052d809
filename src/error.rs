//! Error types for schema loading, configuration and compilation.
//!
//! The compiler is a deterministic single-pass transform, so nothing here is
//! retried. Each error names the node, reference or setting that caused it.

use std::fmt;

/// Structural problems found while turning source modules into a
/// [`SchemaContext`](crate::schema::SchemaContext).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two source modules share the same name.
    DuplicateModule {
        /// The repeated module name
        module: String,
    },
    /// A `uses` statement names a grouping that does not exist.
    UnknownGrouping {
        /// The grouping name as written
        grouping: String,
        /// Schema path of the node carrying the `uses`
        location: String,
    },
    /// A grouping uses itself, directly or through other groupings.
    CyclicGrouping {
        /// The groupings on the cycle, in the order they were entered
        chain: Vec<String>,
    },
    /// A `prefix:name` reference uses a prefix no module declares.
    UnknownPrefix {
        /// The unknown prefix
        prefix: String,
        /// Where the prefix was used
        location: String,
    },
    /// An augment target path does not lead to a node that can hold children.
    UnresolvedAugmentTarget {
        /// Module declaring the augment
        module: String,
        /// The target path as written
        target: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::DuplicateModule { module } => {
                write!(f, "module '{module}' is defined more than once")
            }
            SchemaError::UnknownGrouping { grouping, location } => {
                write!(f, "unknown grouping '{grouping}' used at {location}")
            }
            SchemaError::CyclicGrouping { chain } => {
                write!(f, "cyclic grouping use: {}", chain.join(" -> "))
            }
            SchemaError::UnknownPrefix { prefix, location } => {
                write!(f, "unknown module prefix '{prefix}' at {location}")
            }
            SchemaError::UnresolvedAugmentTarget { module, target } => {
                write!(
                    f,
                    "augment target '{target}' declared in module '{module}' does not resolve"
                )
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// Rejected configuration, detected before any traversal starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The schema context holds no modules at all.
    EmptySchema,
    /// The module filter matched none of the loaded modules.
    NoModulesSelected {
        /// Module names that were requested
        requested: Vec<String>,
    },
    /// Neither data nor RPC elements were selected for generation.
    NoElementsSelected,
    /// A path dialect name that is not one of `rfc8040`, `odl`, `segment`.
    UnknownDialect(String),
    /// A model strategy name that is not `optimizing` or `unpacking`.
    UnknownStrategy(String),
    /// An element kind that is not `data` or `rpc`.
    UnknownElement(String),
    /// A post-processing pass name that is not known.
    UnknownPostProcessor(String),
    /// A security scheme name that is not `basic` or `api-key`.
    UnknownSecurityScheme(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptySchema => write!(f, "configuration error: schema set is empty"),
            ConfigError::NoModulesSelected { requested } => write!(
                f,
                "configuration error: no loaded module matches the selection [{}]",
                requested.join(", ")
            ),
            ConfigError::NoElementsSelected => write!(
                f,
                "configuration error: at least one of 'data' or 'rpc' must be generated"
            ),
            ConfigError::UnknownDialect(d) => write!(
                f,
                "configuration error: unknown path dialect '{d}' (expected rfc8040, odl or segment)"
            ),
            ConfigError::UnknownStrategy(s) => write!(
                f,
                "configuration error: unknown model strategy '{s}' (expected optimizing or unpacking)"
            ),
            ConfigError::UnknownElement(e) => write!(
                f,
                "configuration error: unknown element kind '{e}' (expected data or rpc)"
            ),
            ConfigError::UnknownPostProcessor(p) => {
                write!(f, "configuration error: unknown post-processor '{p}'")
            }
            ConfigError::UnknownSecurityScheme(s) => write!(
                f,
                "configuration error: unknown security scheme '{s}' (expected basic or api-key)"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failure of a compilation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The run was rejected before traversal.
    Config(ConfigError),
    /// A grouping reached itself while its model was being built.
    CyclicGrouping {
        /// Schema path of the offending grouping
        node: String,
    },
    /// A `$ref` survived the pipeline without a matching definition.
    DanglingReference {
        /// The unresolved reference target
        reference: String,
        /// Definition name or `METHOD path` holding the reference
        location: String,
    },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Config(err) => write!(f, "{err}"),
            CompileError::CyclicGrouping { node } => {
                write!(f, "invariant violation: grouping {node} uses itself")
            }
            CompileError::DanglingReference {
                reference,
                location,
            } => write!(
                f,
                "invariant violation: reference '{reference}' in {location} has no definition"
            ),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for CompileError {
    fn from(err: ConfigError) -> Self {
        CompileError::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_offender() {
        let err = CompileError::DanglingReference {
            reference: "acme.Missing".to_string(),
            location: "GET /data/acme:root".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("acme.Missing"));
        assert!(msg.contains("GET /data/acme:root"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: CompileError = ConfigError::UnknownDialect("swagger".to_string()).into();
        assert!(matches!(err, CompileError::Config(ConfigError::UnknownDialect(_))));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_cycle_chain_display() {
        let err = SchemaError::CyclicGrouping {
            chain: vec!["a:g1".to_string(), "a:g2".to_string(), "a:g1".to_string()],
        };
        assert_eq!(err.to_string(), "cyclic grouping use: a:g1 -> a:g2 -> a:g1");
    }
}
