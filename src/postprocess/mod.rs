//! # Post-Processing Module
//!
//! Rewrite passes over a finished [`SwaggerDocument`].
//!
//! Each pass implements [`Rewrite`] and can be run on its own. A [`Pipeline`]
//! applies an ordered list of passes in a loop. The default pipeline prunes
//! unreachable definitions, collapses duplicate compositions, replaces empty
//! single-parent compositions, prunes again and sorts parent lists.
//!
//! | pass                  | effect                                              |
//! |-----------------------|-----------------------------------------------------|
//! | `remove-unused`       | drop definitions unreachable from any operation     |
//! | `collapse-duplicates` | merge composed entries with the same parent set     |
//! | `single-parent`       | inline every parent after the first                 |
//! | `replace-empty`       | replace `allOf: [X]` entries by `X`                 |
//! | `wrap-payload`        | wrap bodies in a single named root property         |
//! | `sort-models`         | sort composed parent lists                          |
//! | `security`            | add a security scheme and require it everywhere     |

mod collapse;
mod remove_unused;
mod replace_empty;
mod security;
mod single_parent;
mod sort;
mod usage;
mod wrap_payload;

pub use collapse::CollapseDuplicates;
pub use remove_unused::RemoveUnused;
pub use replace_empty::ReplaceEmpty;
pub use security::{AddSecurity, SecurityConfig};
pub use single_parent::SingleParent;
pub use sort::SortModels;
pub use usage::{TypeNode, UsageGraph};
pub use wrap_payload::WrapPayload;

use crate::document::SwaggerDocument;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A single document rewrite.
pub trait Rewrite {
    /// Pass name, as used in configuration.
    fn name(&self) -> &'static str;

    fn apply(&self, doc: &mut SwaggerDocument);
}

/// Pass names accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostProcessor {
    RemoveUnused,
    CollapseDuplicates,
    SingleParent,
    ReplaceEmpty,
    WrapPayload,
    SortModels,
    Security,
}

impl PostProcessor {
    pub const ALL: [PostProcessor; 7] = [
        PostProcessor::RemoveUnused,
        PostProcessor::CollapseDuplicates,
        PostProcessor::SingleParent,
        PostProcessor::ReplaceEmpty,
        PostProcessor::WrapPayload,
        PostProcessor::SortModels,
        PostProcessor::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostProcessor::RemoveUnused => "remove-unused",
            PostProcessor::CollapseDuplicates => "collapse-duplicates",
            PostProcessor::SingleParent => "single-parent",
            PostProcessor::ReplaceEmpty => "replace-empty",
            PostProcessor::WrapPayload => "wrap-payload",
            PostProcessor::SortModels => "sort-models",
            PostProcessor::Security => "security",
        }
    }

    /// Passes run when nothing is configured.
    pub fn default_pipeline() -> Vec<PostProcessor> {
        vec![
            PostProcessor::RemoveUnused,
            PostProcessor::CollapseDuplicates,
            PostProcessor::ReplaceEmpty,
            PostProcessor::RemoveUnused,
            PostProcessor::SortModels,
        ]
    }
}

impl FromStr for PostProcessor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostProcessor::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownPostProcessor(s.to_string()))
    }
}

impl fmt::Display for PostProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered passes, applied one after the other.
#[derive(Default)]
pub struct Pipeline {
    passes: Vec<Box<dyn Rewrite>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pass.
    #[must_use]
    pub fn then(mut self, pass: impl Rewrite + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Pipeline for configured pass names. `security` uses `security_config`
    /// or HTTP basic when none is given.
    pub fn from_config(
        passes: &[PostProcessor],
        security_config: Option<&SecurityConfig>,
    ) -> Pipeline {
        let mut pipeline = Pipeline::new();
        for pass in passes {
            let boxed: Box<dyn Rewrite> = match pass {
                PostProcessor::RemoveUnused => Box::new(RemoveUnused),
                PostProcessor::CollapseDuplicates => Box::new(CollapseDuplicates),
                PostProcessor::SingleParent => Box::new(SingleParent),
                PostProcessor::ReplaceEmpty => Box::new(ReplaceEmpty),
                PostProcessor::WrapPayload => Box::new(WrapPayload),
                PostProcessor::SortModels => Box::new(SortModels),
                PostProcessor::Security => Box::new(AddSecurity::new(
                    security_config.cloned().unwrap_or_default(),
                )),
            };
            pipeline.passes.push(boxed);
        }
        pipeline
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn apply(&self, doc: &mut SwaggerDocument) {
        for pass in &self.passes {
            let before = doc.definitions.len();
            pass.apply(doc);
            debug!(
                pass = pass.name(),
                definitions_before = before,
                definitions_after = doc.definitions.len(),
                "post-processor applied"
            );
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_names_round_trip() {
        for pass in PostProcessor::ALL {
            assert_eq!(pass.as_str().parse::<PostProcessor>(), Ok(pass));
        }
        assert_eq!(
            "inline-all".parse::<PostProcessor>(),
            Err(ConfigError::UnknownPostProcessor("inline-all".to_string()))
        );
    }

    #[test]
    fn test_default_pipeline_order() {
        let pipeline = Pipeline::from_config(&PostProcessor::default_pipeline(), None);
        assert_eq!(
            pipeline.names(),
            vec![
                "remove-unused",
                "collapse-duplicates",
                "replace-empty",
                "remove-unused",
                "sort-models"
            ]
        );
    }

    #[test]
    fn test_builder_chaining() {
        let pipeline = Pipeline::new().then(RemoveUnused).then(SortModels);
        assert_eq!(format!("{pipeline:?}"), r#"["remove-unused", "sort-models"]"#);
    }
}
