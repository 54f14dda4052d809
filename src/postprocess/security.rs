use super::Rewrite;
use crate::document::{SecurityScheme, SwaggerDocument};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Header carrying the key when none is configured.
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";

/// Security scheme to require on every operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "kebab-case")]
pub enum SecurityConfig {
    /// HTTP basic authentication.
    #[default]
    Basic,
    /// API key sent in a request header.
    ApiKey {
        #[serde(default = "default_header")]
        header: String,
    },
}

fn default_header() -> String {
    DEFAULT_API_KEY_HEADER.to_string()
}

impl SecurityConfig {
    /// Key under `securityDefinitions`.
    pub fn definition_name(&self) -> &'static str {
        match self {
            SecurityConfig::Basic => "basicAuth",
            SecurityConfig::ApiKey { .. } => "apiKeyAuth",
        }
    }

    fn scheme(&self) -> SecurityScheme {
        match self {
            SecurityConfig::Basic => SecurityScheme {
                scheme_type: "basic".to_string(),
                name: None,
                location: None,
                description: None,
            },
            SecurityConfig::ApiKey { header } => SecurityScheme {
                scheme_type: "apiKey".to_string(),
                name: Some(header.clone()),
                location: Some("header".to_string()),
                description: None,
            },
        }
    }
}

impl FromStr for SecurityConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(SecurityConfig::Basic),
            "api-key" | "apikey" => Ok(SecurityConfig::ApiKey {
                header: default_header(),
            }),
            _ => Err(ConfigError::UnknownSecurityScheme(s.to_string())),
        }
    }
}

/// Adds a `securityDefinitions` entry and requires it on every operation
/// that has no requirement yet.
#[derive(Debug, Clone, Default)]
pub struct AddSecurity {
    config: SecurityConfig,
}

impl AddSecurity {
    pub fn new(config: SecurityConfig) -> Self {
        AddSecurity { config }
    }
}

impl Rewrite for AddSecurity {
    fn name(&self) -> &'static str {
        "security"
    }

    fn apply(&self, doc: &mut SwaggerDocument) {
        let name = self.config.definition_name();
        doc.security_definitions
            .insert(name.to_string(), self.config.scheme());
        for op in doc.operations_mut() {
            if op.security.is_empty() {
                op.security
                    .push(BTreeMap::from([(name.to_string(), Vec::new())]));
            }
        }
    }
}
