use super::Rewrite;
use crate::document::{Schema, SchemaType, SwaggerDocument};
use crate::path::OPERATIONS_ROOT;
use std::collections::BTreeMap;

/// Wraps request and response payloads in an object with a single root
/// property, named after the last path segment (`input`/`output` for RPCs).
///
/// Only `$ref` and array payloads are wrapped, so a second run changes
/// nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct WrapPayload;

/// Root property name for payloads of `path`.
pub fn payload_key(path: &str) -> String {
    path.trim_end_matches('/')
        .rsplit('/')
        .find(|s| !s.is_empty() && !s.starts_with('{'))
        .map(|s| s.split_once('=').map_or(s, |(name, _)| name))
        .unwrap_or_default()
        .to_string()
}

fn wrap(schema: &mut Schema, key: &str) {
    if !schema.is_ref() && schema.schema_type != Some(SchemaType::Array) {
        return;
    }
    let inner = std::mem::take(schema);
    *schema = Schema::object(BTreeMap::from([(key.to_string(), inner)]));
}

impl Rewrite for WrapPayload {
    fn name(&self) -> &'static str {
        "wrap-payload"
    }

    fn apply(&self, doc: &mut SwaggerDocument) {
        let rpc_prefix = format!("/{OPERATIONS_ROOT}/");
        for (path, item) in doc.paths.iter_mut() {
            let is_rpc = path.starts_with(&rpc_prefix);
            let key = payload_key(path);
            for op in item.values_mut() {
                for param in op.parameters.iter_mut() {
                    if let Some(schema) = param.schema.as_mut() {
                        wrap(schema, if is_rpc { "input" } else { key.as_str() });
                    }
                }
                for response in op.responses.values_mut() {
                    if let Some(schema) = response.schema.as_mut() {
                        wrap(schema, if is_rpc { "output" } else { key.as_str() });
                    }
                }
            }
        }
    }
}
