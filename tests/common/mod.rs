#![allow(dead_code)]

use std::path::PathBuf;
use yang2rest::schema::{load_schema, SchemaContext};
use yang2rest::{GeneratorConfig, SwaggerDocument};

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The system module alone.
pub fn system() -> SchemaContext {
    load_schema(&[fixture("acme-system.yaml")]).unwrap()
}

/// The system module plus the module augmenting it.
pub fn system_with_ext() -> SchemaContext {
    load_schema(&[fixture("acme-system.yaml"), fixture("acme-ext.yaml")]).unwrap()
}

pub fn compile(ctx: &SchemaContext, config: GeneratorConfig) -> SwaggerDocument {
    yang2rest::generate(ctx, config).unwrap()
}

/// Every `$ref` target anywhere in `value`.
pub fn collect_refs(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, v) in map {
                match (key.as_str(), v) {
                    ("$ref", serde_json::Value::String(r)) => {
                        out.push(r.trim_start_matches("#/definitions/").to_string())
                    }
                    _ => collect_refs(v, out),
                }
            }
        }
        serde_json::Value::Array(items) => {
            for v in items {
                collect_refs(v, out);
            }
        }
        _ => {}
    }
}
