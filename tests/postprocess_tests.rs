#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{compile, system, system_with_ext};
use serde_json::json;
use yang2rest::document::HttpMethod;
use yang2rest::postprocess::{Pipeline, PostProcessor, SecurityConfig};
use yang2rest::GeneratorConfig;

#[test]
fn test_default_pipeline_is_idempotent() {
    let mut doc = compile(&system_with_ext(), GeneratorConfig::default());
    let once = doc.clone();
    Pipeline::from_config(&PostProcessor::default_pipeline(), None).apply(&mut doc);
    assert_eq!(doc, once);
}

#[test]
fn test_empty_pipeline_keeps_raw_models() {
    let config = GeneratorConfig {
        postprocess: Vec::new(),
        ..Default::default()
    };
    let raw = compile(&system(), config);
    let processed = compile(&system(), GeneratorConfig::default());
    assert!(raw.definitions.len() >= processed.definitions.len());
    for name in processed.definitions.keys() {
        assert!(raw.definitions.contains_key(name), "{name} appeared from nowhere");
    }
}

#[test]
fn test_single_parent_flattens_compositions() {
    let config = GeneratorConfig {
        postprocess: vec![PostProcessor::SingleParent, PostProcessor::RemoveUnused],
        ..Default::default()
    };
    let doc = compile(&system(), config);
    let server = doc.definitions["acme.system.Server"].as_composed().unwrap();
    assert_eq!(server.parents.len(), 1);
    let own = &server.child.as_ref().unwrap().properties;
    // the dropped parent's attributes are merged into the child
    let merged = ["address", "port", "user"]
        .iter()
        .filter(|p| own.contains_key(**p))
        .count();
    assert!(merged >= 1);
    assert!(own.contains_key("name"));
}

#[test]
fn test_wrap_payload_uses_last_segment() {
    let config = GeneratorConfig {
        postprocess: vec![PostProcessor::RemoveUnused, PostProcessor::WrapPayload],
        ..Default::default()
    };
    let doc = compile(&system(), config);
    let get = doc
        .operation("/data/system/server={name}", HttpMethod::Get)
        .unwrap();
    assert_eq!(
        serde_json::to_value(get.responses["200"].schema.as_ref().unwrap()).unwrap(),
        json!({
            "type": "object",
            "properties": { "server": { "$ref": "#/definitions/acme.system.Server" } }
        })
    );
    let reboot = doc.operation("/operations/reboot", HttpMethod::Post).unwrap();
    let body = reboot.body().unwrap().schema.as_ref().unwrap();
    assert!(body.properties.contains_key("input"));
    let output = reboot.responses["200"].schema.as_ref().unwrap();
    assert!(output.properties.contains_key("output"));
}

#[test]
fn test_security_applies_to_every_operation() {
    let config = GeneratorConfig {
        security: Some(SecurityConfig::ApiKey {
            header: "X-Token".to_string(),
        }),
        ..Default::default()
    };
    let doc = compile(&system(), config);
    assert_eq!(
        serde_json::to_value(&doc.security_definitions).unwrap(),
        json!({ "apiKeyAuth": { "type": "apiKey", "name": "X-Token", "in": "header" } })
    );
    for (path, method, op) in doc.operations() {
        assert!(
            op.security.iter().any(|req| req.contains_key("apiKeyAuth")),
            "{method} {path} is unsecured"
        );
    }
}

#[test]
fn test_models_are_sorted() {
    let config = GeneratorConfig {
        postprocess: vec![PostProcessor::SortModels],
        ..Default::default()
    };
    let doc = compile(&system(), config);
    for entry in doc.definitions.values() {
        if let Some(composed) = entry.as_composed() {
            let mut sorted = composed.parents.clone();
            sorted.sort();
            assert_eq!(composed.parents, sorted);
        }
    }
}
