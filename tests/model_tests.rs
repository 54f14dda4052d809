#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{collect_refs, compile, system, system_with_ext};
use serde_json::{json, Value};
use yang2rest::document::HttpMethod;
use yang2rest::schema::{load_schema_str, SourceFormat};
use yang2rest::{GeneratorConfig, ModelStrategy, PathDialect, SwaggerDocument};

fn definitions(doc: &SwaggerDocument) -> Value {
    serde_json::to_value(&doc.definitions).unwrap()
}

#[test]
fn test_groupings_become_shared_parents() {
    let doc = compile(&system(), GeneratorConfig::default());
    let defs = definitions(&doc);

    let server = &defs["acme.system.Server"]["allOf"];
    assert_eq!(server[0], json!({ "$ref": "#/definitions/acme.system.Credentials" }));
    assert_eq!(server[1], json!({ "$ref": "#/definitions/acme.system.Endpoint" }));
    assert_eq!(server[2]["required"], json!(["name"]));
    assert_eq!(
        server[2]["properties"]["channel"]["items"],
        json!({ "$ref": "#/definitions/acme.system.Channel" })
    );
    assert!(server[2]["properties"].get("address").is_none());

    let endpoint = &defs["acme.system.Endpoint"];
    assert_eq!(endpoint["required"], json!(["address"]));
    assert_eq!(endpoint["properties"]["port"]["type"], "integer");
    assert_eq!(endpoint["properties"]["port"]["format"], "int32");
}

#[test]
fn test_aliases_share_the_grouping_definition() {
    let doc = compile(&system(), GeneratorConfig::default());
    let defs = definitions(&doc);
    let system = &defs["acme.system.System"]["properties"];
    assert_eq!(system["primary"], json!({ "$ref": "#/definitions/acme.system.Endpoint" }));
    assert_eq!(system["backup"], json!({ "$ref": "#/definitions/acme.system.Endpoint" }));
    assert!(!doc.definitions.contains_key("acme.system.Primary"));
    assert!(!doc.definitions.contains_key("acme.system.Backup"));

    let get = doc.operation("/data/system/backup", HttpMethod::Get).unwrap();
    assert_eq!(
        get.responses["200"].schema.as_ref().unwrap().reference.as_deref(),
        Some("#/definitions/acme.system.Endpoint")
    );
}

#[test]
fn test_choice_read_only_and_leafref_properties() {
    let doc = compile(&system(), GeneratorConfig::default());
    let defs = definitions(&doc);

    let system = &defs["acme.system.System"]["properties"];
    assert_eq!(system["ethernet"]["x-choice"], "transport/wired");
    assert_eq!(system["ssid"]["x-choice"], "transport/wireless");
    assert!(system["state"].get("readOnly").is_none());

    let state = &defs["acme.system.State"]["properties"];
    assert_eq!(state["uptime"]["readOnly"], true);
    assert_eq!(state["active-server"]["type"], "string");
    assert_eq!(
        state["active-server"]["x-path"],
        "/sys:system/sys:server/sys:name"
    );
}

#[test]
fn test_unpacking_never_composes() {
    let config = GeneratorConfig {
        strategy: ModelStrategy::Unpacking,
        ..Default::default()
    };
    let doc = compile(&system(), config);
    assert!(doc.definitions.values().all(|e| e.as_composed().is_none()));
    let defs = definitions(&doc);
    let server = &defs["acme.system.Server"]["properties"];
    for property in ["address", "port", "user", "name"] {
        assert!(server.get(property).is_some(), "missing {property}");
    }
    assert_eq!(defs["acme.system.Server"]["required"], json!(["name", "address"]));
}

#[test]
fn test_augmented_properties_carry_their_module() {
    let doc = compile(&system_with_ext(), GeneratorConfig::default());
    let defs = definitions(&doc);
    let own = &defs["acme.system.Server"]["allOf"][2]["properties"];
    assert_eq!(own["acme-ext:priority"]["x-augmentation"], "acme-ext");
    assert_eq!(own["acme-ext:stats"]["$ref"], "#/definitions/acme.ext.Stats");
    assert_eq!(own["acme-ext:stats"]["x-augmentation"], "acme-ext");

    assert_eq!(
        doc.paths["/data/system/server={name}/stats"]
            .keys()
            .copied()
            .collect::<Vec<_>>(),
        vec![HttpMethod::Get]
    );
}

#[test]
fn test_augmenting_module_alone_has_no_paths() {
    let config = GeneratorConfig {
        modules: vec!["acme-ext".to_string()],
        ..Default::default()
    };
    let doc = compile(&system_with_ext(), config);
    assert!(doc.paths.is_empty());
    assert!(doc.definitions.is_empty());
    assert_eq!(doc.info.title, "acme-ext");
}

#[test]
fn test_identical_compositions_collapse() {
    let ctx = load_schema_str(
        r#"
modules:
  - name: acme
    groupings:
      - name: endpoint
        children: [{ kind: leaf, name: address, type: string }]
      - name: credentials
        children: [{ kind: leaf, name: user, type: string }]
    data:
      - { kind: container, name: left, uses: [endpoint, credentials] }
      - { kind: container, name: right, uses: [credentials, endpoint] }
"#,
        SourceFormat::Yaml,
    )
    .unwrap();
    let doc = compile(&ctx, GeneratorConfig::default());

    assert!(doc.definitions.contains_key("acme.Left"));
    assert!(!doc.definitions.contains_key("acme.Right"));
    let put = doc.operation("/data/right", HttpMethod::Put).unwrap();
    assert_eq!(
        put.body().unwrap().schema.as_ref().unwrap().reference.as_deref(),
        Some("#/definitions/acme.Left")
    );
    let left = doc.definitions["acme.Left"].as_composed().unwrap();
    assert_eq!(left.parents, vec!["acme.Credentials", "acme.Endpoint"]);
}

#[test]
fn test_every_reference_resolves_and_every_definition_is_used() {
    let ctx = system_with_ext();
    for strategy in [ModelStrategy::Optimizing, ModelStrategy::Unpacking] {
        for dialect in [PathDialect::Rfc8040, PathDialect::Odl, PathDialect::Segment] {
            let config = GeneratorConfig {
                strategy,
                dialect,
                ..Default::default()
            };
            let doc = compile(&ctx, config);
            let mut refs = Vec::new();
            collect_refs(&serde_json::to_value(&doc).unwrap(), &mut refs);
            for target in &refs {
                assert!(
                    doc.definitions.contains_key(target),
                    "{strategy}/{dialect}: dangling {target}"
                );
            }
            for name in doc.definitions.keys() {
                assert!(refs.contains(name), "{strategy}/{dialect}: unused {name}");
            }
        }
    }
}

#[test]
fn test_definition_names_are_unique_per_node() {
    let ctx = load_schema_str(
        r#"
modules:
  - name: acme
    data:
      - kind: container
        name: left
        children:
          - { kind: container, name: config, children: [{ kind: leaf, name: a, type: string }] }
      - kind: container
        name: right
        children:
          - { kind: container, name: config, children: [{ kind: leaf, name: b, type: string }] }
"#,
        SourceFormat::Yaml,
    )
    .unwrap();
    let doc = compile(&ctx, GeneratorConfig::default());
    let left = doc.operation("/data/left/config", HttpMethod::Get).unwrap();
    let right = doc.operation("/data/right/config", HttpMethod::Get).unwrap();
    let target = |op: &yang2rest::document::Operation| {
        op.responses["200"].schema.as_ref().unwrap().reference.clone().unwrap()
    };
    assert_ne!(target(left), target(right));
    assert_eq!(target(left), "#/definitions/acme.Config");
    assert_eq!(target(right), "#/definitions/acme.right.Config");
}

fn property_names(doc: &SwaggerDocument, name: &str) -> Vec<String> {
    let entry = &doc.definitions[name];
    match entry.as_composed() {
        None => serde_json::to_value(entry).unwrap()["properties"]
            .as_object()
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default(),
        Some(composed) => {
            let mut names: Vec<String> = composed
                .parents
                .iter()
                .flat_map(|p| property_names(doc, p))
                .collect();
            if let Some(child) = &composed.child {
                names.extend(child.properties.keys().cloned());
            }
            names
        }
    }
}

#[test]
fn test_compositions_never_redeclare_a_property() {
    let ctx = load_schema_str(
        r#"
modules:
  - name: acme
    prefix: ac
    groupings:
      - name: endpoint
        children:
          - { kind: leaf, name: address, type: string }
          - kind: container
            name: tls
            children: [{ kind: leaf, name: enabled, type: boolean }]
      - name: credentials
        children: [{ kind: leaf, name: user, type: string }]
    data:
      - kind: container
        name: system
        children:
          - { kind: container, name: primary, uses: [endpoint, credentials] }
          - { kind: container, name: backup, uses: [endpoint] }
  - name: acme-tls
    prefix: tls
    augments:
      - target: /ac:system/ac:primary/ac:tls
        children: [{ kind: leaf, name: cipher, type: string }]
"#,
        SourceFormat::Yaml,
    )
    .unwrap();
    let config = GeneratorConfig {
        modules: vec!["acme".to_string()],
        ..Default::default()
    };
    let doc = compile(&ctx, config);
    let primary = doc.definitions["acme.Primary"].as_composed().unwrap();
    assert_eq!(primary.parents, vec!["acme.Credentials"]);

    let fixture = compile(&system_with_ext(), GeneratorConfig::default());
    for doc in [&doc, &fixture] {
        for name in doc.definitions.keys() {
            let names = property_names(doc, name);
            let mut unique = names.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(names.len(), unique.len(), "{name} redeclares: {names:?}");
        }
    }

    let get = doc.operation("/data/system/primary/tls", HttpMethod::Get).unwrap();
    let target = get.responses["200"].schema.as_ref().unwrap().reference.clone().unwrap();
    let tls = &definitions(&doc)[target.trim_start_matches("#/definitions/")];
    assert_eq!(tls["properties"]["acme-tls:cipher"]["type"], "string");
}

#[test]
fn test_aliases_resolve_transitively() {
    let ctx = load_schema_str(
        r#"
modules:
  - name: acme
    groupings:
      - name: base
        children: [{ kind: leaf, name: id, type: string }]
      - { name: wrapper, uses: [base] }
    data:
      - { kind: container, name: c, uses: [wrapper] }
"#,
        SourceFormat::Yaml,
    )
    .unwrap();
    let doc = compile(&ctx, GeneratorConfig::default());
    assert_eq!(doc.definitions.keys().collect::<Vec<_>>(), vec!["acme.Base"]);
    for method in [HttpMethod::Get, HttpMethod::Put] {
        let op = doc.operation("/data/c", method).unwrap();
        let schema = match method {
            HttpMethod::Get => op.responses["200"].schema.as_ref(),
            _ => op.body().unwrap().schema.as_ref(),
        };
        assert_eq!(
            schema.unwrap().reference.as_deref(),
            Some("#/definitions/acme.Base")
        );
    }
}
