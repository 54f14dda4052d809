use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Prefix of every definition reference.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// `#/definitions/<name>`
pub fn definition_ref(name: &str) -> String {
    format!("{DEFINITIONS_PREFIX}{name}")
}

/// Definition name targeted by a `$ref` string.
pub fn ref_target(reference: &str) -> &str {
    reference
        .strip_prefix(DEFINITIONS_PREFIX)
        .unwrap_or(reference)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
}

/// The JSON-schema subset used for properties and object definitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enumeration: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Vendor extensions, keys start with `x-`.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Schema {
    pub fn of_type(schema_type: SchemaType) -> Self {
        Schema {
            schema_type: Some(schema_type),
            ..Default::default()
        }
    }

    pub fn with_format(schema_type: SchemaType, format: &str) -> Self {
        Schema {
            schema_type: Some(schema_type),
            format: Some(format.to_string()),
            ..Default::default()
        }
    }

    /// `{ "$ref": "#/definitions/<name>" }`
    pub fn reference_to(name: &str) -> Self {
        Schema {
            reference: Some(definition_ref(name)),
            ..Default::default()
        }
    }

    pub fn array_of(items: Schema) -> Self {
        Schema {
            schema_type: Some(SchemaType::Array),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    pub fn object(properties: BTreeMap<String, Schema>) -> Self {
        Schema {
            schema_type: Some(SchemaType::Object),
            properties,
            ..Default::default()
        }
    }

    pub fn is_ref(&self) -> bool {
        self.reference.is_some()
    }

    /// Visit the definition name of every `$ref` in this schema, depth first.
    pub fn visit_refs(&self, f: &mut dyn FnMut(&str)) {
        if let Some(r) = &self.reference {
            f(ref_target(r));
        }
        if let Some(items) = &self.items {
            items.visit_refs(f);
        }
        for prop in self.properties.values() {
            prop.visit_refs(f);
        }
    }

    /// Point references at new names according to `renames`.
    pub fn rewrite_refs(&mut self, renames: &HashMap<String, String>) {
        if let Some(r) = &self.reference {
            if let Some(new) = renames.get(ref_target(r)) {
                self.reference = Some(definition_ref(new));
            }
        }
        if let Some(items) = &mut self.items {
            items.rewrite_refs(renames);
        }
        for prop in self.properties.values_mut() {
            prop.rewrite_refs(renames);
        }
    }
}

/// Composition of parent definitions plus optional own attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComposedModel {
    /// Parent definition names, in composition order.
    pub parents: Vec<String>,
    /// Own attributes, always an object schema when present.
    pub child: Option<Schema>,
    pub description: Option<String>,
}

impl Serialize for ComposedModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut all_of: Vec<Schema> = self.parents.iter().map(|p| Schema::reference_to(p)).collect();
        if let Some(child) = &self.child {
            all_of.push(child.clone());
        }
        let mut map = serializer.serialize_map(None)?;
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        map.serialize_entry("allOf", &all_of)?;
        map.end()
    }
}

/// How a reference is held by a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// Referenced as a property value.
    Uses,
    /// Referenced as a composition parent.
    References,
}

/// A named definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModelEntry {
    Simple(Schema),
    Composed(ComposedModel),
}

impl ModelEntry {
    pub fn description(&self) -> Option<&str> {
        match self {
            ModelEntry::Simple(s) => s.description.as_deref(),
            ModelEntry::Composed(c) => c.description.as_deref(),
        }
    }

    pub fn as_composed(&self) -> Option<&ComposedModel> {
        match self {
            ModelEntry::Composed(c) => Some(c),
            ModelEntry::Simple(_) => None,
        }
    }

    /// Properties declared directly on this entry (not inherited).
    pub fn own_properties(&self) -> Option<&BTreeMap<String, Schema>> {
        match self {
            ModelEntry::Simple(s) => Some(&s.properties),
            ModelEntry::Composed(c) => c.child.as_ref().map(|s| &s.properties),
        }
    }

    pub fn visit_refs(&self, f: &mut dyn FnMut(RefKind, &str)) {
        match self {
            ModelEntry::Simple(s) => s.visit_refs(&mut |r| f(RefKind::Uses, r)),
            ModelEntry::Composed(c) => {
                for parent in &c.parents {
                    f(RefKind::References, parent);
                }
                if let Some(child) = &c.child {
                    child.visit_refs(&mut |r| f(RefKind::Uses, r));
                }
            }
        }
    }

    pub fn rewrite_refs(&mut self, renames: &HashMap<String, String>) {
        match self {
            ModelEntry::Simple(s) => s.rewrite_refs(renames),
            ModelEntry::Composed(c) => {
                for parent in c.parents.iter_mut() {
                    if let Some(new) = renames.get(parent.as_str()) {
                        *parent = new.clone();
                    }
                }
                // a rename can make two parents identical
                let mut seen = std::collections::HashSet::new();
                c.parents.retain(|p| seen.insert(p.clone()));
                if let Some(child) = &mut c.child {
                    child.rewrite_refs(renames);
                }
            }
        }
    }
}
