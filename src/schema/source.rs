//! Serde hand-off format for pre-parsed schema modules.
//!
//! Parsing the schema language itself happens upstream; what arrives here is
//! the statement tree already split into modules, in YAML or JSON:
//!
//! ```yaml
//! modules:
//!   - name: acme-system
//!     prefix: sys
//!     groupings:
//!       - name: endpoint
//!         children:
//!           - { kind: leaf, name: address, type: string }
//!     data:
//!       - kind: list
//!         name: server
//!         key: [name]
//!         uses: [endpoint]
//!         children:
//!           - { kind: leaf, name: name, type: string }
//! ```

use serde::Deserialize;
use serde_json::Value;

/// A file holding one or more modules.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    #[serde(default)]
    pub modules: Vec<ModuleSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ModuleSource {
    pub name: String,
    /// Prefix used by `prefix:name` references; defaults to the module name.
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub revision: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub typedefs: Vec<TypedefSource>,
    #[serde(default)]
    pub groupings: Vec<GroupingSource>,
    #[serde(default)]
    pub data: Vec<NodeSource>,
    #[serde(default)]
    pub rpcs: Vec<RpcSource>,
    #[serde(default)]
    pub augments: Vec<AugmentSource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TypedefSource {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeSource,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
}

/// A type reference: either a bare name (`string`, `sys:port-number`) or a
/// map carrying restrictions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TypeSource {
    Name(String),
    Spec(TypeSpecSource),
}

impl TypeSource {
    pub fn name(&self) -> &str {
        match self {
            TypeSource::Name(n) => n,
            TypeSource::Spec(s) => &s.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TypeSpecSource {
    pub name: String,
    /// Literal values of an `enumeration`.
    #[serde(default, rename = "enum")]
    pub enumeration: Vec<String>,
    /// Target path of a `leafref`.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    /// Member types of a `union`.
    #[serde(default)]
    pub types: Vec<TypeSource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GroupingSource {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub uses: Vec<String>,
    #[serde(default)]
    pub children: Vec<NodeSource>,
}

/// Data definition statements, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NodeSource {
    Container(ContainerSource),
    List(ListSource),
    Leaf(LeafSource),
    LeafList(LeafSource),
    Choice(ChoiceSource),
}

impl NodeSource {
    pub fn name(&self) -> &str {
        match self {
            NodeSource::Container(c) => &c.name,
            NodeSource::List(l) => &l.name,
            NodeSource::Leaf(l) | NodeSource::LeafList(l) => &l.name,
            NodeSource::Choice(c) => &c.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ContainerSource {
    pub name: String,
    #[serde(default)]
    pub config: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub presence: Option<String>,
    #[serde(default)]
    pub uses: Vec<String>,
    #[serde(default)]
    pub children: Vec<NodeSource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ListSource {
    pub name: String,
    #[serde(default)]
    pub key: Vec<String>,
    #[serde(default)]
    pub config: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub uses: Vec<String>,
    #[serde(default)]
    pub children: Vec<NodeSource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LeafSource {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeSource,
    #[serde(default)]
    pub config: Option<bool>,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ChoiceSource {
    pub name: String,
    #[serde(default)]
    pub config: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cases: Vec<CaseSource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CaseSource {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uses: Vec<String>,
    #[serde(default)]
    pub children: Vec<NodeSource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RpcSource {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub input: Option<IoSource>,
    #[serde(default)]
    pub output: Option<IoSource>,
}

/// Body of an RPC `input` or `output` statement.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct IoSource {
    #[serde(default)]
    pub uses: Vec<String>,
    #[serde(default)]
    pub children: Vec<NodeSource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AugmentSource {
    /// Absolute schema path, e.g. `/sys:system/sys:server`.
    pub target: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uses: Vec<String>,
    #[serde(default)]
    pub children: Vec<NodeSource>,
}
