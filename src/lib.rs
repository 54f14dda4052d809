//! # yang2rest
//!
//! **yang2rest** compiles YANG-style data model schema trees into
//! [Swagger 2.0](https://swagger.io/specification/v2/) REST API specifications:
//! one path per addressable data node, CRUD operations gated by the node's
//! configuration flag, one POST per RPC, and a definitions table deduplicated
//! across `uses`, aliasing and augmentation.
//!
//! ## Architecture
//!
//! - **[`schema`]** - Pre-parsed module input, linked into an arena [`schema::SchemaContext`]
//! - **[`naming`]** - Unique definition names and the canonical-node table
//! - **[`types`]** - Leaf types, typedef chains and leafrefs to Swagger property schemas
//! - **[`model`]** - Definition builders (`optimizing` and `unpacking` strategies)
//! - **[`path`]** - Path segment stack and the `rfc8040`/`odl`/`segment` path printers
//! - **[`handler`]** - Operations emitted per data node and per RPC
//! - **[`document`]** - The Swagger document being assembled
//! - **[`postprocess`]** - Rewrite passes run over the finished document
//! - **[`generator`]** - Orchestrates one compilation run
//! - **[`config`]**, **[`cli`]**, **[`logging`]** - Configuration, command line, tracing setup
//!
//! ### Compilation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as CLI<br/>(yang2rest-gen)
//!     participant Load as schema::load_schema
//!     participant Gen as SwaggerGenerator
//!     participant Handler as PathHandler
//!     participant Models as DataObjectBuilder
//!     participant Post as Pipeline
//!
//!     CLI->>Load: load_schema(files)
//!     Load-->>CLI: SchemaContext
//!     CLI->>Gen: new(&ctx, config)
//!     Gen->>Gen: validate config, select modules
//!     loop every data node, depth first
//!         Gen->>Handler: handle_data(segment, node)
//!         Handler->>Models: schema_for(node)
//!         Models-->>Handler: $ref
//!         Handler->>Handler: GET / PUT / POST / DELETE
//!     end
//!     loop every rpc
//!         Gen->>Handler: handle_rpc(rpc)
//!     end
//!     Gen->>Models: take_definitions()
//!     Gen->>Post: apply(&mut doc)
//!     Gen->>Gen: check_references()
//!     Gen-->>CLI: SwaggerDocument
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use yang2rest::schema::{load_schema_str, SourceFormat};
//! use yang2rest::{GeneratorConfig, SwaggerGenerator};
//!
//! let ctx = load_schema_str(
//!     r#"
//! modules:
//!   - name: acme
//!     data:
//!       - kind: list
//!         name: server
//!         key: [name]
//!         children:
//!           - { kind: leaf, name: name, type: string }
//! "#,
//!     SourceFormat::Yaml,
//! )?;
//! let doc = SwaggerGenerator::new(&ctx, GeneratorConfig::default())?.generate()?;
//! assert!(doc.paths.contains_key("/data/server={name}"));
//! assert!(doc.definitions.contains_key("acme.Server"));
//! println!("{}", doc.to_yaml()?);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Command Line
//!
//! ```bash
//! yang2rest-gen generate --input acme.yaml --dialect odl --output acme-api.json
//! ```

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod generator;
pub mod handler;
pub mod logging;
pub mod model;
pub mod naming;
pub mod path;
pub mod postprocess;
pub mod schema;
pub mod types;

pub use config::GeneratorConfig;
pub use document::SwaggerDocument;
pub use error::{CompileError, ConfigError, SchemaError};
pub use generator::{generate, SwaggerGenerator};
pub use model::ModelStrategy;
pub use path::PathDialect;
