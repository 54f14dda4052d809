//! # Schema Module
//!
//! The in-memory schema forest the compiler reads from.
//!
//! Source modules arrive pre-parsed in the serde format of [`source`]. Loading
//! links them into a [`SchemaContext`]: an arena of [`SchemaNode`]s addressed
//! by [`NodeId`], with `uses` expanded into copies, augmentations applied, and
//! `config` inherited down the tree.
//!
//! ```rust
//! use yang2rest::schema::{load_schema_str, SourceFormat};
//!
//! let ctx = load_schema_str(
//!     "modules:\n  - name: acme\n    data:\n      - { kind: container, name: system }\n",
//!     SourceFormat::Yaml,
//! )?;
//! assert_eq!(ctx.modules().len(), 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

mod build;
mod load;
pub mod source;
mod types;

pub use load::*;
pub use types::*;
