//! # CLI Module
//!
//! Command-line front end of the compiler, shipped as the `yang2rest-gen`
//! binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Compile schema files into a Swagger 2.0 document:
//!
//! ```bash
//! yang2rest-gen generate --input acme.yaml --output acme-api.yaml
//! ```
//!
//! Options:
//! - `--input <FILE>...` - Schema files, loaded into one context (required)
//! - `--config <FILE>` - Generator configuration (TOML), also read from `Y2R_CONFIG`
//! - `--output <FILE>` - Output file; stdout when omitted
//! - `--format yaml|json` - Output format; inferred from the output extension
//! - `--dialect rfc8040|odl|segment` - Path dialect
//! - `--strategy optimizing|unpacking` - Model strategy
//! - `--module <NAME>` - Restrict path generation to a module (repeatable)
//! - `--elements data,rpc` - Element kinds to generate
//! - `--postprocess <PASS>,...` - Replace the post-processing pipeline
//! - `--security basic|api-key` - Require a security scheme
//!
//! ### `inspect`
//!
//! Print the modules, data roots, RPCs and augmentations of schema files:
//!
//! ```bash
//! yang2rest-gen inspect --input acme.yaml --input acme-ext.yaml
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,no_run
//! use yang2rest::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! run_cli(cli)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

mod commands;


pub use commands::{describe, run_cli, Cli, Commands, GenerateArgs, OutputFormat};
