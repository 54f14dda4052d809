use crate::config::{ElementKind, GeneratorConfig};
use crate::generator::SwaggerGenerator;
use crate::model::ModelStrategy;
use crate::path::PathDialect;
use crate::postprocess::{PostProcessor, SecurityConfig};
use crate::schema::{load_schema, NodeKind, SchemaContext};
use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Command-line interface for yang2rest
///
/// Compiles schema modules into a Swagger 2.0 document.
#[derive(Parser, Debug)]
#[command(name = "yang2rest-gen")]
#[command(version, about = "Compile YANG-style schemas into Swagger REST specifications", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a Swagger document from schema files
    Generate(GenerateArgs),
    /// List the modules, data roots and RPCs of schema files
    Inspect {
        /// Schema files (YAML or JSON), loaded into one context
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
}

/// Serialization of the generated document
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl OutputFormat {
    /// `.json` outputs are JSON, everything else YAML.
    pub fn for_path(path: Option<&Path>) -> Self {
        match path.and_then(|p| p.extension()).and_then(|e| e.to_str()) {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Yaml,
        }
    }
}

/// Arguments of `generate`. Flags override values from `--config`.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Schema files (YAML or JSON), loaded into one context
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Generator configuration file (TOML)
    #[arg(short, long, env = "Y2R_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format; inferred from the output extension when omitted
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Path dialect: rfc8040, odl or segment
    #[arg(short, long)]
    pub dialect: Option<PathDialect>,

    /// Model strategy: optimizing or unpacking
    #[arg(short, long)]
    pub strategy: Option<ModelStrategy>,

    /// Module to generate paths for (repeatable); all when omitted
    #[arg(short, long = "module")]
    pub modules: Vec<String>,

    /// Data-node levels expanded below each module root
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Element kinds to generate (comma-separated): data, rpc
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub elements: Option<Vec<ElementKind>>,

    /// Post-processing passes in order (comma-separated)
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub postprocess: Option<Vec<PostProcessor>>,

    /// Security scheme: basic or api-key
    #[arg(long)]
    pub security: Option<SecurityConfig>,

    /// Emit GET only, even for configuration data
    #[arg(long, default_value_t = false)]
    pub read_only: bool,

    /// Emit PATCH for configuration data
    #[arg(long, default_value_t = false)]
    pub patch: bool,

    /// Prefix every path segment with its module name
    #[arg(long, default_value_t = false)]
    pub use_module_name: bool,

    /// Document title
    #[arg(long)]
    pub title: Option<String>,
}

impl GenerateArgs {
    /// Configuration file (or defaults) with flags applied on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed.
    pub fn config(&self) -> anyhow::Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };
        if let Some(dialect) = self.dialect {
            config.dialect = dialect;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if !self.modules.is_empty() {
            config.modules = self.modules.clone();
        }
        if self.max_depth.is_some() {
            config.max_depth = self.max_depth;
        }
        if let Some(elements) = &self.elements {
            config.elements = elements.clone();
        }
        if let Some(passes) = &self.postprocess {
            config.postprocess = passes.clone();
        }
        if let Some(security) = &self.security {
            config.security = Some(security.clone());
        }
        if self.read_only {
            config.full_crud = false;
        }
        config.patch |= self.patch;
        config.use_module_name |= self.use_module_name;
        if self.title.is_some() {
            config.title = self.title.clone();
        }
        Ok(config)
    }

    fn format(&self) -> OutputFormat {
        self.format
            .unwrap_or_else(|| OutputFormat::for_path(self.output.as_deref()))
    }
}

/// Run a parsed command line.
///
/// # Errors
///
/// Propagates loading, configuration, compilation and output failures.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate(args) => generate(&args),
        Commands::Inspect { input } => {
            let ctx = load_schema(&input)?;
            print!("{}", describe(&ctx));
            Ok(())
        }
    }
}

fn generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let config = args.config()?;
    let ctx = load_schema(&args.input)?;
    let doc = SwaggerGenerator::new(&ctx, config)?.generate()?;
    let rendered = match args.format() {
        OutputFormat::Yaml => doc.to_yaml()?,
        OutputFormat::Json => doc.to_json()?,
    };
    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            info!(output = %path.display(), paths = doc.paths.len(), "document written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("Failed to write document to stdout")?;
        }
    }
    Ok(())
}

/// One line per module, then its data roots and RPCs indented.
pub fn describe(ctx: &SchemaContext) -> String {
    let mut out = String::new();
    for module in ctx.modules() {
        out.push_str(&format!("{} (prefix {})", module.name, module.prefix));
        if let Some(revision) = &module.revision {
            out.push_str(&format!(" revision {revision}"));
        }
        out.push('\n');
        for root in &module.data {
            let node = ctx.node(*root);
            let access = if node.config { "rw" } else { "ro" };
            out.push_str(&format!(
                "  {} {} [{access}]\n",
                node.kind.keyword(),
                node.name()
            ));
        }
        for rpc in &module.rpcs {
            out.push_str(&format!("  rpc {}\n", ctx.node(*rpc).name()));
        }
        for augment in &module.augments {
            if let NodeKind::Augmentation { target } = ctx.node(*augment).kind {
                out.push_str(&format!("  augment {}\n", ctx.schema_path(target)));
            }
        }
    }
    out
}
