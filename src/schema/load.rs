use super::source::{ModuleSource, SchemaFile};
use super::types::SchemaContext;
use anyhow::Context;
use std::path::Path;
use tracing::info;

/// Serialization format of a schema source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Yaml,
    Json,
}

impl SourceFormat {
    /// Pick the format from a file extension; anything but `.json` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SourceFormat::Json,
            _ => SourceFormat::Yaml,
        }
    }
}

/// Parse the modules held in one source text.
pub fn parse_modules(content: &str, format: SourceFormat) -> anyhow::Result<Vec<ModuleSource>> {
    let file: SchemaFile = match format {
        SourceFormat::Yaml => serde_yaml::from_str(content)?,
        SourceFormat::Json => serde_json::from_str(content)?,
    };
    Ok(file.modules)
}

/// Build a schema context from a single in-memory source text.
pub fn load_schema_str(content: &str, format: SourceFormat) -> anyhow::Result<SchemaContext> {
    let modules = parse_modules(content, format)?;
    Ok(SchemaContext::from_sources(&modules)?)
}

/// Load and link the modules found in every file of `paths`.
///
/// Modules from all files share one context, so groupings and augment
/// targets may cross file boundaries.
pub fn load_schema<P: AsRef<Path>>(paths: &[P]) -> anyhow::Result<SchemaContext> {
    let mut modules = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read schema file {}", path.display()))?;
        let parsed = parse_modules(&content, SourceFormat::from_path(path))
            .with_context(|| format!("failed to parse schema file {}", path.display()))?;
        info!(file = %path.display(), modules = parsed.len(), "schema file loaded");
        modules.extend(parsed);
    }
    SchemaContext::from_sources(&modules).context("failed to link schema modules")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_yaml_and_json_files() {
        let mut yaml = NamedTempFile::with_suffix(".yaml").unwrap();
        yaml.write_all(b"modules:\n  - name: first\n    groupings:\n      - name: shared\n        children:\n          - { kind: leaf, name: id, type: string }\n")
            .unwrap();
        let mut json = NamedTempFile::with_suffix(".json").unwrap();
        json.write_all(
            br#"{"modules":[{"name":"second","data":[{"kind":"container","name":"box","uses":["first:shared"]}]}]}"#,
        )
        .unwrap();

        let ctx = load_schema(&[yaml.path(), json.path()]).unwrap();
        assert_eq!(ctx.modules().len(), 2);
        let boxed = ctx.module("second").unwrap().data[0];
        assert!(ctx.child_named(boxed, "id").is_some());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.json")), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(Path::new("a.yml")), SourceFormat::Yaml);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_schema(&["/definitely/not/here.yaml"]).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.yaml"));
    }
}
