use std::path::Path;

use anyhow::Context;

use super::types::ModuleSpec;

/// Load a module config from a `.json`, `.yaml` or `.yml` file.
///
/// Only the document shape is checked here; attribute, relation and index
/// records are validated by the compiler.
pub fn load_module_spec(path: &Path) -> anyhow::Result<ModuleSpec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read module config: {}", path.display()))?;
    parse_module_spec(&content, is_yaml(path))
        .with_context(|| format!("Failed to parse module config: {}", path.display()))
}

pub fn parse_module_spec(content: &str, yaml: bool) -> anyhow::Result<ModuleSpec> {
    let spec = if yaml {
        serde_yaml::from_str(content)?
    } else {
        serde_json::from_str(content)?
    };
    Ok(spec)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
