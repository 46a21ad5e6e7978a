//! # Module Manifest
//!
//! `Modules/<Module>/config/modmaker.json` records which entities a module
//! contains, in registration order. The aggregate files (module seeder, service
//! provider, route tables) are rendered from it on every run, so components
//! added later with `make --add` are merged without duplicates and without
//! editing previously generated text.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const MANIFEST_FILE: &str = "modmaker.json";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub module: String,
    #[serde(default)]
    pub entities: Vec<String>,
}

impl ModuleManifest {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            entities: Vec::new(),
        }
    }

    pub fn path(module_dir: &Path) -> PathBuf {
        module_dir.join("config").join(MANIFEST_FILE)
    }

    /// Load the manifest of the module at `module_dir`; empty if there is none.
    pub fn load(module: &str, module_dir: &Path) -> anyhow::Result<Self> {
        let path = Self::path(module_dir);
        if !path.exists() {
            return Ok(Self::new(module));
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read module manifest: {}", path.display()))?;
        let mut manifest: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse module manifest: {}", path.display()))?;
        manifest.module = module.to_string();
        Ok(manifest)
    }

    /// Append `entity` unless already present. Returns whether it was added.
    pub fn register(&mut self, entity: &str) -> bool {
        if self.contains(entity) {
            return false;
        }
        self.entities.push(entity.to_string());
        true
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entities.iter().any(|e| e == entity)
    }

    pub fn save(&self, module_dir: &Path) -> anyhow::Result<()> {
        let path = Self::path(module_dir);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json + "\n")
            .with_context(|| format!("Failed to write module manifest: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn test_register_is_append_only_and_deduplicated() {
        let mut m = ModuleManifest::new("Blog");
        assert!(m.register("Post"));
        assert!(m.register("Comment"));
        assert!(!m.register("Post"));
        assert_eq!(m.entities, ["Post", "Comment"]);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = ModuleManifest::new("Blog");
        m.register("Post");
        m.save(dir.path()).unwrap();

        let mut loaded = ModuleManifest::load("Blog", dir.path()).unwrap();
        assert_eq!(loaded, m);
        loaded.register("Tag");
        loaded.register("Post");
        loaded.save(dir.path()).unwrap();
        let again = ModuleManifest::load("Blog", dir.path()).unwrap();
        assert_eq!(again.entities, ["Post", "Tag"]);
    }

    #[test]
    fn test_missing_manifest_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let m = ModuleManifest::load("Blog", dir.path()).unwrap();
        assert!(m.entities.is_empty());
        assert_eq!(m.module, "Blog");
    }
}
