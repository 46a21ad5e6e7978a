//! # Generator Configuration
//!
//! Project-level settings read from `<root>/modmaker.toml`. Every key is
//! optional; a missing file means defaults.
//!
//! ```toml
//! module_path = "Modules"
//! module_namespace = "Modules"
//! app_models_path = "app/Models"
//! app_models_namespace = "App\\Models"
//! config_dir = "module-maker-config"
//! ```
//!
//! ## Environment Variables
//!
//! ### `MODMAKER_MODULE_PATH`
//!
//! Overrides `module_path`, relative to the project root unless absolute.
//!
//! ## Module Namespace
//!
//! Generated classes live under `<module_namespace>\<Module>`. Without an
//! explicit `module_namespace` it is the studly last segment of `module_path`,
//! so `src/modules` gives `Modules`.
//!
//! ## Config File Resolution
//!
//! A module config named on the command line is looked up in order:
//!
//! 1. `<modules>/<Module>/config/<file>`
//! 2. `<modules>/<config_dir>/<file>`
//! 3. `<root>/config/<file>`
//! 4. the path as given

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::compiler::resolve::DEFAULT_MODULES_NAMESPACE;
use crate::naming;

pub const CONFIG_FILE: &str = "modmaker.toml";
pub const MODULE_PATH_ENV: &str = "MODMAKER_MODULE_PATH";

/// Settings loaded from `modmaker.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory holding the modules (default: `Modules`)
    pub module_path: String,
    /// Root PHP namespace of the modules (default: derived from `module_path`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_namespace: Option<String>,
    /// Directory of the application-wide models (default: `app/Models`)
    pub app_models_path: String,
    /// Namespace of the application-wide models (default: `App\Models`)
    pub app_models_namespace: String,
    /// Directory under `module_path` holding shared module configs
    pub config_dir: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            module_path: "Modules".to_string(),
            module_namespace: None,
            app_models_path: "app/Models".to_string(),
            app_models_namespace: "App\\Models".to_string(),
            config_dir: "module-maker-config".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load `<root>/modmaker.toml` (if any) and apply environment overrides.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let mut config = load_config_file(&root.join(CONFIG_FILE))?.unwrap_or_default();
        config.apply_env_overrides(|k| env::var(k).ok());
        Ok(config)
    }

    pub(crate) fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(MODULE_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            self.module_path = path;
        }
    }

    /// Root namespace of the generated module classes.
    pub fn modules_namespace(&self) -> String {
        if let Some(ns) = self
            .module_namespace
            .as_deref()
            .map(|ns| ns.trim_matches('\\'))
            .filter(|ns| !ns.is_empty())
        {
            return ns.to_string();
        }
        Path::new(&self.module_path)
            .file_name()
            .map(|segment| naming::studly(&segment.to_string_lossy()))
            .filter(|ns| naming::is_identifier(ns))
            .unwrap_or_else(|| DEFAULT_MODULES_NAMESPACE.to_string())
    }

    /// Serialize for `modmaker setup`.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Read a config file, `Ok(None)` when it does not exist.
pub fn load_config_file(config_path: &Path) -> anyhow::Result<Option<GeneratorConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let config: GeneratorConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;
    Ok(Some(config))
}

/// Resolved filesystem locations for one project.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub config: GeneratorConfig,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>, config: GeneratorConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Load the config of the project at `root`.
    pub fn discover(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        let config = GeneratorConfig::load(&root)?;
        Ok(Self::new(root, config))
    }

    pub fn modules_dir(&self) -> PathBuf {
        self.root.join(&self.config.module_path)
    }

    pub fn module_dir(&self, module: &str) -> PathBuf {
        self.modules_dir().join(module)
    }

    pub fn shared_config_dir(&self) -> PathBuf {
        self.modules_dir().join(&self.config.config_dir)
    }

    pub fn app_models_dir(&self) -> PathBuf {
        self.root.join(&self.config.app_models_path)
    }

    /// Three-tier lookup of a module config file.
    pub fn resolve_config_file(&self, module: &str, file: &Path) -> PathBuf {
        let candidates = [
            self.module_dir(module).join("config").join(file),
            self.shared_config_dir().join(file),
            self.root.join("config").join(file),
        ];
        candidates
            .into_iter()
            .find(|p| p.is_file())
            .unwrap_or_else(|| file.to_path_buf())
    }
}
