//! Filesystem discovery: which models already exist, which migrations are on
//! disk. Rebuilt on every run so references resolve against the current state
//! of the project.

use std::fs;
use std::path::{Path, PathBuf};

use crate::compiler::EntityRegistry;
use crate::config::ProjectPaths;
use crate::sequence::MigrationSequence;

/// Class names of the `*.php` files directly inside `dir`, sorted.
pub fn model_classes(dir: &Path) -> anyhow::Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut classes = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("php") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            classes.push(stem.to_string());
        }
    }
    classes.sort();
    Ok(classes)
}

/// Names of the module directories under the modules path, sorted.
///
/// The shared config directory is not a module.
pub fn module_names(paths: &ProjectPaths) -> anyhow::Result<Vec<String>> {
    let dir = paths.modules_dir();
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut modules = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name != paths.config.config_dir && !name.starts_with('.') {
            modules.push(name);
        }
    }
    modules.sort();
    Ok(modules)
}

/// Build the resolution registry for `module` from what is on disk.
pub fn build_registry(paths: &ProjectPaths, module: &str) -> anyhow::Result<EntityRegistry> {
    let mut registry =
        EntityRegistry::new(module).with_modules_namespace(&paths.config.modules_namespace());
    for other in module_names(paths)? {
        let models = model_classes(&paths.module_dir(&other).join("Models"))?;
        registry = registry.with_module(&other, models);
    }
    let global = model_classes(&paths.app_models_dir())?;
    registry = registry.with_global(&paths.config.app_models_namespace, global);
    tracing::debug!(module, "entity registry built from disk");
    Ok(registry)
}

/// Migration file names in `dir`, sorted.
pub fn migration_files(dir: &Path) -> anyhow::Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if name.ends_with(".php") {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}

/// Feed every migration already in `dir` to `sequence`.
pub fn seed_sequence<S: MigrationSequence + ?Sized>(
    sequence: &mut S,
    module: &str,
    dir: &Path,
) -> anyhow::Result<()> {
    for file in migration_files(dir)? {
        sequence.observe(module, &file);
    }
    Ok(())
}

/// An existing `*_create_<table>_table.php` migration in `dir`.
pub fn existing_migration(dir: &Path, table: &str) -> anyhow::Result<Option<PathBuf>> {
    let suffix = format!("_create_{table}_table.php");
    Ok(migration_files(dir)?
        .into_iter()
        .find(|f| f.ends_with(&suffix))
        .map(|f| dir.join(f)))
}
