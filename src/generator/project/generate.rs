use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use super::workspace;
use crate::compiler::{
    compile_component, compile_module, CompileOptions, EntityDescriptor, EntityRegistry,
};
use crate::config::ProjectPaths;
use crate::diagnostics::{self, Diagnostic};
use crate::generator::templates::{
    ApiRoutesTemplateData, ControllerTemplateData, EntityNames, FactoryTemplateData, FileWriter,
    MigrationTemplateData, ModelTemplateData, ModuleSeederTemplateData, ProviderTemplateData,
    RepositoryInterfaceTemplateData, RepositoryTemplateData, RequestTemplateData,
    SeederTemplateData, ServiceInterfaceTemplateData, ServiceTemplateData, TestTemplateData,
    WebRoutesTemplateData,
};
use crate::manifest::ModuleManifest;
use crate::naming;
use crate::sequence::MigrationSequence;
use crate::spec::{ComponentSpec, ModuleSpec};

/// Directories every module gets, relative to the module root
pub const MODULE_FOLDERS: &[&str] = &[
    "config",
    "Http/Controllers",
    "Http/Requests",
    "Database/Migrations",
    "Database/Seeders",
    "Database/Factories",
    "routes",
    "Models",
    "Services/Contracts",
    "Repositories/Contracts",
    "Providers",
    "resources/views",
    "resources/lang",
    "Tests/Unit",
];

/// Individual stubs to add to an existing module.
///
/// Each value names the entity; a conventional suffix (`PostController`,
/// `PostStoreRequest`, `create_posts_table`) is accepted and stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSelection {
    pub model: Option<String>,
    pub controller: Option<String>,
    pub request: Option<String>,
    pub service: Option<String>,
    pub repository: Option<String>,
    pub migration: Option<String>,
}

impl ComponentSelection {
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.controller.is_none()
            && self.request.is_none()
            && self.service.is_none()
            && self.repository.is_none()
            && self.migration.is_none()
    }
}

/// How `make` builds the module
#[derive(Debug, Clone)]
pub enum GenerationMode {
    /// A module with one clean entity named after the module. Fails if the
    /// module exists.
    Clean,
    /// Every component of a module config. Fails if the module exists unless
    /// `add` is set.
    Dynamic { spec: ModuleSpec, add: bool },
    /// Clean stubs inside an existing module.
    Components(ComponentSelection),
}

impl GenerationMode {
    fn label(&self) -> &'static str {
        match self {
            GenerationMode::Clean => "clean",
            GenerationMode::Dynamic { add: false, .. } => "dynamic",
            GenerationMode::Dynamic { add: true, .. } => "dynamic-add",
            GenerationMode::Components(_) => "components",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Overwrite existing per-entity files
    pub force: bool,
    /// Report planned writes without touching the filesystem
    pub dry_run: bool,
    /// Treat unresolved references as errors
    pub strict: bool,
}

/// Outcome of one `make` run
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub module: String,
    pub module_dir: PathBuf,
    /// Entities that were generated, in order
    pub entities: Vec<String>,
    /// Files written, or planned on a dry run
    pub written: Vec<PathBuf>,
    /// Existing files left alone
    pub skipped: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
    pub dry_run: bool,
}

impl GenerationReport {
    pub fn has_errors(&self) -> bool {
        diagnostics::has_errors(&self.diagnostics)
    }
}

/// Generate (or extend) the module `name` under the project at `paths`.
///
/// Entity compile failures do not abort the run: they are returned in
/// [`GenerationReport::diagnostics`] and every other entity is written.
///
/// # Errors
///
/// Returns an error if the module name is invalid, the module's existence
/// does not match the mode, or a file operation fails.
pub fn generate_module<S: MigrationSequence + ?Sized>(
    paths: &ProjectPaths,
    name: &str,
    mode: GenerationMode,
    options: GenerateOptions,
    sequence: &mut S,
) -> anyhow::Result<GenerationReport> {
    let module = naming::studly(name);
    if !naming::is_identifier(&module) {
        bail!("Invalid module name '{name}'");
    }
    let module_dir = paths.module_dir(&module);
    let exists = module_dir.is_dir();
    match &mode {
        GenerationMode::Clean if exists => {
            bail!("Module '{module}' already exists at {}", module_dir.display())
        }
        GenerationMode::Dynamic { add: false, .. } if exists => bail!(
            "Module '{module}' already exists at {}; use --add to add components to it",
            module_dir.display()
        ),
        GenerationMode::Components(_) if !exists => bail!(
            "Module '{module}' does not exist; create it first with `modmaker make {module}`"
        ),
        GenerationMode::Components(selection) if selection.is_empty() => {
            bail!("No component selected for module '{module}'")
        }
        _ => {}
    }

    tracing::info!(module = %module, mode = mode.label(), dry_run = options.dry_run, "generating module");

    if !options.dry_run {
        create_folders(&module_dir)?;
    }
    let registry = workspace::build_registry(paths, &module)?;
    workspace::seed_sequence(sequence, &module, &module_dir.join("Database/Migrations"))?;

    let compile_options = CompileOptions {
        strict: options.strict,
    };
    let mut writer = FileWriter::new(options.force, options.dry_run);
    let mut report = GenerationReport {
        module: module.clone(),
        module_dir: module_dir.clone(),
        dry_run: options.dry_run,
        ..Default::default()
    };

    match mode {
        GenerationMode::Clean => {
            let descriptor = compile_component(
                &module,
                &ComponentSpec::new(module.as_str()),
                &registry,
                compile_options,
            )?;
            write_entity(&mut writer, &module_dir, &descriptor, true, sequence)?;
            report.entities.push(descriptor.entity.clone());
            update_aggregates(&mut writer, &module_dir, &registry, &report.entities)?;
        }
        GenerationMode::Dynamic { spec, .. } => {
            if let Some(declared) = spec.module_name.as_deref() {
                if naming::studly(declared) != module {
                    tracing::warn!(
                        declared,
                        module = %module,
                        "config declares a different module name; using the command-line name"
                    );
                }
            }
            let compilation = compile_module(&module, &spec, &registry, compile_options);
            for descriptor in &compilation.descriptors {
                write_entity(&mut writer, &module_dir, descriptor, false, sequence)?;
                report.entities.push(descriptor.entity.clone());
            }
            report.diagnostics = compilation.diagnostics;
            update_aggregates(&mut writer, &module_dir, &registry, &report.entities)?;
        }
        GenerationMode::Components(selection) => {
            report.entities = write_components(
                &mut writer,
                &module_dir,
                &module,
                &selection,
                &registry,
                compile_options,
                sequence,
            )?;
        }
    }

    report.written = writer.written();
    report.skipped = writer.skipped();
    tracing::info!(
        module = %module,
        written = report.written.len(),
        skipped = report.skipped.len(),
        "module generation finished"
    );
    Ok(report)
}

fn create_folders(module_dir: &Path) -> anyhow::Result<()> {
    for folder in MODULE_FOLDERS {
        let dir = module_dir.join(folder);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(())
}

fn php_file(dir: &Path, class: &str) -> PathBuf {
    dir.join(format!("{class}.php"))
}

fn write_entity<S: MigrationSequence + ?Sized>(
    writer: &mut FileWriter,
    module_dir: &Path,
    descriptor: &EntityDescriptor,
    is_clean: bool,
    sequence: &mut S,
) -> anyhow::Result<()> {
    let names = EntityNames::of(descriptor);
    write_model(writer, module_dir, descriptor, is_clean)?;
    write_controller(writer, module_dir, &names)?;
    write_request(writer, module_dir, descriptor, is_clean)?;
    write_service(writer, module_dir, &names)?;
    write_repository(writer, module_dir, &names)?;
    write_migration(writer, module_dir, descriptor, sequence)?;
    writer.write(
        &php_file(&module_dir.join("Database/Seeders"), &names.seeder()),
        &SeederTemplateData {
            names: names.clone(),
        },
    )?;
    writer.write(
        &php_file(&module_dir.join("Tests/Unit"), &names.test()),
        &TestTemplateData { names },
    )?;
    Ok(())
}

fn write_model(
    writer: &mut FileWriter,
    module_dir: &Path,
    descriptor: &EntityDescriptor,
    is_clean: bool,
) -> anyhow::Result<()> {
    let names = EntityNames::of(descriptor);
    writer.write(
        &php_file(&module_dir.join("Models"), &names.entity),
        &ModelTemplateData::new(descriptor, is_clean),
    )?;
    writer.write(
        &php_file(&module_dir.join("Database/Factories"), &names.factory()),
        &FactoryTemplateData::new(descriptor, is_clean),
    )?;
    Ok(())
}

fn write_controller(
    writer: &mut FileWriter,
    module_dir: &Path,
    names: &EntityNames,
) -> anyhow::Result<()> {
    writer.write(
        &php_file(&module_dir.join("Http/Controllers"), &names.controller()),
        &ControllerTemplateData {
            names: names.clone(),
        },
    )?;
    Ok(())
}

fn write_request(
    writer: &mut FileWriter,
    module_dir: &Path,
    descriptor: &EntityDescriptor,
    is_clean: bool,
) -> anyhow::Result<()> {
    let data = RequestTemplateData::new(descriptor, is_clean);
    writer.write(
        &php_file(&module_dir.join("Http/Requests"), &data.names.request()),
        &data,
    )?;
    Ok(())
}

fn write_service(
    writer: &mut FileWriter,
    module_dir: &Path,
    names: &EntityNames,
) -> anyhow::Result<()> {
    writer.write(
        &php_file(&module_dir.join("Services/Contracts"), &names.service_interface()),
        &ServiceInterfaceTemplateData {
            names: names.clone(),
        },
    )?;
    writer.write(
        &php_file(&module_dir.join("Services"), &names.service()),
        &ServiceTemplateData {
            names: names.clone(),
        },
    )?;
    Ok(())
}

fn write_repository(
    writer: &mut FileWriter,
    module_dir: &Path,
    names: &EntityNames,
) -> anyhow::Result<()> {
    writer.write(
        &php_file(
            &module_dir.join("Repositories/Contracts"),
            &names.repository_interface(),
        ),
        &RepositoryInterfaceTemplateData {
            names: names.clone(),
        },
    )?;
    writer.write(
        &php_file(&module_dir.join("Repositories"), &names.repository()),
        &RepositoryTemplateData {
            names: names.clone(),
        },
    )?;
    Ok(())
}

/// Reuse an existing `*_create_<table>_table.php` rather than adding a second
/// migration for the same table.
fn write_migration<S: MigrationSequence + ?Sized>(
    writer: &mut FileWriter,
    module_dir: &Path,
    descriptor: &EntityDescriptor,
    sequence: &mut S,
) -> anyhow::Result<()> {
    let dir = module_dir.join("Database/Migrations");
    let path = match workspace::existing_migration(&dir, &descriptor.table)? {
        Some(existing) => existing,
        None => dir.join(format!(
            "{}_create_{}_table.php",
            sequence.next(&descriptor.module),
            descriptor.table
        )),
    };
    writer.write(&path, &MigrationTemplateData::new(descriptor))?;
    Ok(())
}

/// Register `entities` in the manifest and re-render the module-wide files
/// from it.
fn update_aggregates(
    writer: &mut FileWriter,
    module_dir: &Path,
    registry: &EntityRegistry,
    entities: &[String],
) -> anyhow::Result<()> {
    let module = registry.module();
    let root = registry.modules_namespace();
    let mut manifest = ModuleManifest::load(module, module_dir)?;
    for entity in entities {
        if manifest.register(entity) {
            tracing::debug!(module, entity = %entity, "registered in module manifest");
        }
    }
    if !writer.dry_run {
        manifest.save(module_dir)?;
    }

    let all: Vec<EntityNames> = manifest
        .entities
        .iter()
        .map(|e| EntityNames::new(module, e).within(root))
        .collect();
    let module_snake = naming::snake(module);

    writer.write_aggregate(
        &php_file(
            &module_dir.join("Providers"),
            &format!("{module}ServiceProvider"),
        ),
        &ProviderTemplateData {
            root: root.to_string(),
            module: module.to_string(),
            module_snake: module_snake.clone(),
            entities: all.clone(),
        },
    )?;
    writer.write_aggregate(
        &module_dir.join("routes/api.php"),
        &ApiRoutesTemplateData {
            module: module.to_string(),
            module_snake: module_snake.clone(),
            entities: all.clone(),
        },
    )?;
    writer.write_aggregate(
        &module_dir.join("routes/web.php"),
        &WebRoutesTemplateData {
            module: module.to_string(),
            module_snake,
            entities: all.clone(),
        },
    )?;
    writer.write_aggregate(
        &php_file(
            &module_dir.join("Database/Seeders"),
            &format!("{module}DatabaseSeeder"),
        ),
        &ModuleSeederTemplateData {
            root: root.to_string(),
            module: module.to_string(),
            entities: all,
        },
    )?;
    Ok(())
}

/// Entity named by a component flag, with a conventional suffix removed.
pub fn entity_from_component(value: &str, suffixes: &[&str]) -> String {
    let value = value.trim();
    let stripped = suffixes
        .iter()
        .find_map(|s| value.strip_suffix(s).filter(|rest| !rest.is_empty()))
        .unwrap_or(value);
    naming::studly(stripped)
}

/// Entity named by `--migration`: an entity name, or `create_<table>_table`.
pub fn entity_from_migration(value: &str) -> String {
    let value = value.trim();
    match value
        .strip_prefix("create_")
        .and_then(|v| v.strip_suffix("_table"))
    {
        Some(table) if !table.is_empty() => naming::model_for_table(table),
        _ => naming::studly(value),
    }
}

fn write_components<S: MigrationSequence + ?Sized>(
    writer: &mut FileWriter,
    module_dir: &Path,
    module: &str,
    selection: &ComponentSelection,
    registry: &EntityRegistry,
    options: CompileOptions,
    sequence: &mut S,
) -> anyhow::Result<Vec<String>> {
    let mut entities: Vec<String> = Vec::new();
    let mut clean = |entity: String| -> anyhow::Result<EntityDescriptor> {
        let descriptor =
            compile_component(module, &ComponentSpec::new(entity), registry, options)?;
        if !entities.contains(&descriptor.entity) {
            entities.push(descriptor.entity.clone());
        }
        Ok(descriptor)
    };

    if let Some(model) = &selection.model {
        let d = clean(entity_from_component(model, &[]))?;
        write_model(writer, module_dir, &d, true)?;
    }
    if let Some(controller) = &selection.controller {
        let d = clean(entity_from_component(controller, &["Controller"]))?;
        write_controller(writer, module_dir, &EntityNames::of(&d))?;
    }
    if let Some(request) = &selection.request {
        let d = clean(entity_from_component(request, &["StoreRequest", "Request"]))?;
        write_request(writer, module_dir, &d, true)?;
    }
    if let Some(service) = &selection.service {
        let d = clean(entity_from_component(service, &["Service"]))?;
        write_service(writer, module_dir, &EntityNames::of(&d))?;
    }
    if let Some(repository) = &selection.repository {
        let d = clean(entity_from_component(repository, &["Repository"]))?;
        write_repository(writer, module_dir, &EntityNames::of(&d))?;
    }
    if let Some(migration) = &selection.migration {
        let d = clean(entity_from_migration(migration))?;
        write_migration(writer, module_dir, &d, sequence)?;
    }
    Ok(entities)
}
