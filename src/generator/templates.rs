use askama::Template;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compiler::resolve::DEFAULT_MODULES_NAMESPACE;
use crate::compiler::{EntityDescriptor, Resolution};
use crate::naming;

/// Names derived from one module/entity pair
///
/// Every artifact name and namespace comes from here so the model, the
/// controller and the aggregate files agree on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityNames {
    /// Root namespace of the modules, e.g. `Modules`
    pub root: String,
    /// Module name, e.g. `Blog`
    pub module: String,
    /// Module name in snake case, used as route prefix, e.g. `blog`
    pub module_snake: String,
    /// Entity class name, e.g. `BlogPost`
    pub entity: String,
    /// Entity name as a PHP variable, e.g. `blogPost`
    pub variable: String,
    /// Table name, e.g. `blog_posts`
    pub table: String,
    /// Resource route segment, e.g. `blog-posts`
    pub route: String,
}

impl EntityNames {
    pub fn new(module: &str, entity: &str) -> Self {
        let table = naming::table_name(entity);
        Self {
            root: DEFAULT_MODULES_NAMESPACE.to_string(),
            module: module.to_string(),
            module_snake: naming::snake(module),
            entity: entity.to_string(),
            variable: naming::camel(entity),
            route: table.replace('_', "-"),
            table,
        }
    }

    /// Names of a compiled entity, under the root namespace it was compiled for.
    pub fn of(descriptor: &EntityDescriptor) -> Self {
        Self::new(&descriptor.module, &descriptor.entity).within(&descriptor.modules_namespace)
    }

    pub fn within(mut self, root: &str) -> Self {
        self.root = root.to_string();
        self
    }

    /// `{Root}\{Module}\{sub}`
    pub fn namespace(&self, sub: &str) -> String {
        format!("{}\\{}\\{}", self.root, self.module, sub)
    }

    pub fn controller(&self) -> String {
        format!("{}Controller", self.entity)
    }

    pub fn request(&self) -> String {
        format!("{}StoreRequest", self.entity)
    }

    pub fn service(&self) -> String {
        format!("{}Service", self.entity)
    }

    pub fn service_interface(&self) -> String {
        format!("{}ServiceInterface", self.entity)
    }

    pub fn repository(&self) -> String {
        format!("{}Repository", self.entity)
    }

    pub fn repository_interface(&self) -> String {
        format!("{}RepositoryInterface", self.entity)
    }

    pub fn factory(&self) -> String {
        format!("{}Factory", self.entity)
    }

    pub fn seeder(&self) -> String {
        format!("{}Seeder", self.entity)
    }

    pub fn test(&self) -> String {
        format!("{}Test", self.entity)
    }

    /// `camel(Entity)Service`, the controller's injected property
    pub fn service_variable(&self) -> String {
        format!("{}Service", self.variable)
    }

    /// `camel(Entity)Repository`, the service's injected property
    pub fn repository_variable(&self) -> String {
        format!("{}Repository", self.variable)
    }
}

/// A relation method as rendered into the model
#[derive(Debug, Clone)]
pub struct RelationMethodView {
    pub signature: String,
    pub body: String,
    /// Reviewer note for an unresolved target, empty if resolved
    pub note: String,
}

/// Template data for `Models/<Entity>.php`
#[derive(Template)]
#[template(path = "model.php.txt", escape = "none")]
pub struct ModelTemplateData {
    pub names: EntityNames,
    /// Clean stub instead of a compiled entity
    pub is_clean: bool,
    /// Fully-qualified imports, deduplicated
    pub imports: Vec<String>,
    pub soft_deletes: bool,
    /// PHP array literal for `$fillable`
    pub fillable: String,
    pub methods: Vec<RelationMethodView>,
}

impl ModelTemplateData {
    pub fn new(descriptor: &EntityDescriptor, is_clean: bool) -> Self {
        let names = EntityNames::of(descriptor);
        let base = [
            format!("{}\\{}", names.namespace("Database\\Factories"), names.factory()),
            "Illuminate\\Database\\Eloquent\\Factories\\HasFactory".to_string(),
            "Illuminate\\Database\\Eloquent\\Model".to_string(),
        ];
        let imports = dedup(base.into_iter().chain(descriptor.required_imports.iter().cloned()));
        let methods = descriptor
            .relation_methods
            .iter()
            .map(|m| RelationMethodView {
                signature: m.signature(),
                body: m.body(),
                note: m.placeholder_note().unwrap_or_default(),
            })
            .collect();
        Self {
            names,
            is_clean,
            imports,
            soft_deletes: descriptor.soft_deletes,
            fillable: descriptor.fillable_declaration.clone(),
            methods,
        }
    }
}

/// Template data for `Database/Migrations/<key>_create_<table>_table.php`
#[derive(Template)]
#[template(path = "migration.php.txt", escape = "none")]
pub struct MigrationTemplateData {
    pub names: EntityNames,
    /// Schema-builder statements, one per line
    pub schema_lines: Vec<String>,
}

impl MigrationTemplateData {
    pub fn new(descriptor: &EntityDescriptor) -> Self {
        Self {
            names: EntityNames::of(descriptor),
            schema_lines: descriptor.schema_lines.clone(),
        }
    }
}

/// Template data for `Http/Controllers/<Entity>Controller.php`
#[derive(Template)]
#[template(path = "controller.php.txt", escape = "none")]
pub struct ControllerTemplateData {
    pub names: EntityNames,
}

/// Template data for `Http/Requests/<Entity>StoreRequest.php`
#[derive(Template)]
#[template(path = "request.php.txt", escape = "none")]
pub struct RequestTemplateData {
    pub names: EntityNames,
    pub is_clean: bool,
    /// `'field' => 'rule|rule'` entries
    pub rules: Vec<String>,
}

impl RequestTemplateData {
    pub fn new(descriptor: &EntityDescriptor, is_clean: bool) -> Self {
        Self {
            names: EntityNames::of(descriptor),
            is_clean,
            rules: descriptor.request_rules.iter().map(|r| r.to_php()).collect(),
        }
    }
}

/// Template data for `Services/Contracts/<Entity>ServiceInterface.php`
#[derive(Template)]
#[template(path = "service_interface.php.txt", escape = "none")]
pub struct ServiceInterfaceTemplateData {
    pub names: EntityNames,
}

/// Template data for `Services/<Entity>Service.php`
#[derive(Template)]
#[template(path = "service.php.txt", escape = "none")]
pub struct ServiceTemplateData {
    pub names: EntityNames,
}

/// Template data for `Repositories/Contracts/<Entity>RepositoryInterface.php`
#[derive(Template)]
#[template(path = "repository_interface.php.txt", escape = "none")]
pub struct RepositoryInterfaceTemplateData {
    pub names: EntityNames,
}

/// Template data for `Repositories/<Entity>Repository.php`
#[derive(Template)]
#[template(path = "repository.php.txt", escape = "none")]
pub struct RepositoryTemplateData {
    pub names: EntityNames,
}

/// Template data for `Database/Factories/<Entity>Factory.php`
#[derive(Template)]
#[template(path = "factory.php.txt", escape = "none")]
pub struct FactoryTemplateData {
    pub names: EntityNames,
    pub is_clean: bool,
    pub imports: Vec<String>,
    /// Entries of the `definition()` array, including FIXME comments
    pub fields: Vec<String>,
}

impl FactoryTemplateData {
    pub fn new(descriptor: &EntityDescriptor, is_clean: bool) -> Self {
        let names = EntityNames::of(descriptor);
        let own_model = format!("{}\\{}", names.namespace("Models"), names.entity);
        let imports = dedup(
            std::iter::once(own_model)
                .chain(std::iter::once(
                    "Illuminate\\Database\\Eloquent\\Factories\\Factory".to_string(),
                ))
                .chain(descriptor.factory_imports.iter().cloned()),
        );
        let mut fields = Vec::new();
        for s in &descriptor.synthetic_fields {
            if let Some(Resolution::Placeholder { class, reason }) = &s.target {
                fields.push(format!("// FIXME: unresolved factory target {class}: {reason}"));
            }
            fields.push(format!("'{}' => {},", s.field, s.expression));
        }
        Self {
            names,
            is_clean,
            imports,
            fields,
        }
    }
}

/// Template data for `Database/Seeders/<Entity>Seeder.php`
#[derive(Template)]
#[template(path = "seeder.php.txt", escape = "none")]
pub struct SeederTemplateData {
    pub names: EntityNames,
}

/// Template data for `Tests/Unit/<Entity>Test.php`
#[derive(Template)]
#[template(path = "test.php.txt", escape = "none")]
pub struct TestTemplateData {
    pub names: EntityNames,
}

/// Template data for `Providers/<Module>ServiceProvider.php`
#[derive(Template)]
#[template(path = "provider.php.txt", escape = "none")]
pub struct ProviderTemplateData {
    pub root: String,
    pub module: String,
    pub module_snake: String,
    /// Entities from the module manifest, in registration order
    pub entities: Vec<EntityNames>,
}

/// Template data for `routes/api.php`
#[derive(Template)]
#[template(path = "routes_api.php.txt", escape = "none")]
pub struct ApiRoutesTemplateData {
    pub module: String,
    pub module_snake: String,
    pub entities: Vec<EntityNames>,
}

/// Template data for `routes/web.php`
#[derive(Template)]
#[template(path = "routes_web.php.txt", escape = "none")]
pub struct WebRoutesTemplateData {
    pub module: String,
    pub module_snake: String,
    pub entities: Vec<EntityNames>,
}

/// Template data for `Database/Seeders/<Module>DatabaseSeeder.php`
#[derive(Template)]
#[template(path = "module_seeder.php.txt", escape = "none")]
pub struct ModuleSeederTemplateData {
    pub root: String,
    pub module: String,
    pub entities: Vec<EntityNames>,
}

fn dedup(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|i| seen.insert(i.clone()))
        .collect()
}

/// What happened to one output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Created,
    Overwritten,
    /// Existed and `--force` was not given
    Skipped,
    /// Would have been written (`--dry-run`)
    Planned,
}

/// Writes rendered templates, honouring `force` and `dry_run`
///
/// Per-entity files are never overwritten without `force`. Aggregate files
/// (provider, routes, module seeder) are renders of the manifest and are
/// always rewritten.
#[derive(Debug, Default)]
pub struct FileWriter {
    pub force: bool,
    pub dry_run: bool,
    /// Every file touched, in write order
    pub outcomes: Vec<(PathBuf, FileOutcome)>,
}

impl FileWriter {
    pub fn new(force: bool, dry_run: bool) -> Self {
        Self {
            force,
            dry_run,
            outcomes: Vec::new(),
        }
    }

    /// Render and write a per-entity file.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails
    pub fn write(&mut self, path: &Path, template: &impl Template) -> anyhow::Result<FileOutcome> {
        self.write_inner(path, template, self.force)
    }

    /// Render and write an aggregate file, replacing any previous render.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails
    pub fn write_aggregate(
        &mut self,
        path: &Path,
        template: &impl Template,
    ) -> anyhow::Result<FileOutcome> {
        self.write_inner(path, template, true)
    }

    fn write_inner(
        &mut self,
        path: &Path,
        template: &impl Template,
        overwrite: bool,
    ) -> anyhow::Result<FileOutcome> {
        let exists = path.exists();
        let outcome = if exists && !overwrite {
            println!("⚠️  Skipping existing file: {}", path.display());
            FileOutcome::Skipped
        } else if self.dry_run {
            println!("📝 Would write: {}", path.display());
            FileOutcome::Planned
        } else {
            let rendered = template.render()?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, rendered)?;
            println!("✅ Generated {}", path.display());
            if exists {
                FileOutcome::Overwritten
            } else {
                FileOutcome::Created
            }
        };
        tracing::debug!(path = %path.display(), ?outcome, "output file");
        self.outcomes.push((path.to_path_buf(), outcome));
        Ok(outcome)
    }

    /// Paths that were written (or would be, on a dry run).
    pub fn written(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o != FileOutcome::Skipped)
            .map(|(p, _)| p.clone())
            .collect()
    }

    pub fn skipped(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == FileOutcome::Skipped)
            .map(|(p, _)| p.clone())
            .collect()
    }
}
