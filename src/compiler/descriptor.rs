//! Per-entity compilation: runs every compiler stage over one component and
//! assembles the [`EntityDescriptor`] the templates render from.

use std::collections::HashSet;

use serde::Serialize;

use super::attribute::{self, AttributeSpec};
use super::column_type::Family;
use super::error::CompileError;
use super::fillable;
use super::relation::{self, CompiledRelationMethod, RelationSpec};
use super::resolve::{EntityRegistry, Resolution};
use super::rules::{self, RequestRule};
use super::schema::{self, CompiledSchema};
use super::synthetic::{self, SyntheticContext, SyntheticExpression};
use crate::diagnostics::{Diagnostic, Severity};
use crate::naming;
use crate::spec::{ComponentSpec, ModuleSpec};

/// Switches that change how soft failures are treated.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// Turn unresolved references into errors.
    pub strict: bool,
}

/// Everything the templates need for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDescriptor {
    /// Root namespace of the modules, e.g. `Modules`.
    pub modules_namespace: String,
    pub module: String,
    pub entity: String,
    pub table: String,
    pub schema: CompiledSchema,
    pub schema_lines: Vec<String>,
    pub fillable: Vec<String>,
    pub fillable_declaration: String,
    pub relation_methods: Vec<CompiledRelationMethod>,
    /// Imports of the model file, deduplicated, in first-use order.
    pub required_imports: Vec<String>,
    pub synthetic_fields: Vec<SyntheticExpression>,
    /// Imports of the factory file, deduplicated, in first-use order.
    pub factory_imports: Vec<String>,
    pub request_rules: Vec<RequestRule>,
    /// Whether the model should use the soft-deletes trait.
    pub soft_deletes: bool,
    pub warnings: Vec<Diagnostic>,
}

impl EntityDescriptor {
    /// `(field, expression)` pairs for the factory definition.
    pub fn synthetic_map(&self) -> Vec<(&str, &str)> {
        self.synthetic_fields
            .iter()
            .map(|s| (s.field.as_str(), s.expression.as_str()))
            .collect()
    }
}

/// Result of compiling a whole module config.
#[derive(Debug, Clone, Default)]
pub struct ModuleCompilation {
    /// Successfully compiled entities, in declaration order.
    pub descriptors: Vec<EntityDescriptor>,
    /// Errors of the entities that failed, plus warnings of those that compiled.
    pub diagnostics: Vec<Diagnostic>,
}

impl ModuleCompilation {
    pub fn has_errors(&self) -> bool {
        crate::diagnostics::has_errors(&self.diagnostics)
    }
}

fn dedup(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|i| seen.insert(i.clone()))
        .collect()
}

fn unresolved_warning(location: String, resolution: &Resolution) -> Option<Diagnostic> {
    match resolution {
        Resolution::Placeholder { class, reason } => Some(
            Diagnostic::new(
                location,
                Severity::Warning,
                "unresolved_target_entity",
                format!("{class}: {reason}"),
            )
            .with_suggestion(format!(
                "create '{class}' or use a fully-qualified class name, then re-run with --add --force"
            )),
        ),
        Resolution::Resolved { .. } => None,
    }
}

/// Compile one component against `registry`.
///
/// # Errors
///
/// The first hard failure of the entity. With `options.strict`, an unresolved
/// reference is a hard failure too.
pub fn compile_component(
    module: &str,
    component: &ComponentSpec,
    registry: &EntityRegistry,
    options: CompileOptions,
) -> Result<EntityDescriptor, CompileError> {
    if !naming::is_identifier(&component.name) {
        return Err(CompileError::InvalidName {
            entity: component.name.clone(),
            name: component.name.clone(),
            what: "entity",
        });
    }
    let entity = naming::studly(&component.name);

    let attributes: Vec<AttributeSpec> = component
        .attributes
        .iter()
        .map(|raw| attribute::validate(raw).map_err(|e| CompileError::attribute(&entity, e)))
        .collect::<Result<_, _>>()?;
    let indexes = schema::parse_indexes(&entity, &component.indexes)?;
    let relation_specs: Vec<RelationSpec> = component
        .relations
        .iter()
        .map(|raw| relation::parse(raw).map_err(|e| CompileError::relation(&entity, e)))
        .collect::<Result<_, _>>()?;

    let compiled_schema = schema::compile_validated(&entity, &attributes, &indexes)?;
    relation::check_names(&entity, &relation_specs, &schema::table_columns(&attributes))?;
    let relation_methods: Vec<CompiledRelationMethod> = relation_specs
        .iter()
        .map(|spec| relation::compile_one(spec, registry))
        .collect();
    let fillable = fillable::project(&attributes);
    let synthetic_fields = synthetic::resolve_all(
        &attributes,
        SyntheticContext {
            relations: &relation_specs,
            registry,
        },
    );
    let table = naming::table_name(&entity);
    let request_rules = rules::derive(&table, &attributes);

    let mut warnings = Vec::new();
    for m in &relation_methods {
        if let Some(target) = &m.target {
            let location = format!("{module}/{entity}.{}", m.method_name);
            warnings.extend(unresolved_warning(location, target));
        }
    }
    for s in &synthetic_fields {
        if let Some(target) = &s.target {
            let location = format!("{module}/{entity}.{}", s.field);
            warnings.extend(unresolved_warning(location, target));
        }
    }
    if options.strict {
        let placeholder = relation_methods
            .iter()
            .filter_map(|m| m.target.as_ref())
            .chain(synthetic_fields.iter().filter_map(|s| s.target.as_ref()))
            .find(|t| t.is_placeholder());
        if let Some(Resolution::Placeholder { class, reason }) = placeholder {
            return Err(CompileError::UnresolvedTargetEntity {
                entity,
                target: class.clone(),
                reason: reason.clone(),
            });
        }
    }

    let soft_deletes = attributes
        .iter()
        .any(|a| a.ty.family() == Family::SoftDeletes);
    let mut model_imports: Vec<String> = relation_methods
        .iter()
        .flat_map(|m| m.imports.iter().cloned())
        .collect();
    if soft_deletes {
        model_imports.push("Illuminate\\Database\\Eloquent\\SoftDeletes".to_string());
    }
    let required_imports = dedup(model_imports);
    let factory_imports = dedup(
        synthetic_fields
            .iter()
            .filter_map(|s| s.import().map(str::to_string)),
    );

    Ok(EntityDescriptor {
        modules_namespace: registry.modules_namespace().to_string(),
        module: module.to_string(),
        fillable_declaration: fillable::declaration(&fillable),
        schema_lines: compiled_schema.lines(),
        schema: compiled_schema,
        entity,
        table,
        fillable,
        relation_methods,
        required_imports,
        synthetic_fields,
        factory_imports,
        request_rules,
        soft_deletes,
        warnings,
    })
}

/// Compile every component of a module config.
///
/// Failures are per entity: a bad component is reported in the diagnostics and
/// the rest still compile. Every component name is added to the local tier of
/// `registry` before compiling, so siblings resolve regardless of order.
pub fn compile_module(
    module: &str,
    spec: &ModuleSpec,
    registry: &EntityRegistry,
    options: CompileOptions,
) -> ModuleCompilation {
    let registry = registry.clone().with_local(
        spec.components
            .iter()
            .filter(|c| naming::is_identifier(&c.name))
            .map(|c| naming::studly(&c.name)),
    );

    let mut out = ModuleCompilation::default();
    let mut seen = HashSet::new();
    for component in &spec.components {
        let key = naming::studly(&component.name);
        let result = if seen.insert(key.clone()) {
            compile_component(module, component, &registry, options)
        } else {
            Err(CompileError::DuplicateEntity {
                module: module.to_string(),
                entity: key,
            })
        };
        match result {
            Ok(descriptor) => {
                tracing::debug!(module, entity = %descriptor.entity, "compiled entity");
                out.diagnostics.extend(descriptor.warnings.iter().cloned());
                out.descriptors.push(descriptor);
            }
            Err(err) => {
                tracing::warn!(module, entity = err.entity(), error = %err, "entity skipped");
                out.diagnostics.push(Diagnostic::from_error(module, &err));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use serde_json::{json, Value};

    fn component(v: Value) -> ComponentSpec {
        serde_json::from_value(v).unwrap()
    }

    fn registry() -> EntityRegistry {
        EntityRegistry::new("Blog").with_global("App\\Models", ["User"])
    }

    #[test]
    fn test_imports_are_deduplicated() {
        let c = component(json!({
            "name": "Post",
            "attributes": [{"name": "deleted_at", "type": "softDeletes"}],
            "relations": [
                {"name": "author", "type": "belongsTo", "model": "User"},
                {"name": "editor", "type": "belongsTo", "model": "User"}
            ]
        }));
        let d = compile_component("Blog", &c, &registry(), CompileOptions::default()).unwrap();
        assert_eq!(
            d.required_imports,
            [
                "Illuminate\\Database\\Eloquent\\Relations\\BelongsTo",
                "App\\Models\\User",
                "Illuminate\\Database\\Eloquent\\SoftDeletes"
            ]
        );
        assert!(d.soft_deletes);
    }

    #[test]
    fn test_invalid_entity_name() {
        let c = ComponentSpec::new("blog-post");
        let err = compile_component("Blog", &c, &registry(), CompileOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_name");
    }

    #[test]
    fn test_strict_escalates_placeholders() {
        let c = component(json!({
            "name": "Post",
            "relations": [{"name": "category", "type": "belongsTo", "model": "Category"}]
        }));
        let d = compile_component("Blog", &c, &registry(), CompileOptions::default()).unwrap();
        assert_eq!(d.warnings.len(), 1);
        assert_eq!(d.warnings[0].kind, "unresolved_target_entity");

        let err = compile_component("Blog", &c, &registry(), CompileOptions { strict: true })
            .unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedTargetEntity { .. }));
    }

    #[test]
    fn test_module_failures_are_per_entity() {
        let spec: ModuleSpec = serde_json::from_value(json!({
            "module_name": "Blog",
            "components": [
                {"name": "Post", "attributes": [{"name": "title", "type": "varchar"}]},
                {"name": "Comment", "attributes": [{"name": "body", "type": "text"}],
                 "relations": [{"name": "post", "type": "belongsTo", "model": "Post"}]},
                {"name": "Comment"}
            ]
        }))
        .unwrap();
        let out = compile_module("Blog", &spec, &registry(), CompileOptions::default());
        assert_eq!(out.descriptors.len(), 1);
        assert_eq!(out.descriptors[0].entity, "Comment");
        // Post failed, but its name still resolves for siblings.
        assert!(out.descriptors[0].warnings.is_empty());
        let kinds: Vec<&str> = out.diagnostics.iter().map(|d| d.kind.as_str()).collect();
        assert_eq!(kinds, ["unknown_type", "duplicate_entity"]);
        assert!(out.has_errors());
    }
}
