//! # Relation Compilation
//!
//! Validates relation records against the per-kind field table and turns each
//! one into a [`CompiledRelationMethod`]: method name, return type, resolved
//! target and the argument list of the relation call.
//!
//! | Kind | Required | Optional |
//! |------|----------|----------|
//! | `belongsTo` | `model` | `foreignKey`, `ownerKey` |
//! | `hasOne`, `hasMany` | `model` | `foreignKey`, `localKey` |
//! | `morphOne`, `morphMany` | `model`, `morphName` | |
//! | `morphToMany` | `model`, `morphName` | `table`, `foreignPivotKey`, `relatedPivotKey` |
//! | `morphTo` | | `morphName` |
//!
//! Optional keys are passed as named arguments, so there are never positional
//! gaps in the generated call.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::{CompileError, RelationError};
use super::php::quote;
use super::resolve::{EntityRegistry, Resolution};
use crate::naming;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    BelongsTo,
    HasOne,
    HasMany,
    MorphOne,
    MorphMany,
    MorphToMany,
    MorphTo,
}

/// Relation record keys besides `name` and `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationField {
    Model,
    ForeignKey,
    LocalKey,
    OwnerKey,
    MorphName,
    Table,
    ForeignPivotKey,
    RelatedPivotKey,
}

impl RelationField {
    pub const ALL: [RelationField; 8] = [
        RelationField::Model,
        RelationField::ForeignKey,
        RelationField::LocalKey,
        RelationField::OwnerKey,
        RelationField::MorphName,
        RelationField::Table,
        RelationField::ForeignPivotKey,
        RelationField::RelatedPivotKey,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RelationField::Model => "model",
            RelationField::ForeignKey => "foreignKey",
            RelationField::LocalKey => "localKey",
            RelationField::OwnerKey => "ownerKey",
            RelationField::MorphName => "morphName",
            RelationField::Table => "table",
            RelationField::ForeignPivotKey => "foreignPivotKey",
            RelationField::RelatedPivotKey => "relatedPivotKey",
        }
    }
}

impl RelationKind {
    pub const ALL: [RelationKind; 7] = [
        RelationKind::BelongsTo,
        RelationKind::HasOne,
        RelationKind::HasMany,
        RelationKind::MorphOne,
        RelationKind::MorphMany,
        RelationKind::MorphToMany,
        RelationKind::MorphTo,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// The relation method name on the model (`belongsTo`).
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::BelongsTo => "belongsTo",
            RelationKind::HasOne => "hasOne",
            RelationKind::HasMany => "hasMany",
            RelationKind::MorphOne => "morphOne",
            RelationKind::MorphMany => "morphMany",
            RelationKind::MorphToMany => "morphToMany",
            RelationKind::MorphTo => "morphTo",
        }
    }

    /// The relation class returned by the method (`BelongsTo`).
    pub fn class_name(self) -> String {
        naming::studly(self.as_str())
    }

    pub fn import(self) -> String {
        format!("Illuminate\\Database\\Eloquent\\Relations\\{}", self.class_name())
    }

    pub fn required_fields(self) -> &'static [RelationField] {
        use RelationField::*;
        match self {
            RelationKind::BelongsTo | RelationKind::HasOne | RelationKind::HasMany => &[Model],
            RelationKind::MorphOne | RelationKind::MorphMany | RelationKind::MorphToMany => {
                &[Model, MorphName]
            }
            RelationKind::MorphTo => &[],
        }
    }

    pub fn optional_fields(self) -> &'static [RelationField] {
        use RelationField::*;
        match self {
            RelationKind::BelongsTo => &[ForeignKey, OwnerKey],
            RelationKind::HasOne | RelationKind::HasMany => &[ForeignKey, LocalKey],
            RelationKind::MorphOne | RelationKind::MorphMany => &[],
            RelationKind::MorphToMany => &[Table, ForeignPivotKey, RelatedPivotKey],
            RelationKind::MorphTo => &[MorphName],
        }
    }

    pub fn allows(self, field: RelationField) -> bool {
        self.required_fields().contains(&field) || self.optional_fields().contains(&field)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated relation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSpec {
    pub name: String,
    pub kind: RelationKind,
    pub model: Option<String>,
    pub foreign_key: Option<String>,
    pub local_key: Option<String>,
    pub owner_key: Option<String>,
    pub morph_name: Option<String>,
    pub table: Option<String>,
    pub foreign_pivot_key: Option<String>,
    pub related_pivot_key: Option<String>,
}

impl RelationSpec {
    pub fn new(name: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            model: None,
            foreign_key: None,
            local_key: None,
            owner_key: None,
            morph_name: None,
            table: None,
            foreign_pivot_key: None,
            related_pivot_key: None,
        }
    }

    /// The key column this relation reads on the owning side, if any.
    ///
    /// Only `belongsTo` keeps its key on the declaring entity; the default
    /// is `{name}_id`.
    pub fn owning_key(&self) -> Option<String> {
        match self.kind {
            RelationKind::BelongsTo => Some(
                self.foreign_key
                    .clone()
                    .unwrap_or_else(|| format!("{}_id", naming::snake(&self.name))),
            ),
            _ => None,
        }
    }

    fn set(&mut self, field: RelationField, value: String) {
        let slot = match field {
            RelationField::Model => &mut self.model,
            RelationField::ForeignKey => &mut self.foreign_key,
            RelationField::LocalKey => &mut self.local_key,
            RelationField::OwnerKey => &mut self.owner_key,
            RelationField::MorphName => &mut self.morph_name,
            RelationField::Table => &mut self.table,
            RelationField::ForeignPivotKey => &mut self.foreign_pivot_key,
            RelationField::RelatedPivotKey => &mut self.related_pivot_key,
        };
        *slot = Some(value);
    }
}

fn is_class_reference(s: &str) -> bool {
    let trimmed = s.strip_prefix('\\').unwrap_or(s);
    !trimmed.is_empty() && trimmed.split('\\').all(naming::is_identifier)
}

/// Validate one raw relation record.
///
/// # Errors
///
/// A [`RelationError`] naming the relation, its kind and the offending field.
pub fn parse(raw: &Map<String, Value>) -> Result<RelationSpec, RelationError> {
    let declared_type = match raw.get("type") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "?".to_string(),
    };
    let name = match raw.get("name") {
        Some(Value::String(s)) if naming::is_identifier(s) => s.clone(),
        Some(other) => {
            return Err(RelationError::field(
                &other.to_string(),
                &declared_type,
                "name",
                "name must be a valid method identifier",
            ))
        }
        None => {
            return Err(RelationError::field(
                "(unnamed)",
                &declared_type,
                "name",
                "missing required field 'name'",
            ))
        }
    };
    let kind = RelationKind::parse(&declared_type).ok_or_else(|| {
        RelationError::field(
            &name,
            &declared_type,
            "type",
            format!(
                "unknown relation type; expected one of {}",
                RelationKind::ALL.map(RelationKind::as_str).join(", ")
            ),
        )
    })?;
    let kind_str = kind.as_str();

    let mut spec = RelationSpec::new(name.clone(), kind);
    for (key, value) in raw {
        if key == "name" || key == "type" {
            continue;
        }
        let field = RelationField::ALL
            .into_iter()
            .find(|f| f.key() == key)
            .filter(|f| kind.allows(*f))
            .ok_or_else(|| {
                RelationError::field(
                    &name,
                    kind_str,
                    key,
                    format!("field '{key}' is not allowed for {kind_str}"),
                )
            })?;
        let text = match value {
            Value::String(s) if field == RelationField::Model && is_class_reference(s) => s.clone(),
            Value::String(s) if field != RelationField::Model && naming::is_identifier(s) => {
                s.clone()
            }
            _ => {
                return Err(RelationError::field(
                    &name,
                    kind_str,
                    key,
                    format!("field '{key}' must be an identifier string"),
                ))
            }
        };
        spec.set(field, text);
    }

    for field in kind.required_fields() {
        let present = match field {
            RelationField::Model => spec.model.is_some(),
            RelationField::MorphName => spec.morph_name.is_some(),
            _ => true,
        };
        if !present {
            return Err(RelationError::field(
                &name,
                kind_str,
                field.key(),
                format!("{kind_str} requires '{}'", field.key()),
            ));
        }
    }
    Ok(spec)
}

/// One generated relation method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledRelationMethod {
    pub method_name: String,
    pub kind: RelationKind,
    /// Short relation class name, e.g. `BelongsTo`.
    pub return_type: String,
    /// `None` for `morphTo`, which has no fixed target.
    pub target: Option<Resolution>,
    pub arguments: Vec<String>,
    /// Imports this method needs in the model file. Not deduplicated.
    pub imports: Vec<String>,
}

impl CompiledRelationMethod {
    pub fn signature(&self) -> String {
        format!("public function {}(): {}", self.method_name, self.return_type)
    }

    pub fn body(&self) -> String {
        format!(
            "return $this->{}({});",
            self.kind.as_str(),
            self.arguments.join(", ")
        )
    }

    /// Reviewer note for a target that could not be resolved.
    pub fn placeholder_note(&self) -> Option<String> {
        match &self.target {
            Some(Resolution::Placeholder { class, reason }) => {
                Some(format!("FIXME: unresolved relation target {class}: {reason}"))
            }
            _ => None,
        }
    }
}

fn named(arguments: &mut Vec<String>, label: &str, value: &Option<String>) {
    if let Some(v) = value {
        arguments.push(format!("{label}: {}", quote(v)));
    }
}

/// Build the method for one validated relation.
pub fn compile_one(spec: &RelationSpec, registry: &EntityRegistry) -> CompiledRelationMethod {
    let kind = spec.kind;
    let target = spec.model.as_deref().map(|m| registry.resolve(m));

    let mut arguments = Vec::new();
    if let Some(t) = &target {
        arguments.push(format!("{}::class", t.class()));
    }
    match kind {
        RelationKind::BelongsTo => {
            named(&mut arguments, "foreignKey", &spec.foreign_key);
            named(&mut arguments, "ownerKey", &spec.owner_key);
        }
        RelationKind::HasOne | RelationKind::HasMany => {
            named(&mut arguments, "foreignKey", &spec.foreign_key);
            named(&mut arguments, "localKey", &spec.local_key);
        }
        RelationKind::MorphOne | RelationKind::MorphMany => {
            if let Some(m) = &spec.morph_name {
                arguments.push(quote(m));
            }
        }
        RelationKind::MorphToMany => {
            if let Some(m) = &spec.morph_name {
                arguments.push(quote(m));
            }
            named(&mut arguments, "table", &spec.table);
            named(&mut arguments, "foreignPivotKey", &spec.foreign_pivot_key);
            named(&mut arguments, "relatedPivotKey", &spec.related_pivot_key);
        }
        RelationKind::MorphTo => {
            arguments.push(quote(spec.morph_name.as_deref().unwrap_or(&spec.name)));
        }
    }

    let mut imports = vec![kind.import()];
    if let Some(import) = target.as_ref().and_then(|t| registry.model_import(t)) {
        imports.push(import);
    }

    CompiledRelationMethod {
        method_name: spec.name.clone(),
        kind,
        return_type: kind.class_name(),
        target,
        arguments,
        imports,
    }
}

/// Every relation becomes a model method, so its name must be unique and
/// must not shadow a column attribute.
///
/// # Errors
///
/// [`CompileError::ConflictingDeclaration`] naming the first clash.
pub fn check_names(
    entity: &str,
    relations: &[RelationSpec],
    columns: &[String],
) -> Result<(), CompileError> {
    for (i, spec) in relations.iter().enumerate() {
        if relations[..i].iter().any(|r| r.name == spec.name) {
            return Err(CompileError::conflict(
                entity,
                &spec.name,
                "is declared as a relation more than once",
            ));
        }
        if columns.contains(&spec.name) {
            return Err(CompileError::conflict(
                entity,
                &spec.name,
                "names both a relation and a column",
            ));
        }
    }
    Ok(())
}

/// Validate and compile every relation of `entity`, in input order.
///
/// # Errors
///
/// [`CompileError::InvalidRelationConfig`] for the first malformed relation,
/// or the name clashes of [`check_names`].
pub fn compile(
    entity: &str,
    relations: &[Map<String, Value>],
    registry: &EntityRegistry,
) -> Result<Vec<CompiledRelationMethod>, CompileError> {
    let specs = relations
        .iter()
        .map(|raw| parse(raw).map_err(|e| CompileError::relation(entity, e)))
        .collect::<Result<Vec<_>, _>>()?;
    check_names(entity, &specs, &[])?;
    Ok(specs.iter().map(|spec| compile_one(spec, registry)).collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use serde_json::json;

    fn raw(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    fn registry() -> EntityRegistry {
        EntityRegistry::new("Blog")
            .with_local(["Post", "Comment", "Image", "Tag"])
            .with_global("App\\Models", ["User"])
    }

    fn legal_record(kind: RelationKind) -> Value {
        let mut m = raw(json!({"name": "rel", "type": kind.as_str()}));
        for f in kind.required_fields().iter().chain(kind.optional_fields()) {
            let v = if *f == RelationField::Model { "Comment" } else { "some_key" };
            m.insert(f.key().to_string(), json!(v));
        }
        Value::Object(m)
    }

    #[test]
    fn test_relation_matrix() {
        for kind in RelationKind::ALL {
            let legal = raw(legal_record(kind));
            parse(&legal).unwrap_or_else(|e| panic!("{kind}: {e}"));

            for field in RelationField::ALL {
                if kind.allows(field) {
                    continue;
                }
                let mut illegal = legal.clone();
                illegal.insert(field.key().to_string(), json!("Comment"));
                let err = parse(&illegal).unwrap_err();
                assert_eq!(err.field.as_deref(), Some(field.key()), "{kind}");
            }
        }
    }

    #[test]
    fn test_morph_to_rejects_model() {
        let err = parse(&raw(json!({"name": "imageable", "type": "morphTo", "model": "Post"})))
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("model"));
        assert!(err.to_string().contains("imageable"));
    }

    #[test]
    fn test_missing_required_and_unknown_type() {
        let err = parse(&raw(json!({"name": "author", "type": "belongsTo"}))).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("model"));
        let err = parse(&raw(json!({"name": "images", "type": "morphMany", "model": "Image"})))
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("morphName"));
        let err = parse(&raw(json!({"name": "tags", "type": "belongsToMany", "model": "Tag"})))
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("type"));
    }

    #[test]
    fn test_belongs_to_uses_named_arguments() {
        let spec = parse(&raw(json!({
            "name": "author", "type": "belongsTo", "model": "User", "ownerKey": "uuid"
        })))
        .unwrap();
        let m = compile_one(&spec, &registry());
        assert_eq!(m.signature(), "public function author(): BelongsTo");
        assert_eq!(m.body(), "return $this->belongsTo(User::class, ownerKey: 'uuid');");
        assert_eq!(
            m.imports,
            [
                "Illuminate\\Database\\Eloquent\\Relations\\BelongsTo",
                "App\\Models\\User"
            ]
        );
    }

    #[test]
    fn test_bodies_per_kind() {
        let reg = registry();
        let cases = [
            (
                json!({"name": "comments", "type": "hasMany", "model": "Comment", "foreignKey": "post_id"}),
                "return $this->hasMany(Comment::class, foreignKey: 'post_id');",
            ),
            (
                json!({"name": "image", "type": "morphOne", "model": "Image", "morphName": "imageable"}),
                "return $this->morphOne(Image::class, 'imageable');",
            ),
            (
                json!({"name": "tags", "type": "morphToMany", "model": "Tag", "morphName": "taggable", "table": "taggables"}),
                "return $this->morphToMany(Tag::class, 'taggable', table: 'taggables');",
            ),
            (
                json!({"name": "imageable", "type": "morphTo"}),
                "return $this->morphTo('imageable');",
            ),
        ];
        for (record, body) in cases {
            let m = compile_one(&parse(&raw(record)).unwrap(), &reg);
            assert_eq!(m.body(), body);
        }
    }

    #[test]
    fn test_local_targets_need_only_the_relation_import() {
        let spec = parse(&raw(json!({"name": "comments", "type": "hasMany", "model": "Comment"})))
            .unwrap();
        let m = compile_one(&spec, &registry());
        assert_eq!(m.imports, ["Illuminate\\Database\\Eloquent\\Relations\\HasMany"]);
        assert!(m.placeholder_note().is_none());
    }

    #[test]
    fn test_unresolved_target_is_soft() {
        let out = compile(
            "Post",
            &[raw(json!({"name": "category", "type": "belongsTo", "model": "Category"}))],
            &registry(),
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].target.as_ref().unwrap().is_placeholder());
        assert_eq!(out[0].body(), "return $this->belongsTo(Category::class);");
        assert!(out[0].placeholder_note().unwrap().contains("Category"));
    }

    #[test]
    fn test_compile_preserves_order_and_names_entity() {
        let reg = registry();
        let out = compile(
            "Post",
            &[
                raw(json!({"name": "b", "type": "hasOne", "model": "Image"})),
                raw(json!({"name": "a", "type": "hasOne", "model": "Image"})),
            ],
            &reg,
        )
        .unwrap();
        assert_eq!(out[0].method_name, "b");
        assert_eq!(out[1].method_name, "a");

        let err = compile(
            "Post",
            &[raw(json!({"name": "a", "type": "hasOne", "model": "Image", "ownerKey": "id"}))],
            &reg,
        )
        .unwrap_err();
        assert_eq!(err.entity(), "Post");
        assert_eq!(err.kind(), "invalid_relation_config");
    }

    #[test]
    fn test_relation_names_must_be_unique() {
        let err = compile(
            "Post",
            &[
                raw(json!({"name": "author", "type": "belongsTo", "model": "User"})),
                raw(json!({"name": "author", "type": "hasOne", "model": "Image"})),
            ],
            &registry(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "conflicting_declaration");
        assert!(err.to_string().contains("'author'"));
    }

    #[test]
    fn test_relation_names_must_not_shadow_columns() {
        let specs = [
            parse(&raw(json!({"name": "author", "type": "belongsTo", "model": "User"}))).unwrap(),
            parse(&raw(json!({"name": "commentable", "type": "morphTo"}))).unwrap(),
        ];
        let columns = [
            "author_id".to_string(),
            "commentable_id".to_string(),
            "commentable_type".to_string(),
        ];
        assert!(check_names("Post", &specs, &columns).is_ok());

        let columns = ["author".to_string()];
        let err = check_names("Post", &specs, &columns).unwrap_err();
        assert!(matches!(
            err,
            CompileError::ConflictingDeclaration { ref name, .. } if name == "author"
        ));
    }
}
