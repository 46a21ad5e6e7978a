//! # Schema Compilation
//!
//! Validated attributes and index requests in, ordered schema-builder statements out.
//!
//! ## Ordering
//!
//! 1. synthetic identity (`$table->id()`), when no identity type is declared
//! 2. one column per attribute, in declaration order (placeholders skipped)
//! 3. synthetic `$table->timestamps()`, when neither `created_at` nor
//!    `updated_at` is declared; a nullable `timestamp` for the missing half when
//!    only one of them is
//! 4. index statements, in declaration order, minus redundant ones
//!
//! Before rendering, every column of the table must be declared once, `id` must
//! be an identity column and `after` must name another column.
//!
//! Rendering is dispatched through [`renderer`], an exhaustive match over
//! [`ColumnType`]; adding a type without a renderer does not compile.

use serde::Serialize;
use serde_json::{Map, Value};

use super::attribute::{self, AttributeSpec};
use super::column_type::{ColumnType, Family, Field};
use super::error::{AttributeError, CompileError};
use super::php::{quote, quote_list};

const TIMESTAMP_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

/// Index kinds accepted in `indexes[].type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Index,
    Unique,
    Primary,
    Fulltext,
    Spatial,
}

impl IndexKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "index" => Some(Self::Index),
            "unique" => Some(Self::Unique),
            "primary" => Some(Self::Primary),
            "fulltext" => Some(Self::Fulltext),
            "spatial" => Some(Self::Spatial),
            _ => None,
        }
    }

    fn method(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Unique => "unique",
            Self::Primary => "primary",
            Self::Fulltext => "fullText",
            Self::Spatial => "spatialIndex",
        }
    }

    /// Ordering for redundancy checks. Fulltext and spatial indexes are never
    /// implied by a column, so they have no strength.
    fn strength(self) -> Option<u8> {
        match self {
            Self::Index => Some(1),
            Self::Unique => Some(2),
            Self::Primary => Some(3),
            Self::Fulltext | Self::Spatial => None,
        }
    }
}

/// One validated index request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub columns: Vec<String>,
    pub kind: IndexKind,
}

impl IndexSpec {
    /// Parse one raw `indexes[]` record. A missing `type` means a plain index.
    ///
    /// # Errors
    ///
    /// The reason the record is malformed; the caller adds entity and position.
    pub fn parse(raw: &Map<String, Value>) -> Result<Self, String> {
        if let Some(key) = raw.keys().find(|k| *k != "columns" && *k != "type") {
            return Err(format!("unknown field '{key}'"));
        }
        let columns = match raw.get("columns") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| "columns must be strings".to_string())
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err("columns must be a list".to_string()),
            None => Vec::new(),
        };
        if columns.is_empty() {
            return Err("columns must not be empty".to_string());
        }
        let kind = match raw.get("type") {
            None => IndexKind::Index,
            Some(Value::String(s)) => {
                IndexKind::parse(s).ok_or_else(|| format!("unknown index type '{s}'"))?
            }
            Some(other) => return Err(format!("unknown index type {other}")),
        };
        Ok(Self { columns, kind })
    }
}

/// One column of the compiled schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    /// Attribute name, or the synthetic column's name.
    pub name: String,
    /// Builder statements, each terminated with `;`. Usually one.
    pub statements: Vec<String>,
    /// Inserted by the compiler rather than declared.
    pub synthetic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDef {
    pub columns: Vec<String>,
    pub kind: IndexKind,
    pub statement: String,
}

/// Ordered column definitions followed by index definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledSchema {
    pub columns: Vec<ColumnDef>,
    pub indexes: Vec<IndexDef>,
}

impl CompiledSchema {
    /// Every statement in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|c| c.statements.iter().cloned())
            .chain(self.indexes.iter().map(|i| i.statement.clone()))
            .collect()
    }
}

/// Base syntax produced by a column renderer, before and after the modifier pass.
struct Rendered {
    call: String,
    /// Appended after the modifiers (`->constrained(..)` and friends).
    tail: String,
    /// Extra statements following the column (`$table->foreign(..)`).
    extra: Vec<String>,
}

impl Rendered {
    fn call(call: String) -> Self {
        Self {
            call,
            tail: String::new(),
            extra: Vec::new(),
        }
    }
}

type Renderer = fn(&AttributeSpec) -> Rendered;

/// The renderer for each column type. `None` for types that produce no column.
fn renderer(ty: ColumnType) -> Option<Renderer> {
    use ColumnType::*;
    let r: Renderer = match ty {
        String | Char => render_sized,
        Text | MediumText | LongText | Uuid | Integer | TinyInteger | SmallInteger
        | MediumInteger | BigInteger | UnsignedInteger | UnsignedBigInteger | Boolean | Date
        | DateTime | Time | Timestamp | Year | Json | Jsonb => render_plain,
        Decimal | Double | Float => render_precision,
        Enum => render_enum,
        ForeignId => render_foreign_id,
        Foreign => render_foreign,
        Timestamps | TimestampsTz | NullableTimestamps | SoftDeletes | SoftDeletesTz => {
            render_bare
        }
        Id => render_id,
        Increments | BigIncrements | Morphs | NullableMorphs | UuidMorphs => render_plain,
        Relationship => return None,
    };
    Some(r)
}

fn render_plain(a: &AttributeSpec) -> Rendered {
    Rendered::call(format!("$table->{}({})", a.ty, quote(&a.name)))
}

fn render_bare(a: &AttributeSpec) -> Rendered {
    Rendered::call(format!("$table->{}()", a.ty))
}

fn render_id(a: &AttributeSpec) -> Rendered {
    if a.name == "id" {
        render_bare(a)
    } else {
        render_plain(a)
    }
}

fn render_sized(a: &AttributeSpec) -> Rendered {
    match a.length {
        Some(len) => Rendered::call(format!("$table->{}({}, {len})", a.ty, quote(&a.name))),
        None => render_plain(a),
    }
}

fn render_precision(a: &AttributeSpec) -> Rendered {
    let total = a.total.unwrap_or(8);
    let places = a.places.unwrap_or(2);
    Rendered::call(format!(
        "$table->{}({}, {total}, {places})",
        a.ty,
        quote(&a.name)
    ))
}

fn render_enum(a: &AttributeSpec) -> Rendered {
    Rendered::call(format!(
        "$table->enum({}, {})",
        quote(&a.name),
        quote_list(&a.options)
    ))
}

fn referential_actions(a: &AttributeSpec) -> String {
    let mut out = String::new();
    if let Some(action) = a.on_delete {
        out.push_str(&format!("->onDelete({})", quote(action.as_str())));
    }
    if let Some(action) = a.on_update {
        out.push_str(&format!("->onUpdate({})", quote(action.as_str())));
    }
    out
}

fn render_foreign_id(a: &AttributeSpec) -> Rendered {
    let mut r = render_plain(a);
    if a.is_constrained() {
        let args = match (&a.on, a.references.as_deref()) {
            (Some(on), Some(refs)) if refs != "id" => format!("{}, {}", quote(on), quote(refs)),
            (Some(on), _) => quote(on),
            (None, _) => String::new(),
        };
        r.tail = format!("->constrained({args}){}", referential_actions(a));
    }
    r
}

fn render_foreign(a: &AttributeSpec) -> Rendered {
    let mut r = Rendered::call(format!("$table->unsignedBigInteger({})", quote(&a.name)));
    if let Some(on) = &a.on {
        r.extra.push(format!(
            "$table->foreign({})->references({})->on({}){};",
            quote(&a.name),
            quote(a.references.as_deref().unwrap_or("id")),
            quote(on),
            referential_actions(a)
        ));
    }
    r
}

fn modifiers(a: &AttributeSpec) -> String {
    let mut out = String::new();
    if a.nullable && a.ty.allows(Field::Nullable) {
        out.push_str("->nullable()");
    }
    if a.unique && a.ty.allows(Field::Unique) {
        out.push_str("->unique()");
    }
    if let Some(default) = a.default.as_ref().filter(|_| a.ty.allows(Field::Default)) {
        out.push_str(&format!("->default({})", default.to_php()));
    }
    if let Some(after) = a.after.as_ref().filter(|_| a.ty.allows(Field::After)) {
        out.push_str(&format!("->after({})", quote(after)));
    }
    out
}

fn render_column(a: &AttributeSpec) -> Option<ColumnDef> {
    let render = renderer(a.ty)?;
    let r = render(a);
    let mut statements = vec![format!("{}{}{};", r.call, modifiers(a), r.tail)];
    statements.extend(r.extra);
    Some(ColumnDef {
        name: a.name.clone(),
        statements,
        synthetic: false,
    })
}

/// Which of `created_at` / `updated_at` the attributes declare.
fn declared_timestamps(attributes: &[AttributeSpec]) -> [bool; 2] {
    TIMESTAMP_COLUMNS.map(|column| {
        attributes
            .iter()
            .any(|a| a.column_names().iter().any(|c| c == column))
    })
}

pub fn declares_identity(attributes: &[AttributeSpec]) -> bool {
    attributes.iter().any(|a| a.ty.is_identity())
}

/// Timestamp columns the compiler adds, with their statements.
fn synthetic_timestamps(attributes: &[AttributeSpec]) -> Vec<ColumnDef> {
    match declared_timestamps(attributes) {
        [false, false] => vec![ColumnDef {
            name: "timestamps".to_string(),
            statements: vec!["$table->timestamps();".to_string()],
            synthetic: true,
        }],
        declared => TIMESTAMP_COLUMNS
            .iter()
            .zip(declared)
            .filter(|(_, present)| !present)
            .map(|(column, _)| ColumnDef {
                name: column.to_string(),
                statements: vec![format!("$table->timestamp({})->nullable();", quote(column))],
                synthetic: true,
            })
            .collect(),
    }
}

/// Every column name the compiled table will contain.
pub fn table_columns(attributes: &[AttributeSpec]) -> Vec<String> {
    let mut cols = Vec::new();
    if !declares_identity(attributes) {
        cols.push("id".to_string());
    }
    for a in attributes {
        cols.extend(a.column_names());
    }
    let declared = declared_timestamps(attributes);
    for (column, present) in TIMESTAMP_COLUMNS.iter().zip(declared) {
        if !present {
            cols.push(column.to_string());
        }
    }
    cols
}

/// Reject attribute sets that cannot form one table.
///
/// # Errors
///
/// [`CompileError::ConflictingDeclaration`] for a non-identity `id` or a column
/// produced twice, and an `after` naming no other column as an attribute error.
pub fn check_columns(entity: &str, attributes: &[AttributeSpec]) -> Result<(), CompileError> {
    if let Some(a) = attributes
        .iter()
        .find(|a| a.name == "id" && !a.ty.is_identity() && !a.column_names().is_empty())
    {
        return Err(CompileError::conflict(
            entity,
            &a.name,
            format!(
                "is reserved for the identity column; declare it as 'id', 'increments' or 'bigIncrements' instead of '{}'",
                a.ty
            ),
        ));
    }

    let columns = table_columns(attributes);
    for (i, column) in columns.iter().enumerate() {
        if columns[..i].contains(column) {
            return Err(CompileError::conflict(
                entity,
                column,
                "is declared more than once",
            ));
        }
    }

    for a in attributes {
        let Some(after) = a.after.as_ref().filter(|_| a.ty.allows(Field::After)) else {
            continue;
        };
        let own = a.column_names();
        if !columns.contains(after) || own.contains(after) {
            return Err(CompileError::attribute(
                entity,
                AttributeError::InvalidFieldValue {
                    attribute: a.name.clone(),
                    field: Field::After.key().to_string(),
                    expected: "the name of another column of the table",
                },
            ));
        }
    }
    Ok(())
}

/// Strength of the index each column already carries.
fn implied_strength(attributes: &[AttributeSpec], column: &str) -> Option<u8> {
    if column == "id" && !declares_identity(attributes) {
        return IndexKind::Primary.strength();
    }
    attributes
        .iter()
        .filter_map(|a| {
            let kind = if a.ty.is_identity() {
                IndexKind::Primary
            } else if a.unique {
                IndexKind::Unique
            } else if a.is_constrained() || a.ty.family() == Family::Morphs {
                IndexKind::Index
            } else {
                return None;
            };
            a.column_names()
                .iter()
                .any(|c| c == column)
                .then(|| kind.strength())
                .flatten()
        })
        .max()
}

fn render_index(index: &IndexSpec) -> String {
    let target = match index.columns.as_slice() {
        [single] => quote(single),
        many => quote_list(many),
    };
    format!("$table->{}({target});", index.kind.method())
}

/// Compile validated attributes and index requests.
///
/// # Errors
///
/// The failures of [`check_columns`], or [`CompileError::InvalidIndexSpec`]
/// when an index names a column the table does not have.
pub fn compile_validated(
    entity: &str,
    attributes: &[AttributeSpec],
    indexes: &[IndexSpec],
) -> Result<CompiledSchema, CompileError> {
    check_columns(entity, attributes)?;
    let mut columns = Vec::with_capacity(attributes.len() + 2);
    if !declares_identity(attributes) {
        columns.push(ColumnDef {
            name: "id".to_string(),
            statements: vec!["$table->id();".to_string()],
            synthetic: true,
        });
    }
    columns.extend(attributes.iter().filter_map(render_column));
    columns.extend(synthetic_timestamps(attributes));

    let known = table_columns(attributes);
    let mut index_defs = Vec::new();
    for (position, index) in indexes.iter().enumerate() {
        if let Some(missing) = index.columns.iter().find(|c| !known.contains(c)) {
            return Err(CompileError::index(
                entity,
                position,
                format!("unknown column '{missing}'"),
            ));
        }
        if let ([column], Some(requested)) = (index.columns.as_slice(), index.kind.strength()) {
            if implied_strength(attributes, column).is_some_and(|implied| implied >= requested) {
                continue;
            }
        }
        index_defs.push(IndexDef {
            columns: index.columns.clone(),
            kind: index.kind,
            statement: render_index(index),
        });
    }

    Ok(CompiledSchema {
        columns,
        indexes: index_defs,
    })
}

/// Validate raw attribute and index records, then compile them.
///
/// # Errors
///
/// The first attribute failure, or the first malformed index.
pub fn compile(
    entity: &str,
    attributes: &[Map<String, Value>],
    indexes: &[Map<String, Value>],
) -> Result<CompiledSchema, CompileError> {
    let attributes = attributes
        .iter()
        .map(|raw| attribute::validate(raw).map_err(|e| CompileError::attribute(entity, e)))
        .collect::<Result<Vec<_>, _>>()?;
    let indexes = parse_indexes(entity, indexes)?;
    compile_validated(entity, &attributes, &indexes)
}

pub fn parse_indexes(
    entity: &str,
    raw: &[Map<String, Value>],
) -> Result<Vec<IndexSpec>, CompileError> {
    raw.iter()
        .enumerate()
        .map(|(position, r)| {
            IndexSpec::parse(r).map_err(|reason| CompileError::index(entity, position, reason))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use serde_json::json;

    fn records(v: Value) -> Vec<Map<String, Value>> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().cloned().unwrap())
            .collect()
    }

    fn lines(attrs: Value, indexes: Value) -> Vec<String> {
        compile("Post", &records(attrs), &records(indexes))
            .unwrap()
            .lines()
    }

    #[test]
    fn test_compilation_is_idempotent() {
        let attrs = records(json!([
            {"name": "title", "type": "string", "length": 120},
            {"name": "status", "type": "enum", "options": ["draft", "published"]},
            {"name": "author_id", "type": "foreignId", "on": "users"}
        ]));
        let idx = records(json!([{"columns": ["title", "status"], "type": "index"}]));
        let a = compile("Post", &attrs, &idx).unwrap();
        let b = compile("Post", &attrs, &idx).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.lines().join("\n"), b.lines().join("\n"));
    }

    #[test]
    fn test_synthetic_identity_and_timestamps() {
        let out = lines(json!([{"name": "title", "type": "string"}]), json!([]));
        assert_eq!(
            out,
            [
                "$table->id();",
                "$table->string('title');",
                "$table->timestamps();"
            ]
        );
    }

    #[test]
    fn test_no_duplicate_identity_or_timestamps() {
        let out = lines(
            json!([
                {"name": "id", "type": "bigIncrements"},
                {"name": "title", "type": "string"},
                {"name": "timestamps", "type": "timestampsTz"}
            ]),
            json!([]),
        );
        assert_eq!(
            out,
            [
                "$table->bigIncrements('id');",
                "$table->string('title');",
                "$table->timestampsTz();"
            ]
        );

        let out = lines(
            json!([
                {"name": "title", "type": "string"},
                {"name": "created_at", "type": "timestamp", "nullable": true}
            ]),
            json!([]),
        );
        assert_eq!(
            out,
            [
                "$table->id();",
                "$table->string('title');",
                "$table->timestamp('created_at')->nullable();",
                "$table->timestamp('updated_at')->nullable();"
            ]
        );
    }

    #[test]
    fn test_declared_timestamp_pair_by_name() {
        let out = lines(
            json!([
                {"name": "updated_at", "type": "dateTime"},
                {"name": "created_at", "type": "dateTime"}
            ]),
            json!([]),
        );
        assert_eq!(
            out,
            [
                "$table->id();",
                "$table->dateTime('updated_at');",
                "$table->dateTime('created_at');"
            ]
        );
    }

    #[test]
    fn test_conflicting_columns_are_rejected() {
        let cases = [
            (json!([{"name": "title", "type": "string"}, {"name": "title", "type": "text"}]), "title"),
            (json!([{"name": "id", "type": "uuid"}]), "id"),
            (json!([{"name": "timestamps", "type": "timestamps"}, {"name": "created_at", "type": "timestamp"}]), "created_at"),
            (json!([{"name": "deleted_at", "type": "softDeletes"}, {"name": "deleted_at", "type": "timestamp"}]), "deleted_at"),
            (json!([{"name": "commentable", "type": "morphs"}, {"name": "commentable_id", "type": "integer"}]), "commentable_id"),
        ];
        for (attrs, column) in cases {
            let err = compile("Post", &records(attrs.clone()), &[]).unwrap_err();
            match err {
                CompileError::ConflictingDeclaration { ref name, .. } => {
                    assert_eq!(name, column, "{attrs}")
                }
                other => panic!("{attrs}: expected ConflictingDeclaration, got {other:?}"),
            }
        }

        // A placeholder named like a column produces no column.
        let out = lines(
            json!([
                {"name": "author", "type": "string"},
                {"name": "author", "type": "relationship", "relationship": {"type": "belongsTo"}}
            ]),
            json!([]),
        );
        assert_eq!(out[1], "$table->string('author');");
    }

    #[test]
    fn test_after_must_name_another_column() {
        let out = lines(
            json!([
                {"name": "title", "type": "string"},
                {"name": "subtitle", "type": "string", "after": "title"},
                {"name": "summary", "type": "string", "after": "id"}
            ]),
            json!([]),
        );
        assert_eq!(out[2], "$table->string('subtitle')->after('title');");
        assert_eq!(out[3], "$table->string('summary')->after('id');");

        for after in ["nope", "title"] {
            let attrs = json!([{"name": "title", "type": "string", "after": after}]);
            let err = compile("Post", &records(attrs), &[]).unwrap_err();
            assert_eq!(err.kind(), "invalid_field_value", "{after}");
            assert!(err.to_string().contains("after"));
        }
    }

    #[test]
    fn test_modifiers_then_constraint_tail() {
        let out = lines(
            json!([
                {"name": "author_id", "type": "foreignId", "on": "users",
                 "nullable": true, "onDelete": "cascade", "after": "title"},
                {"name": "title", "type": "string", "length": 80, "unique": true, "default": "untitled"},
                {"name": "price", "type": "decimal", "total": 10, "places": 2}
            ]),
            json!([]),
        );
        assert_eq!(
            out[1],
            "$table->foreignId('author_id')->nullable()->after('title')->constrained('users')->onDelete('cascade');"
        );
        assert_eq!(
            out[2],
            "$table->string('title', 80)->unique()->default('untitled');"
        );
        assert_eq!(out[3], "$table->decimal('price', 10, 2);");
    }

    #[test]
    fn test_foreign_emits_constraint_statement() {
        let out = lines(
            json!([{"name": "owner_id", "type": "foreign", "on": "users", "onDelete": "set null", "nullable": true}]),
            json!([]),
        );
        assert_eq!(out[1], "$table->unsignedBigInteger('owner_id')->nullable();");
        assert_eq!(
            out[2],
            "$table->foreign('owner_id')->references('id')->on('users')->onDelete('set null');"
        );
    }

    #[test]
    fn test_placeholders_and_morphs() {
        let out = lines(
            json!([
                {"name": "commentable", "type": "morphs"},
                {"name": "author", "type": "relationship", "relationship": {"type": "belongsTo"}},
                {"name": "deleted_at", "type": "softDeletes"}
            ]),
            json!([]),
        );
        assert_eq!(
            out,
            [
                "$table->id();",
                "$table->morphs('commentable');",
                "$table->softDeletes();",
                "$table->timestamps();"
            ]
        );
    }

    #[test]
    fn test_unique_index_on_unique_column_is_elided() {
        let out = lines(
            json!([{"name": "email", "type": "string", "unique": true}]),
            json!([{"columns": ["email"], "type": "unique"}]),
        );
        let email_indexes = out
            .iter()
            .filter(|l| l.contains("'email'") && l.contains("unique"))
            .count();
        assert_eq!(email_indexes, 1);
        assert!(!out.iter().any(|l| l.starts_with("$table->unique(")));
    }

    #[test]
    fn test_index_elision_by_strength() {
        let out = lines(
            json!([
                {"name": "email", "type": "string", "unique": true},
                {"name": "author_id", "type": "foreignId", "on": "users"},
                {"name": "code", "type": "string"}
            ]),
            json!([
                {"columns": ["email"], "type": "index"},
                {"columns": ["author_id"], "type": "index"},
                {"columns": ["author_id"], "type": "unique"},
                {"columns": ["id"], "type": "primary"},
                {"columns": ["code"]},
                {"columns": ["email", "code"], "type": "unique"},
                {"columns": ["code"], "type": "fulltext"}
            ]),
        );
        let indexes: Vec<&String> = out
            .iter()
            .filter(|l| {
                ["$table->index(", "$table->unique(", "$table->primary(", "$table->fullText("]
                    .iter()
                    .any(|p| l.starts_with(p))
            })
            .collect();
        assert_eq!(
            indexes,
            [
                "$table->unique('author_id');",
                "$table->index('code');",
                "$table->unique(['email', 'code']);",
                "$table->fullText('code');"
            ]
        );
    }

    #[test]
    fn test_invalid_indexes() {
        let attrs = records(json!([{"name": "title", "type": "string"}]));
        let cases = [
            json!([{"columns": []}]),
            json!([{"columns": ["title"], "type": "btree"}]),
            json!([{"columns": ["title"], "name": "idx"}]),
            json!([{"columns": ["missing"]}]),
        ];
        for idx in cases {
            let err = compile("Post", &attrs, &records(idx.clone())).unwrap_err();
            assert!(
                matches!(err, CompileError::InvalidIndexSpec { position: 0, .. }),
                "{idx}: {err:?}"
            );
        }
    }

    #[test]
    fn test_morph_and_timestamp_columns_are_indexable() {
        let out = lines(
            json!([{"name": "commentable", "type": "morphs"}]),
            json!([{"columns": ["commentable_type", "created_at"]}]),
        );
        assert_eq!(
            out.last().map(String::as_str),
            Some("$table->index(['commentable_type', 'created_at']);")
        );
    }

    #[test]
    fn test_attribute_errors_are_reraised() {
        let err = compile(
            "Post",
            &records(json!([{"name": "body", "type": "text", "length": 10}])),
            &[],
        )
        .unwrap_err();
        assert_eq!(err.entity(), "Post");
        assert_eq!(err.kind(), "illegal_field");
    }

    #[test]
    fn test_every_type_has_a_renderer_except_placeholders() {
        for ty in ColumnType::ALL {
            assert_eq!(renderer(*ty).is_none(), ty.is_placeholder(), "{ty}");
        }
    }
}
