//! # Attribute Validation
//!
//! Turns one loosely-typed attribute record (a JSON object from a module config)
//! into a typed [`AttributeSpec`], enforcing the closed column vocabulary in
//! [`ColumnType`] and its per-type field whitelist.
//!
//! Validation is pure and stops at the first violation. The checks run in a fixed
//! order so the same record always reports the same error:
//!
//! 1. `name` present, a string, and a valid identifier
//! 2. `type` present and part of the vocabulary
//! 3. every other key whitelisted for the type
//! 4. the type's required fields present
//! 5. every value of the expected JSON shape
//! 6. an enum default is one of its options

use serde_json::{Map, Value};

use super::column_type::{ColumnType, Field};
use super::error::AttributeError;
use super::php;
use crate::naming;

/// Referential action for `onDelete` / `onUpdate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferentialAction {
    Cascade,
    Restrict,
    SetNull,
    NoAction,
}

impl ReferentialAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cascade" => Some(Self::Cascade),
            "restrict" => Some(Self::Restrict),
            "set null" => Some(Self::SetNull),
            "no action" => Some(Self::NoAction),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cascade => "cascade",
            Self::Restrict => "restrict",
            Self::SetNull => "set null",
            Self::NoAction => "no action",
        }
    }
}

/// A scalar column default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl DefaultValue {
    /// Render as a PHP literal.
    pub fn to_php(&self) -> String {
        match self {
            DefaultValue::Null => "null".to_string(),
            DefaultValue::Bool(b) => b.to_string(),
            DefaultValue::Number(n) => n.to_string(),
            DefaultValue::String(s) => php::quote(s),
        }
    }
}

/// A validated attribute.
///
/// Fields not whitelisted for `ty` are always `None`/`false`/empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    pub name: String,
    pub ty: ColumnType,
    pub length: Option<u64>,
    pub nullable: bool,
    pub unique: bool,
    pub default: Option<DefaultValue>,
    pub after: Option<String>,
    pub total: Option<u64>,
    pub places: Option<u64>,
    pub options: Vec<String>,
    pub on: Option<String>,
    pub references: Option<String>,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
    /// Legacy payload of the `relationship` placeholder type; never rendered.
    pub relationship: Option<Value>,
}

impl AttributeSpec {
    /// A bare attribute of the given type, as if declared with only `name` and `type`.
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            length: None,
            nullable: false,
            unique: false,
            default: None,
            after: None,
            total: None,
            places: None,
            options: Vec::new(),
            on: None,
            references: None,
            on_delete: None,
            on_update: None,
            relationship: None,
        }
    }

    /// Whether a foreign key column carries an actual constraint.
    ///
    /// A `foreignId` without `on` is still constrained when it names a referenced
    /// column or a referential action; the table is then inferred from the name.
    pub fn is_constrained(&self) -> bool {
        match self.ty {
            ColumnType::ForeignId => {
                self.on.is_some()
                    || self.references.is_some()
                    || self.on_delete.is_some()
                    || self.on_update.is_some()
            }
            ColumnType::Foreign => self.on.is_some(),
            _ => false,
        }
    }

    /// The table a constrained foreign key points at.
    pub fn referenced_table(&self) -> Option<String> {
        if !self.is_constrained() {
            return None;
        }
        self.on.clone().or_else(|| {
            let stem = self.name.strip_suffix("_id").unwrap_or(&self.name);
            Some(naming::plural(stem))
        })
    }

    /// Column names this attribute produces in the table.
    pub fn column_names(&self) -> Vec<String> {
        use ColumnType::*;
        match self.ty {
            Morphs | NullableMorphs | UuidMorphs => {
                vec![format!("{}_id", self.name), format!("{}_type", self.name)]
            }
            Timestamps | TimestampsTz | NullableTimestamps => {
                vec!["created_at".to_string(), "updated_at".to_string()]
            }
            SoftDeletes | SoftDeletesTz => vec!["deleted_at".to_string()],
            Relationship => Vec::new(),
            _ => vec![self.name.clone()],
        }
    }
}

const NAME_RULE: &str = "every attribute needs a name";

/// Validate one raw attribute record.
///
/// # Errors
///
/// The first violated rule, as an [`AttributeError`] naming the attribute.
pub fn validate(raw: &Map<String, Value>) -> Result<AttributeSpec, AttributeError> {
    let raw_type = raw.get("type").and_then(Value::as_str).map(str::to_string);

    let name = match raw.get("name") {
        None | Some(Value::Null) => {
            return Err(AttributeError::MissingRequiredField {
                attribute: "(unnamed)".to_string(),
                ty: raw_type.unwrap_or_else(|| "?".to_string()),
                field: "name".to_string(),
                rule: NAME_RULE,
            })
        }
        Some(Value::String(s)) if naming::is_identifier(s) => s.clone(),
        Some(other) => {
            return Err(AttributeError::InvalidFieldValue {
                attribute: other.to_string(),
                field: "name".to_string(),
                expected: "a valid identifier string",
            })
        }
    };

    let ty = match raw_type.as_deref().and_then(ColumnType::parse) {
        Some(ty) => ty,
        None => {
            return Err(AttributeError::UnknownType {
                attribute: name,
                ty: raw.get("type").map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                }),
            })
        }
    };

    for key in raw.keys() {
        if key == "name" || key == "type" {
            continue;
        }
        let allowed = Field::from_key(key).is_some_and(|f| ty.allows(f));
        if !allowed {
            return Err(AttributeError::IllegalField {
                attribute: name,
                ty: ty.to_string(),
                field: key.clone(),
            });
        }
    }

    for (field, rule) in ty.required_fields() {
        let present = match raw.get(field.key()) {
            None | Some(Value::Null) => false,
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(AttributeError::MissingRequiredField {
                attribute: name,
                ty: ty.to_string(),
                field: field.key().to_string(),
                rule: *rule,
            });
        }
    }

    let reader = FieldReader { raw, name: &name };
    let mut spec = AttributeSpec::new(name.clone(), ty);
    spec.length = reader.positive_int(Field::Length)?;
    spec.nullable = reader.flag(Field::Nullable)?;
    spec.unique = reader.flag(Field::Unique)?;
    spec.default = reader.scalar(Field::Default)?;
    spec.after = reader.identifier(Field::After)?;
    spec.total = reader.positive_int(Field::Total)?;
    spec.places = reader.non_negative_int(Field::Places)?;
    spec.options = reader.string_list(Field::Options)?;
    spec.on = reader.identifier(Field::On)?;
    spec.references = reader.identifier(Field::References)?;
    spec.on_delete = reader.action(Field::OnDelete)?;
    spec.on_update = reader.action(Field::OnUpdate)?;
    spec.relationship = raw
        .get(Field::Relationship.key())
        .filter(|v| !v.is_null())
        .cloned();
    if ty == ColumnType::Enum {
        match &spec.default {
            None | Some(DefaultValue::Null) => {}
            Some(DefaultValue::String(d)) if spec.options.contains(d) => {}
            Some(_) => return Err(reader.invalid(Field::Default, "one of the enum options")),
        }
    }
    Ok(spec)
}

struct FieldReader<'a> {
    raw: &'a Map<String, Value>,
    name: &'a str,
}

impl FieldReader<'_> {
    fn invalid(&self, field: Field, expected: &'static str) -> AttributeError {
        AttributeError::InvalidFieldValue {
            attribute: self.name.to_string(),
            field: field.key().to_string(),
            expected,
        }
    }

    fn get(&self, field: Field) -> Option<&Value> {
        self.raw.get(field.key()).filter(|v| !v.is_null())
    }

    fn positive_int(&self, field: Field) -> Result<Option<u64>, AttributeError> {
        match self.get(field) {
            None => Ok(None),
            Some(v) => match v.as_u64() {
                Some(n) if n > 0 => Ok(Some(n)),
                _ => Err(self.invalid(field, "a positive integer")),
            },
        }
    }

    fn non_negative_int(&self, field: Field) -> Result<Option<u64>, AttributeError> {
        match self.get(field) {
            None => Ok(None),
            Some(v) => v
                .as_u64()
                .map(Some)
                .ok_or_else(|| self.invalid(field, "a non-negative integer")),
        }
    }

    fn flag(&self, field: Field) -> Result<bool, AttributeError> {
        match self.get(field) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(self.invalid(field, "a boolean")),
        }
    }

    fn scalar(&self, field: Field) -> Result<Option<DefaultValue>, AttributeError> {
        // An explicit `null` default is meaningful, so read the raw key.
        match self.raw.get(field.key()) {
            None => Ok(None),
            Some(Value::Null) => Ok(Some(DefaultValue::Null)),
            Some(Value::Bool(b)) => Ok(Some(DefaultValue::Bool(*b))),
            Some(Value::Number(n)) => Ok(Some(DefaultValue::Number(n.clone()))),
            Some(Value::String(s)) => Ok(Some(DefaultValue::String(s.clone()))),
            Some(_) => Err(self.invalid(field, "a scalar (string, number, boolean or null)")),
        }
    }

    fn identifier(&self, field: Field) -> Result<Option<String>, AttributeError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) if naming::is_identifier(s) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid(field, "an identifier string")),
        }
    }

    fn string_list(&self, field: Field) -> Result<Vec<String>, AttributeError> {
        match self.get(field) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| self.invalid(field, "a list of strings"))
                })
                .collect(),
            Some(_) => Err(self.invalid(field, "a list of strings")),
        }
    }

    fn action(&self, field: Field) -> Result<Option<ReferentialAction>, AttributeError> {
        match self.get(field) {
            None => Ok(None),
            Some(v) => v
                .as_str()
                .and_then(ReferentialAction::parse)
                .map(Some)
                .ok_or_else(|| {
                    self.invalid(field, "one of 'cascade', 'restrict', 'set null', 'no action'")
                }),
        }
    }
}
