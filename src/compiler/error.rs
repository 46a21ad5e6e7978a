//! Typed compile failures, one enum per stage.

use thiserror::Error;

/// A single attribute record failed validation.
///
/// Produced by [`validate`](super::attribute::validate) without entity context;
/// [`CompileError::Attribute`] adds the entity name when the failure surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// `type` is missing or not part of the closed column vocabulary.
    #[error("attribute '{attribute}': unknown column type {}", display_type(.ty))]
    UnknownType {
        attribute: String,
        ty: Option<String>,
    },
    /// A key that is not whitelisted for the attribute's type.
    #[error("attribute '{attribute}': field '{field}' is not allowed for type '{ty}'")]
    IllegalField {
        attribute: String,
        ty: String,
        field: String,
    },
    /// A field the type cannot do without.
    #[error("attribute '{attribute}': type '{ty}' requires '{field}' ({rule})")]
    MissingRequiredField {
        attribute: String,
        ty: String,
        field: String,
        rule: &'static str,
    },
    /// A whitelisted field whose value has the wrong shape.
    #[error("attribute '{attribute}': field '{field}' must be {expected}")]
    InvalidFieldValue {
        attribute: String,
        field: String,
        expected: &'static str,
    },
}

fn display_type(ty: &Option<String>) -> String {
    match ty {
        Some(t) => format!("'{t}'"),
        None => "(no 'type' given)".to_string(),
    }
}

/// A relation record is malformed for its kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("relation '{relation}' ({kind}): {reason}")]
pub struct RelationError {
    pub relation: String,
    /// The declared relation type, verbatim (may be unknown).
    pub kind: String,
    /// The offending field, when the failure is about one.
    pub field: Option<String>,
    pub reason: String,
}

impl RelationError {
    pub(crate) fn field(
        relation: &str,
        kind: &str,
        field: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            relation: relation.to_string(),
            kind: kind.to_string(),
            field: Some(field.to_string()),
            reason: reason.into(),
        }
    }
}

/// Why one entity of a module could not be compiled.
///
/// Every variant names the entity so the source document can be fixed without
/// looking at generated output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("entity '{entity}': {source}")]
    Attribute {
        entity: String,
        #[source]
        source: AttributeError,
    },
    #[error("entity '{entity}': index #{position}: {reason}")]
    InvalidIndexSpec {
        entity: String,
        /// Zero-based position in the `indexes` list.
        position: usize,
        reason: String,
    },
    #[error("entity '{entity}': {source}")]
    InvalidRelationConfig {
        entity: String,
        #[source]
        source: RelationError,
    },
    #[error("module '{module}': entity '{entity}' is declared more than once")]
    DuplicateEntity { module: String, entity: String },
    /// Two declarations of one entity contradict each other.
    #[error("entity '{entity}': '{name}' {reason}")]
    ConflictingDeclaration {
        entity: String,
        name: String,
        reason: String,
    },
    #[error("entity '{entity}': '{name}' is not a valid {what} name")]
    InvalidName {
        entity: String,
        name: String,
        what: &'static str,
    },
    /// Raised only when the caller escalates soft failures (`--strict`).
    #[error("entity '{entity}': unresolved target entity '{target}': {reason}")]
    UnresolvedTargetEntity {
        entity: String,
        target: String,
        reason: String,
    },
}

impl CompileError {
    /// The entity the error belongs to.
    pub fn entity(&self) -> &str {
        match self {
            CompileError::Attribute { entity, .. }
            | CompileError::InvalidIndexSpec { entity, .. }
            | CompileError::InvalidRelationConfig { entity, .. }
            | CompileError::DuplicateEntity { entity, .. }
            | CompileError::ConflictingDeclaration { entity, .. }
            | CompileError::InvalidName { entity, .. }
            | CompileError::UnresolvedTargetEntity { entity, .. } => entity,
        }
    }

    /// Short machine-readable tag, used as the diagnostic kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::Attribute { source, .. } => match source {
                AttributeError::UnknownType { .. } => "unknown_type",
                AttributeError::IllegalField { .. } => "illegal_field",
                AttributeError::MissingRequiredField { .. } => "missing_required_field",
                AttributeError::InvalidFieldValue { .. } => "invalid_field_value",
            },
            CompileError::InvalidIndexSpec { .. } => "invalid_index_spec",
            CompileError::InvalidRelationConfig { .. } => "invalid_relation_config",
            CompileError::DuplicateEntity { .. } => "duplicate_entity",
            CompileError::ConflictingDeclaration { .. } => "conflicting_declaration",
            CompileError::InvalidName { .. } => "invalid_name",
            CompileError::UnresolvedTargetEntity { .. } => "unresolved_target_entity",
        }
    }

    pub(crate) fn attribute(entity: &str, source: AttributeError) -> Self {
        CompileError::Attribute {
            entity: entity.to_string(),
            source,
        }
    }

    pub(crate) fn relation(entity: &str, source: RelationError) -> Self {
        CompileError::InvalidRelationConfig {
            entity: entity.to_string(),
            source,
        }
    }

    pub(crate) fn conflict(entity: &str, name: &str, reason: impl Into<String>) -> Self {
        CompileError::ConflictingDeclaration {
            entity: entity.to_string(),
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn index(entity: &str, position: usize, reason: impl Into<String>) -> Self {
        CompileError::InvalidIndexSpec {
            entity: entity.to_string(),
            position,
            reason: reason.into(),
        }
    }
}
