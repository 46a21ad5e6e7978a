//! The model's `$fillable` list: every declared column a request may set.
//!
//! Identity, timestamp and foreign-key columns are guarded, as are the system
//! columns under any type.

use super::attribute::AttributeSpec;

/// Columns the framework writes itself, whatever type they are declared with.
pub const SYSTEM_COLUMNS: [&str; 4] = ["id", "created_at", "updated_at", "deleted_at"];

/// Whether an attribute is excluded from mass assignment.
pub fn is_guarded(attribute: &AttributeSpec) -> bool {
    let ty = attribute.ty;
    ty.is_identity()
        || ty.is_timestamp_producing()
        || ty.is_foreign_key_producing()
        || ty.is_placeholder()
        || SYSTEM_COLUMNS.contains(&attribute.name.as_str())
}

/// Mass-assignable attribute names, in declaration order.
pub fn project(attributes: &[AttributeSpec]) -> Vec<String> {
    attributes
        .iter()
        .filter(|a| !is_guarded(a))
        .map(|a| a.name.clone())
        .collect()
}

/// `['title', 'body']`, the value of the model's `$fillable` property.
pub fn declaration(fillable: &[String]) -> String {
    super::php::quote_list(fillable)
}
