//! Validation rules for the generated store request.

use serde::Serialize;

use super::attribute::AttributeSpec;
use super::column_type::Family;
use super::fillable;
use super::php::quote;

const DEFAULT_STRING_LENGTH: u64 = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestRule {
    pub field: String,
    pub rules: Vec<String>,
}

impl RequestRule {
    /// `'title' => 'required|string|max:255'`
    pub fn to_php(&self) -> String {
        format!("{} => {}", quote(&self.field), quote(&self.rules.join("|")))
    }
}

fn type_rule(attribute: &AttributeSpec) -> Option<String> {
    let rule = match attribute.ty.family() {
        Family::String => format!(
            "string|max:{}",
            attribute.length.unwrap_or(DEFAULT_STRING_LENGTH)
        ),
        Family::Text => "string".to_string(),
        Family::Uuid => "uuid".to_string(),
        Family::Integer | Family::ForeignKey => "integer".to_string(),
        Family::Boolean => "boolean".to_string(),
        Family::Date => "date".to_string(),
        Family::Json => "array".to_string(),
        Family::Decimal => "numeric".to_string(),
        Family::Enum => format!("in:{}", attribute.options.join(",")),
        Family::TimestampPair
        | Family::SoftDeletes
        | Family::Identity
        | Family::Morphs
        | Family::Relationship => return None,
    };
    Some(rule)
}

/// Rules for every mass-assignable attribute plus every constrained foreign key.
pub fn derive(table: &str, attributes: &[AttributeSpec]) -> Vec<RequestRule> {
    attributes
        .iter()
        .filter(|a| {
            !fillable::is_guarded(a)
                || (a.ty.family() == Family::ForeignKey
                    && a.is_constrained()
                    && !fillable::SYSTEM_COLUMNS.contains(&a.name.as_str()))
        })
        .filter_map(|a| {
            let mut rules = vec![if a.nullable { "nullable" } else { "required" }.to_string()];
            rules.push(type_rule(a)?);
            if a.unique {
                rules.push(format!("unique:{table},{}", a.name));
            }
            if let Some(referenced) = a.referenced_table() {
                let column = a.references.as_deref().unwrap_or("id");
                rules.push(format!("exists:{referenced},{column}"));
            }
            Some(RequestRule {
                field: a.name.clone(),
                rules,
            })
        })
        .collect()
}
