//! Fake-data expressions for factories.
//!
//! Resolution order for one attribute:
//!
//! 1. columns the framework fills (identity, timestamps, morphs, placeholders) get nothing
//! 2. name heuristics, first substring match wins
//! 3. a strategy per column family
//! 4. `word()`
//!
//! The choice of expression depends only on the attribute, never on randomness.

use serde::Serialize;

use super::attribute::AttributeSpec;
use super::column_type::Family;
use super::fillable::SYSTEM_COLUMNS;
use super::php::quote_list;
use super::relation::{RelationKind, RelationSpec};
use super::resolve::{EntityRegistry, Resolution};
use crate::naming;

/// Name fragments checked before the column type, in priority order.
const NAME_HEURISTICS: [(&str, &str); 5] = [
    ("email", "$this->faker->unique()->safeEmail()"),
    ("password", "$this->faker->password()"),
    ("title", "$this->faker->sentence()"),
    ("name", "$this->faker->name()"),
    ("slug", "$this->faker->name()"),
];

const FALLBACK: &str = "$this->faker->word()";

/// The generator expression for one factory field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntheticExpression {
    pub field: String,
    pub expression: String,
    /// Target of a foreign-key factory reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Resolution>,
}

impl SyntheticExpression {
    fn faker(field: &str, expression: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            expression: expression.into(),
            target: None,
        }
    }

    /// Fully-qualified class the factory file must import.
    pub fn import(&self) -> Option<&str> {
        self.target.as_ref().and_then(Resolution::fqcn)
    }
}

/// What the resolver may look at besides the attribute itself.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticContext<'a> {
    pub relations: &'a [RelationSpec],
    pub registry: &'a EntityRegistry,
}

fn is_skipped(attribute: &AttributeSpec) -> bool {
    let ty = attribute.ty;
    ty.is_identity()
        || ty.is_timestamp_producing()
        || ty.is_placeholder()
        || ty.family() == Family::Morphs
        || SYSTEM_COLUMNS.contains(&attribute.name.as_str())
}

/// The entity a foreign key column points at, before namespace resolution.
fn foreign_target(attribute: &AttributeSpec, relations: &[RelationSpec]) -> String {
    let from_relation = relations.iter().find_map(|r| {
        (r.kind == RelationKind::BelongsTo && r.owning_key().as_deref() == Some(&attribute.name))
            .then(|| r.model.clone())
            .flatten()
    });
    if let Some(model) = from_relation {
        return model;
    }
    if let Some(on) = &attribute.on {
        return naming::model_for_table(on);
    }
    let stem = attribute
        .name
        .strip_suffix("_id")
        .unwrap_or(&attribute.name);
    naming::studly(stem)
}

fn by_type(attribute: &AttributeSpec, ctx: SyntheticContext<'_>) -> Option<SyntheticExpression> {
    let field = attribute.name.as_str();
    let expr = match attribute.ty.family() {
        Family::Text => "$this->faker->paragraph()".to_string(),
        Family::Integer => "$this->faker->randomNumber()".to_string(),
        Family::Boolean => "$this->faker->boolean()".to_string(),
        Family::Date => "$this->faker->dateTime()".to_string(),
        Family::Uuid => "$this->faker->uuid()".to_string(),
        Family::Decimal => {
            format!("$this->faker->randomFloat({})", attribute.places.unwrap_or(2))
        }
        Family::Enum => format!(
            "$this->faker->randomElement({})",
            quote_list(&attribute.options)
        ),
        Family::ForeignKey => {
            let target = ctx
                .registry
                .resolve(&foreign_target(attribute, ctx.relations));
            return Some(SyntheticExpression {
                field: field.to_string(),
                expression: format!("{}::factory()", target.class()),
                target: Some(target),
            });
        }
        Family::String
        | Family::Json
        | Family::TimestampPair
        | Family::SoftDeletes
        | Family::Identity
        | Family::Morphs
        | Family::Relationship => return None,
    };
    Some(SyntheticExpression::faker(field, expr))
}

/// Resolve the factory expression for one attribute, `None` when the column is
/// filled by the framework.
pub fn resolve(attribute: &AttributeSpec, ctx: SyntheticContext<'_>) -> Option<SyntheticExpression> {
    if is_skipped(attribute) {
        return None;
    }
    let lowered = attribute.name.to_lowercase();
    if let Some((_, expr)) = NAME_HEURISTICS
        .iter()
        .find(|(fragment, _)| lowered.contains(fragment))
    {
        return Some(SyntheticExpression::faker(&attribute.name, *expr));
    }
    by_type(attribute, ctx)
        .or_else(|| Some(SyntheticExpression::faker(&attribute.name, FALLBACK)))
}

/// Resolve every attribute of a component, in declaration order.
pub fn resolve_all(
    attributes: &[AttributeSpec],
    ctx: SyntheticContext<'_>,
) -> Vec<SyntheticExpression> {
    attributes.iter().filter_map(|a| resolve(a, ctx)).collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::compiler::column_type::ColumnType;

    fn registry() -> EntityRegistry {
        EntityRegistry::new("Blog")
            .with_local(["Post", "Category"])
            .with_global("App\\Models", ["User"])
    }

    fn expr(attribute: &AttributeSpec, relations: &[RelationSpec]) -> Option<String> {
        let reg = registry();
        resolve(
            attribute,
            SyntheticContext {
                relations,
                registry: &reg,
            },
        )
        .map(|s| s.expression)
    }

    #[test]
    fn test_name_heuristics_beat_type() {
        let a = AttributeSpec::new("user_email", ColumnType::String);
        assert_eq!(
            expr(&a, &[]).as_deref(),
            Some("$this->faker->unique()->safeEmail()")
        );
        let a = AttributeSpec::new("page_title", ColumnType::Text);
        assert_eq!(expr(&a, &[]).as_deref(), Some("$this->faker->sentence()"));
        let a = AttributeSpec::new("slug", ColumnType::String);
        assert_eq!(expr(&a, &[]).as_deref(), Some("$this->faker->name()"));
    }

    #[test]
    fn test_enum_uses_exactly_its_options() {
        let mut a = AttributeSpec::new("status", ColumnType::Enum);
        a.options = vec!["draft".to_string(), "published".to_string()];
        assert_eq!(
            expr(&a, &[]).as_deref(),
            Some("$this->faker->randomElement(['draft', 'published'])")
        );

        // Single-quoted, so `$usd` stays a literal in PHP.
        a.options = vec!["$usd".to_string(), "it's".to_string()];
        assert_eq!(
            expr(&a, &[]).as_deref(),
            Some(r"$this->faker->randomElement(['$usd', 'it\'s'])")
        );
    }

    #[test]
    fn test_type_strategies_and_fallback() {
        let mut price = AttributeSpec::new("price", ColumnType::Decimal);
        price.places = Some(3);
        let cases = [
            (AttributeSpec::new("body", ColumnType::LongText), "$this->faker->paragraph()"),
            (AttributeSpec::new("views", ColumnType::UnsignedInteger), "$this->faker->randomNumber()"),
            (AttributeSpec::new("active", ColumnType::Boolean), "$this->faker->boolean()"),
            (AttributeSpec::new("published_at", ColumnType::DateTime), "$this->faker->dateTime()"),
            (AttributeSpec::new("token", ColumnType::Uuid), "$this->faker->uuid()"),
            (price, "$this->faker->randomFloat(3)"),
            (AttributeSpec::new("summary", ColumnType::String), "$this->faker->word()"),
            (AttributeSpec::new("meta", ColumnType::Json), "$this->faker->word()"),
        ];
        for (a, expected) in cases {
            assert_eq!(expr(&a, &[]).as_deref(), Some(expected), "{}", a.name);
        }
    }

    #[test]
    fn test_framework_columns_are_skipped() {
        for a in [
            AttributeSpec::new("id", ColumnType::Id),
            AttributeSpec::new("timestamps", ColumnType::Timestamps),
            AttributeSpec::new("created_at", ColumnType::Timestamp),
            AttributeSpec::new("deleted_at", ColumnType::SoftDeletes),
            AttributeSpec::new("commentable", ColumnType::Morphs),
            AttributeSpec::new("author", ColumnType::Relationship),
        ] {
            assert_eq!(expr(&a, &[]), None, "{}", a.name);
        }
    }

    #[test]
    fn test_foreign_key_target_lookup_order() {
        let mut author = RelationSpec::new("author", RelationKind::BelongsTo);
        author.model = Some("User".to_string());

        let mut a = AttributeSpec::new("author_id", ColumnType::ForeignId);
        a.on = Some("people".to_string());
        assert_eq!(
            expr(&a, std::slice::from_ref(&author)).as_deref(),
            Some("User::factory()")
        );

        // No matching relation: the referenced table decides.
        assert_eq!(expr(&a, &[]).as_deref(), Some("Person::factory()"));

        let b = AttributeSpec::new("category_id", ColumnType::ForeignId);
        assert_eq!(expr(&b, &[]).as_deref(), Some("Category::factory()"));
    }

    #[test]
    fn test_foreign_key_reports_import() {
        let reg = registry();
        let a = AttributeSpec::new("category_id", ColumnType::Foreign);
        let s = resolve(
            &a,
            SyntheticContext {
                relations: &[],
                registry: &reg,
            },
        )
        .unwrap();
        assert_eq!(s.import(), Some("Modules\\Blog\\Models\\Category"));

        let a = AttributeSpec::new("tag_id", ColumnType::ForeignId);
        let s = resolve(
            &a,
            SyntheticContext {
                relations: &[],
                registry: &reg,
            },
        )
        .unwrap();
        assert!(s.target.as_ref().unwrap().is_placeholder());
        assert_eq!(s.import(), None);
    }
}
