#![allow(clippy::unwrap_used, clippy::expect_used)]

use modmaker::compiler::synthetic::SyntheticContext;
use modmaker::compiler::{
    compile_component, compile_module, relation, schema, synthetic, validate, ColumnType,
    CompileOptions, EntityRegistry, RelationKind, Resolution, Tier,
};
use modmaker::spec::{ComponentSpec, ModuleSpec, RawRecord};
use serde_json::{json, Value};

fn records(v: Value) -> Vec<RawRecord> {
    serde_json::from_value(v).unwrap()
}

fn component(v: Value) -> ComponentSpec {
    serde_json::from_value(v).unwrap()
}

fn registry() -> EntityRegistry {
    EntityRegistry::new("Blog").with_global("App\\Models", ["User"])
}

#[test]
fn test_schema_compilation_is_idempotent() {
    let attrs = records(json!([
        {"name": "title", "type": "string", "length": 120, "unique": true},
        {"name": "price", "type": "decimal", "total": 10, "places": 2, "default": 0},
        {"name": "status", "type": "enum", "options": ["draft", "published"]}
    ]));
    let indexes = records(json!([{"columns": ["status", "price"]}]));
    let first = schema::compile("Product", &attrs, &indexes).unwrap();
    let second = schema::compile("Product", &attrs, &indexes).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.lines(), second.lines());
}

#[test]
fn test_every_closed_type_is_accepted_and_others_rejected() {
    for ty in ColumnType::ALL {
        let mut raw = json!({"name": "col", "type": ty.as_str()});
        for (field, _) in ty.required_fields() {
            let value = match field.key() {
                "options" => json!(["a", "b"]),
                "total" => json!(8),
                "places" => json!(2),
                "on" => json!("users"),
                "relationship" => json!({"type": "belongsTo"}),
                other => panic!("unexpected required field {other}"),
            };
            raw[field.key()] = value;
        }
        let raw: RawRecord = serde_json::from_value(raw).unwrap();
        assert!(validate(&raw).is_ok(), "{ty} should be accepted");
    }

    for bogus in ["varchar", "String", "int", ""] {
        let raw: RawRecord = serde_json::from_value(json!({"name": "col", "type": bogus})).unwrap();
        assert!(validate(&raw).is_err(), "{bogus:?} should be rejected");
    }
}

#[test]
fn test_identity_and_timestamps_inserted_once() {
    let lines = schema::compile("Post", &records(json!([{"name": "title", "type": "string"}])), &[])
        .unwrap()
        .lines();
    assert_eq!(
        lines,
        ["$table->id();", "$table->string('title');", "$table->timestamps();"]
    );

    let lines = schema::compile(
        "Post",
        &records(json!([
            {"name": "id", "type": "bigIncrements"},
            {"name": "title", "type": "string"},
            {"name": "timestamps", "type": "timestamps"}
        ])),
        &[],
    )
    .unwrap()
    .lines();
    assert_eq!(lines.iter().filter(|l| l.contains("id(")).count(), 0);
    assert_eq!(lines.iter().filter(|l| l.contains("timestamps()")).count(), 1);
    assert_eq!(lines[0], "$table->bigIncrements('id');");

    let lines = schema::compile(
        "Post",
        &records(json!([{"name": "created_at", "type": "timestamp"}])),
        &[],
    )
    .unwrap()
    .lines();
    assert!(!lines.iter().any(|l| l.contains("timestamps()")));
    assert_eq!(
        lines.last().map(String::as_str),
        Some("$table->timestamp('updated_at')->nullable();")
    );
}

#[test]
fn test_redundant_unique_index_is_elided() {
    let compiled = schema::compile(
        "User",
        &records(json!([{"name": "email", "type": "string", "unique": true}])),
        &records(json!([{"columns": ["email"], "type": "unique"}])),
    )
    .unwrap();
    assert!(compiled.indexes.is_empty());
    let lines = compiled.lines();
    assert_eq!(lines.iter().filter(|l| l.contains("unique")).count(), 1);
    assert!(lines.contains(&"$table->string('email')->unique();".to_string()));
}

#[test]
fn test_fillable_excludes_system_and_foreign_columns() {
    let attrs: Vec<_> = records(json!([
        {"name": "id", "type": "bigIncrements"},
        {"name": "title", "type": "string"},
        {"name": "author_id", "type": "foreignId"},
        {"name": "created_at", "type": "timestamp"}
    ]))
    .iter()
    .map(|r| validate(r).unwrap())
    .collect();
    assert_eq!(modmaker::compiler::fillable::project(&attrs), ["title"]);
}

#[test]
fn test_relation_field_matrix() {
    let legal = [
        json!({"name": "author", "type": "belongsTo", "model": "User", "ownerKey": "uuid"}),
        json!({"name": "profile", "type": "hasOne", "model": "Profile", "localKey": "id"}),
        json!({"name": "comments", "type": "hasMany", "model": "Comment", "foreignKey": "post_id"}),
        json!({"name": "image", "type": "morphOne", "model": "Image", "morphName": "imageable"}),
        json!({"name": "images", "type": "morphMany", "model": "Image", "morphName": "imageable"}),
        json!({"name": "tags", "type": "morphToMany", "model": "Tag", "morphName": "taggable", "table": "taggables"}),
        json!({"name": "imageable", "type": "morphTo"}),
    ];
    let illegal = [
        json!({"name": "author", "type": "belongsTo", "model": "User", "morphName": "x"}),
        json!({"name": "profile", "type": "hasOne"}),
        json!({"name": "comments", "type": "hasMany", "model": "Comment", "ownerKey": "id"}),
        json!({"name": "image", "type": "morphOne", "model": "Image"}),
        json!({"name": "images", "type": "morphMany", "model": "Image", "table": "images"}),
        json!({"name": "tags", "type": "morphToMany", "model": "Tag", "morphName": "taggable", "localKey": "id"}),
        json!({"name": "imageable", "type": "morphTo", "model": "Post"}),
    ];
    for (kind, (ok, bad)) in RelationKind::ALL.iter().zip(legal.iter().zip(illegal.iter())) {
        let ok: RawRecord = serde_json::from_value(ok.clone()).unwrap();
        let bad: RawRecord = serde_json::from_value(bad.clone()).unwrap();
        let spec = relation::parse(&ok).unwrap();
        assert_eq!(spec.kind, *kind);
        let err = relation::parse(&bad).unwrap_err();
        assert_eq!(err.kind, kind.as_str());
    }
}

#[test]
fn test_synthetic_precedence() {
    let registry = registry();
    let ctx = SyntheticContext {
        relations: &[],
        registry: &registry,
    };
    let email = validate(
        &serde_json::from_value(json!({"name": "user_email", "type": "string"})).unwrap(),
    )
    .unwrap();
    assert_eq!(
        synthetic::resolve(&email, ctx).unwrap().expression,
        "$this->faker->unique()->safeEmail()"
    );

    let status = validate(
        &serde_json::from_value(
            json!({"name": "status", "type": "enum", "options": ["draft", "published"]}),
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(
        synthetic::resolve(&status, ctx).unwrap().expression,
        "$this->faker->randomElement(['draft', 'published'])"
    );
}

#[test]
fn test_post_end_to_end() {
    let post = component(json!({
        "name": "Post",
        "attributes": [
            {"name": "title", "type": "string"},
            {"name": "author_id", "type": "foreignId", "on": "users"}
        ],
        "relations": [
            {"name": "author", "type": "belongsTo", "model": "User"}
        ]
    }));
    let d = compile_component("Blog", &post, &registry(), CompileOptions::default()).unwrap();

    assert_eq!(d.table, "posts");
    assert_eq!(
        d.schema_lines,
        [
            "$table->id();",
            "$table->string('title');",
            "$table->foreignId('author_id')->constrained('users');",
            "$table->timestamps();"
        ]
    );
    assert_eq!(d.fillable, ["title"]);
    assert_eq!(d.relation_methods.len(), 1);
    let author = &d.relation_methods[0];
    assert_eq!(author.kind, RelationKind::BelongsTo);
    assert_eq!(author.signature(), "public function author(): BelongsTo");
    assert_eq!(author.body(), "return $this->belongsTo(User::class);");
    assert!(matches!(
        author.target,
        Some(Resolution::Resolved {
            tier: Tier::Global,
            ..
        })
    ));
    assert!(d.required_imports.contains(&"App\\Models\\User".to_string()));
    assert_eq!(
        d.synthetic_map(),
        [
            ("title", "$this->faker->sentence()"),
            ("author_id", "User::factory()")
        ]
    );
    assert!(d.warnings.is_empty());
}

#[test]
fn test_module_isolates_failures_and_resolves_siblings() {
    let spec: ModuleSpec = serde_json::from_value(json!({
        "components": [
            {"name": "Comment", "relations": [{"name": "post", "type": "belongsTo", "model": "Post"}]},
            {"name": "Bad", "attributes": [{"name": "x", "type": "string", "options": ["a"]}]},
            {"name": "Post"},
            {"name": "Post"}
        ]
    }))
    .unwrap();
    let out = compile_module("Blog", &spec, &registry(), CompileOptions::default());

    let entities: Vec<_> = out.descriptors.iter().map(|d| d.entity.as_str()).collect();
    assert_eq!(entities, ["Comment", "Post"]);
    let kinds: Vec<_> = out.diagnostics.iter().map(|d| d.kind.as_str()).collect();
    assert_eq!(kinds, ["illegal_field", "duplicate_entity"]);

    let comment = &out.descriptors[0];
    assert_eq!(
        comment.relation_methods[0].target.as_ref().unwrap().fqcn(),
        Some("Modules\\Blog\\Models\\Post")
    );
    // Same namespace as the model: no import.
    assert!(!comment
        .required_imports
        .iter()
        .any(|i| i.ends_with("\\Post")));
}

#[test]
fn test_strict_escalates_unresolved_targets() {
    let c = component(json!({
        "name": "Post",
        "relations": [{"name": "editor", "type": "belongsTo", "model": "Editor"}]
    }));
    let lenient = compile_component("Blog", &c, &registry(), CompileOptions::default()).unwrap();
    assert_eq!(lenient.warnings.len(), 1);
    assert!(lenient.relation_methods[0].placeholder_note().is_some());

    let err = compile_component("Blog", &c, &registry(), CompileOptions { strict: true })
        .unwrap_err();
    assert_eq!(err.kind(), "unresolved_target_entity");
}

#[test]
fn test_contradictory_declarations_are_rejected() {
    let cases = [
        (
            json!({"name": "Post", "attributes": [
                {"name": "title", "type": "string"},
                {"name": "title", "type": "text"}
            ]}),
            "conflicting_declaration",
        ),
        (
            json!({"name": "Post", "attributes": [{"name": "id", "type": "string"}]}),
            "conflicting_declaration",
        ),
        (
            json!({"name": "Post", "relations": [
                {"name": "author", "type": "belongsTo", "model": "User"},
                {"name": "author", "type": "hasOne", "model": "User"}
            ]}),
            "conflicting_declaration",
        ),
        (
            json!({"name": "Post",
                "attributes": [{"name": "author", "type": "string"}],
                "relations": [{"name": "author", "type": "belongsTo", "model": "User"}]}),
            "conflicting_declaration",
        ),
        (
            json!({"name": "Post", "attributes": [
                {"name": "status", "type": "enum", "options": ["draft", "published"], "default": "archived"}
            ]}),
            "invalid_field_value",
        ),
        (
            json!({"name": "Post", "attributes": [
                {"name": "title", "type": "string", "after": "nope"}
            ]}),
            "invalid_field_value",
        ),
    ];
    for (spec, kind) in cases {
        let c = component(spec.clone());
        let err = compile_component("Blog", &c, &registry(), CompileOptions::default())
            .expect_err(&spec.to_string());
        assert_eq!(err.kind(), kind, "{spec}");
        assert_eq!(err.entity(), "Post");
    }
}

#[test]
fn test_contradiction_fails_only_its_entity() {
    let spec: ModuleSpec = serde_json::from_value(json!({
        "components": [
            {"name": "Post", "attributes": [
                {"name": "title", "type": "string"},
                {"name": "title", "type": "text"}
            ]},
            {"name": "Tag", "attributes": [{"name": "name", "type": "string"}]}
        ]
    }))
    .unwrap();
    let out = compile_module("Blog", &spec, &registry(), CompileOptions::default());
    let entities: Vec<_> = out.descriptors.iter().map(|d| d.entity.as_str()).collect();
    assert_eq!(entities, ["Tag"]);
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].kind, "conflicting_declaration");
    assert!(out.diagnostics[0].message.contains("title"));
}
