//! # modmaker
//!
//! **modmaker** scaffolds modules for modular Laravel applications. A module is
//! either a set of clean stubs or compiled from a JSON/YAML module config that
//! declares entities with their attributes, relations and indexes.
//!
//! ## Overview
//!
//! The heart of the crate is a schema compiler. For every entity it produces:
//!
//! - migration schema-builder statements, with identity and timestamp columns
//!   inserted when the entity does not declare them
//! - the model's mass-assignable `$fillable` list
//! - relation methods whose targets are resolved across the current module,
//!   sibling modules and the application-wide models
//! - factory expressions for synthetic test data
//! - validation rules for the store request
//!
//! ## Architecture
//!
//! - **[`spec`]** - Module config loading (JSON or YAML)
//! - **[`compiler`]** - Attribute validation and the compilation stages
//! - **[`generator`]** - Askama templates and module orchestration
//! - **[`sequence`]** - Strictly increasing migration ordering keys
//! - **[`manifest`]** - Per-module entity registry driving the aggregate files
//! - **[`diagnostics`]** - Per-entity errors and warnings
//! - **[`config`]** - `modmaker.toml` and config file resolution
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `modmaker` command line
//!
//! ### Generation Flow
//!
//! ```text
//! modmaker make Blog --config blog.json
//!   │
//!   ├─ config::ProjectPaths::discover     modmaker.toml + env overrides
//!   ├─ spec::load_module_spec             ModuleSpec { components }
//!   ├─ generator::workspace               EntityRegistry from Modules/*/Models, app/Models
//!   ├─ compiler::compile_module           EntityDescriptor per entity, diagnostics
//!   ├─ generator (askama templates)       model, migration, controller, request, ...
//!   └─ manifest                           provider, routes, module seeder
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! modmaker setup
//! modmaker make Blog --config blog.json
//! modmaker inspect --config blog.json --entity Post
//! ```
//!
//! ## Compiling Without Writing
//!
//! ```rust
//! use modmaker::compiler::{compile_component, CompileOptions, EntityRegistry};
//! use modmaker::spec::ComponentSpec;
//! use serde_json::json;
//!
//! let post: ComponentSpec = serde_json::from_value(json!({
//!     "name": "Post",
//!     "attributes": [{"name": "title", "type": "string"}]
//! })).unwrap();
//! let registry = EntityRegistry::new("Blog");
//! let d = compile_component("Blog", &post, &registry, CompileOptions::default()).unwrap();
//! assert_eq!(d.schema_lines, ["$table->id();", "$table->string('title');", "$table->timestamps();"]);
//! assert_eq!(d.fillable, ["title"]);
//! ```

pub mod cli;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod generator;
pub mod logging;
pub mod manifest;
pub mod naming;
pub mod sequence;
pub mod spec;
