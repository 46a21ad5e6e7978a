//! # Compiler
//!
//! The schema compiler at the heart of modmaker. It turns a loosely-typed
//! component description (attributes, relations, indexes) into everything the
//! templates render:
//!
//! - schema-builder statements for the migration ([`schema`])
//! - the model's `$fillable` list ([`fillable`])
//! - relation methods with resolved targets and imports ([`relation`])
//! - factory expressions ([`synthetic`])
//! - store-request validation rules ([`rules`])
//!
//! ## Flow
//!
//! ```text
//! raw attributes ─► attribute::validate ─┬─► schema::compile_validated
//!                                        ├─► fillable::project
//!                                        ├─► synthetic::resolve_all ◄─┐
//!                                        └─► rules::derive            │
//! raw relations ──► relation::parse ─────► relation::compile_one ─────┤
//!                                                                     │
//!                               resolve::EntityRegistry ──────────────┘
//! ```
//!
//! [`descriptor::compile_component`] runs the whole pipeline for one entity and
//! [`descriptor::compile_module`] for a module config, isolating failures per
//! entity.
//!
//! All stages are pure: the same input always produces the same output.

pub mod attribute;
pub mod column_type;
pub mod descriptor;
mod error;
pub mod fillable;
pub mod php;
pub mod relation;
pub mod resolve;
pub mod rules;
pub mod schema;
pub mod synthetic;

pub use attribute::{validate, AttributeSpec, DefaultValue, ReferentialAction};
pub use column_type::{ColumnType, Family, Field};
pub use descriptor::{
    compile_component, compile_module, CompileOptions, EntityDescriptor, ModuleCompilation,
};
pub use error::{AttributeError, CompileError, RelationError};
pub use relation::{CompiledRelationMethod, RelationKind, RelationSpec};
pub use resolve::{EntityRegistry, Resolution, Tier};
pub use schema::{CompiledSchema, IndexKind, IndexSpec};
pub use synthetic::SyntheticExpression;
