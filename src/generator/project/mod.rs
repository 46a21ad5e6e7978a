mod generate;
pub mod workspace;

pub use generate::{
    entity_from_component, entity_from_migration, generate_module, ComponentSelection,
    GenerateOptions, GenerationMode, GenerationReport, MODULE_FOLDERS,
};
