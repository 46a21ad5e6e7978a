use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw attribute, relation or index record.
///
/// Kept untyped so the compiler can report unknown and illegal keys itself
/// instead of serde rejecting the whole document.
pub type RawRecord = Map<String, Value>;

/// One entity of a module config.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ComponentSpec {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<RawRecord>,
    #[serde(default)]
    pub relations: Vec<RawRecord>,
    #[serde(default)]
    pub indexes: Vec<RawRecord>,
}

impl ComponentSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            relations: Vec::new(),
            indexes: Vec::new(),
        }
    }
}

/// A module config document.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ModuleSpec {
    /// Module name; the CLI argument wins when both are given.
    #[serde(default)]
    pub module_name: Option<String>,
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}
