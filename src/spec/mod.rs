//! Module config documents: the declarative input of `modmaker make --config`.
//!
//! ```json
//! {
//!   "module_name": "Blog",
//!   "components": [
//!     {
//!       "name": "Post",
//!       "attributes": [{"name": "title", "type": "string"}],
//!       "relations": [{"name": "author", "type": "belongsTo", "model": "User"}],
//!       "indexes": [{"columns": ["title"], "type": "index"}]
//!     }
//!   ]
//! }
//! ```

mod load;
mod types;

pub use load::{load_module_spec, parse_module_spec};
pub use types::{ComponentSpec, ModuleSpec, RawRecord};
