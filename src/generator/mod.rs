//! # Generator Module
//!
//! Writes a Laravel module from compiled entity descriptors.
//!
//! ## Overview
//!
//! For every entity the generator renders:
//! - **Model** with `$fillable`, relation methods and factory hook
//! - **Migration** from the compiled schema lines
//! - **Controller**, **store request** (with derived validation rules),
//!   **service** and **repository** (each with its contract)
//! - **Factory** from the synthetic field expressions, plus **seeder** and **unit test**
//!
//! Module-wide files (service provider, `routes/api.php`, `routes/web.php`, the
//! module database seeder) are rendered from the module manifest, so entities
//! added later are merged in without editing earlier output.
//!
//! ## Architecture
//!
//! ```text
//! ModuleSpec → compiler::compile_module → EntityDescriptor → Askama templates → files
//! ```
//!
//! ## Generated Structure
//!
//! ```text
//! Modules/Blog/
//! ├── config/modmaker.json          # Module manifest
//! ├── Database/
//! │   ├── Factories/PostFactory.php
//! │   ├── Migrations/2025_03_14_093000_00_create_posts_table.php
//! │   └── Seeders/{PostSeeder,BlogDatabaseSeeder}.php
//! ├── Http/
//! │   ├── Controllers/PostController.php
//! │   └── Requests/PostStoreRequest.php
//! ├── Models/Post.php
//! ├── Providers/BlogServiceProvider.php
//! ├── Repositories/{PostRepository.php, Contracts/PostRepositoryInterface.php}
//! ├── Services/{PostService.php, Contracts/PostServiceInterface.php}
//! ├── resources/{views,lang}/
//! ├── routes/{api.php, web.php}
//! └── Tests/Unit/PostTest.php
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use modmaker::config::ProjectPaths;
//! use modmaker::generator::{generate_module, GenerateOptions, GenerationMode};
//! use modmaker::sequence::{ClockSequence, SystemClock};
//!
//! # fn main() -> anyhow::Result<()> {
//! let paths = ProjectPaths::discover(".")?;
//! let mut sequence = ClockSequence::new(SystemClock);
//! let report = generate_module(
//!     &paths,
//!     "Blog",
//!     GenerationMode::Clean,
//!     GenerateOptions::default(),
//!     &mut sequence,
//! )?;
//! println!("{} files written", report.written.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Template Customization
//!
//! Templates live in `templates/` as `*.php.txt` and are compiled in by Askama.
//! The clean and dynamic stub sets share templates; `is_clean` switches the
//! parts that differ.

mod project;
mod templates;

pub use project::*;
pub use templates::*;
