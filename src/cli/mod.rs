//! # CLI Module
//!
//! Command-line interface of the `modmaker` binary.
//!
//! ## Commands
//!
//! ### `make`
//!
//! Create a module or add to one:
//!
//! ```bash
//! modmaker make Blog                          # clean module
//! modmaker make Blog --config blog.json       # compiled from a module config
//! modmaker make Blog --config tags.yaml --add # add components to Blog
//! modmaker make Blog --controller PostController --service Post
//! ```
//!
//! Options:
//! - `--config <FILE>` - Module config (JSON or YAML)
//! - `--add` - Add the config's components to an existing module
//! - `--model/--controller/--request/--service/--repository/--migration <NAME>` -
//!   Individual clean stubs in an existing module
//! - `--force` - Overwrite existing files
//! - `--dry-run` - Report planned writes only
//! - `--strict` - Fail entities with unresolved relation targets
//!
//! ### `check`
//!
//! Compile a module config and print diagnostics grouped by severity:
//!
//! ```bash
//! modmaker check --config blog.json --fail-on-error
//! ```
//!
//! ### `inspect`
//!
//! Print compiled descriptors (schema lines, fillable, relation methods,
//! factory expressions, request rules) as JSON:
//!
//! ```bash
//! modmaker inspect --config blog.json --entity Post
//! ```
//!
//! ### `setup`
//!
//! Create the modules directory and publish `post.json`, `blog.json` and a
//! default `modmaker.toml`.
//!
//! ## Global Flags
//!
//! - `--root <DIR>` - Project root (default `.`)
//! - `--log-level <LEVEL>` - Overrides `MODMAKER_LOG_LEVEL`
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use modmaker::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! run_cli(cli)?;
//! ```

mod commands;


pub use commands::{run_cli, setup, Cli, Commands};
