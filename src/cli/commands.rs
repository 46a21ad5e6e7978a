use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::compiler::{compile_module, CompileOptions, EntityDescriptor};
use crate::config::{GeneratorConfig, ProjectPaths, CONFIG_FILE};
use crate::diagnostics::{print_diagnostics, Diagnostic, Severity};
use crate::generator::{
    generate_module, workspace, ComponentSelection, GenerateOptions, GenerationMode,
    GenerationReport,
};
use crate::naming;
use crate::sequence::{ClockSequence, SystemClock};
use crate::spec::{load_module_spec, ModuleSpec};

const POST_EXAMPLE: &str = include_str!("../../demos/post.json");
const BLOG_EXAMPLE: &str = include_str!("../../demos/blog.json");

/// Command-line interface for modmaker
///
/// Scaffolds Laravel modules, either as clean stubs or compiled from a JSON/YAML
/// module config.
#[derive(Parser, Debug)]
#[command(name = "modmaker", version)]
#[command(about = "Laravel module scaffolding generator", long_about = None)]
pub struct Cli {
    /// Project root (the directory holding modmaker.toml)
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides MODMAKER_LOG_LEVEL
    #[arg(long, global = true, env = "MODMAKER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a module, or add components to an existing one
    ///
    /// Without options a clean module is created. With --config every component
    /// of the config is compiled and generated. Component flags add individual
    /// clean stubs to an existing module.
    Make {
        /// Module name (StudlyCase is applied)
        name: String,

        /// Module config (JSON or YAML), looked up in the module, shared and
        /// project config directories first
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Add the config's components to an existing module
        #[arg(long, default_value_t = false, requires = "config")]
        add: bool,

        /// Add a model (and its factory)
        #[arg(long, conflicts_with = "config")]
        model: Option<String>,

        /// Add a controller
        #[arg(long, conflicts_with = "config")]
        controller: Option<String>,

        /// Add a store request
        #[arg(long, conflicts_with = "config")]
        request: Option<String>,

        /// Add a service and its contract
        #[arg(long, conflicts_with = "config")]
        service: Option<String>,

        /// Add a repository and its contract
        #[arg(long, conflicts_with = "config")]
        repository: Option<String>,

        /// Add a migration (entity name or create_<table>_table)
        #[arg(long, conflicts_with = "config")]
        migration: Option<String>,

        /// Overwrite existing files
        #[arg(short, long, default_value_t = false)]
        force: bool,

        /// Show what would be written without touching the filesystem
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Fail entities whose relation or factory targets cannot be resolved
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Compile a module config and report problems without writing anything
    Check {
        /// Module config (JSON or YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Module name; defaults to the config's module_name or file name
        #[arg(short, long)]
        module: Option<String>,

        /// Show only errors (hide warnings and info)
        #[arg(long, default_value_t = false)]
        errors_only: bool,

        /// Exit with an error code if any entity fails to compile
        #[arg(long, default_value_t = false)]
        fail_on_error: bool,
    },
    /// Print the compiled descriptors of a module config as JSON
    Inspect {
        /// Module config (JSON or YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Module name; defaults to the config's module_name or file name
        #[arg(short, long)]
        module: Option<String>,

        /// Only print this entity
        #[arg(short, long)]
        entity: Option<String>,
    },
    /// Create the modules directory, publish example configs and a default modmaker.toml
    Setup {
        /// Overwrite previously published files
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Serialize)]
struct InspectOutput<'a> {
    module: &'a str,
    descriptors: Vec<&'a EntityDescriptor>,
    diagnostics: &'a [Diagnostic],
}

/// Run the parsed command line
///
/// # Errors
///
/// Returns an error when a command fails, or when `make` / `check --fail-on-error`
/// leaves entities that did not compile.
pub fn run_cli(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let paths = ProjectPaths::discover(&cli.root)?;
    match cli.command {
        Commands::Make {
            name,
            config,
            add,
            model,
            controller,
            request,
            service,
            repository,
            migration,
            force,
            dry_run,
            strict,
        } => {
            let selection = ComponentSelection {
                model,
                controller,
                request,
                service,
                repository,
                migration,
            };
            let mode = match config {
                Some(file) => {
                    let module = naming::studly(&name);
                    let path = paths.resolve_config_file(&module, &file);
                    let spec = load_module_spec(&path)?;
                    GenerationMode::Dynamic { spec, add }
                }
                None if selection.is_empty() => GenerationMode::Clean,
                None => GenerationMode::Components(selection),
            };
            let options = GenerateOptions {
                force,
                dry_run,
                strict,
            };
            let mut sequence = ClockSequence::new(SystemClock);
            let report = generate_module(&paths, &name, mode, options, &mut sequence)?;
            print_report(&report);
            if report.has_errors() {
                let failed = report.diagnostics.iter().filter(|d| d.is_error()).count();
                return Err(anyhow::anyhow!("{failed} entity(ies) were not generated").into());
            }
            Ok(())
        }
        Commands::Check {
            config,
            module,
            errors_only,
            fail_on_error,
        } => {
            let (module, spec) = load_for_module(&paths, &config, module.as_deref())?;
            let registry = workspace::build_registry(&paths, &module)?;
            let compilation = compile_module(&module, &spec, &registry, CompileOptions::default());
            println!(
                "🔍 Checked module {module}: {} entity(ies) compiled",
                compilation.descriptors.len()
            );

            let shown: Vec<Diagnostic> = if errors_only {
                compilation
                    .diagnostics
                    .iter()
                    .filter(|d| d.severity == Severity::Error)
                    .cloned()
                    .collect()
            } else {
                compilation.diagnostics.clone()
            };
            print_diagnostics(&shown);
            if fail_on_error && compilation.has_errors() {
                return Err(anyhow::anyhow!("module config has errors").into());
            }
            Ok(())
        }
        Commands::Inspect {
            config,
            module,
            entity,
        } => {
            let (module, spec) = load_for_module(&paths, &config, module.as_deref())?;
            let registry = workspace::build_registry(&paths, &module)?;
            let compilation = compile_module(&module, &spec, &registry, CompileOptions::default());
            let wanted = entity.as_deref().map(naming::studly);
            let descriptors: Vec<&EntityDescriptor> = compilation
                .descriptors
                .iter()
                .filter(|d| wanted.as_deref().is_none_or(|w| d.entity == w))
                .collect();
            if let Some(w) = &wanted {
                if descriptors.is_empty() {
                    return Err(anyhow::anyhow!("No compiled entity named '{w}'").into());
                }
            }
            let output = InspectOutput {
                module: &module,
                descriptors,
                diagnostics: &compilation.diagnostics,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Commands::Setup { force } => {
            setup(&paths, force)?;
            Ok(())
        }
    }
}

/// Resolve and load a module config for `check` / `inspect`.
fn load_for_module(
    paths: &ProjectPaths,
    file: &Path,
    module: Option<&str>,
) -> anyhow::Result<(String, ModuleSpec)> {
    let file_module = file
        .file_stem()
        .and_then(|s| s.to_str())
        .map(naming::studly)
        .unwrap_or_default();
    let lookup = module.map(naming::studly).unwrap_or(file_module);
    let spec = load_module_spec(&paths.resolve_config_file(&lookup, file))?;
    let name = module
        .map(naming::studly)
        .or_else(|| spec.module_name.as_deref().map(naming::studly))
        .unwrap_or(lookup);
    Ok((name, spec))
}

fn print_report(report: &GenerationReport) {
    let verb = if report.dry_run { "planned" } else { "written" };
    println!(
        "\n📦 Module {} ({}): {} file(s) {verb}, {} skipped",
        report.module,
        report.module_dir.display(),
        report.written.len(),
        report.skipped.len()
    );
    if !report.entities.is_empty() {
        println!("   Entities: {}", report.entities.join(", "));
    }
    if !report.skipped.is_empty() {
        println!("   Use --force to overwrite skipped files.");
    }
    if !report.diagnostics.is_empty() {
        print_diagnostics(&report.diagnostics);
    }
}

fn publish(path: &Path, contents: &str, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        println!("⚠️  Skipping existing file: {}", path.display());
        return Ok(());
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("✅ Published {}", path.display());
    Ok(())
}

/// Create the modules and shared config directories and publish examples.
pub fn setup(paths: &ProjectPaths, force: bool) -> anyhow::Result<()> {
    let shared = paths.shared_config_dir();
    fs::create_dir_all(&shared)
        .with_context(|| format!("Failed to create directory: {}", shared.display()))?;
    publish(&shared.join("post.json"), POST_EXAMPLE, force)?;
    publish(&shared.join("blog.json"), BLOG_EXAMPLE, force)?;
    publish(
        &paths.root.join(CONFIG_FILE),
        &GeneratorConfig::default().to_toml()?,
        force,
    )?;
    tracing::info!(modules = %paths.modules_dir().display(), "setup complete");
    Ok(())
}
