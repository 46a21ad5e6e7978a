use clap::Parser;
use modmaker::cli::{run_cli, Cli};
use modmaker::logging::{init_logging_with_config, LogConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if let Some(level) = &cli.log_level {
        log_config = log_config.with_level(level.as_str());
    }
    init_logging_with_config(&log_config)?;

    run_cli(cli)
}
