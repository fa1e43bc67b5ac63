use anyhow::Result;
use clap::Parser;
use crm_record_copy::config::Config;
use log::info;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => Config::get_config_path()?,
    };
    let config = Config::load_from(&config_path)?;

    init_logging(&config)?;
    info!("Starting crm-copy");

    match cli.command {
        Commands::Copy(args) => commands::copy_command(args, &config).await,
        Commands::Inspect(args) => commands::inspect_command(args, &config).await,
        Commands::Config(config_commands) => {
            commands::config_command(config_commands.command, config, &config_path).await
        }
    }
}

/// Logs go to stderr, or to the configured log file (truncated on each run).
/// RUST_LOG overrides the configured level.
fn init_logging(config: &Config) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(config.logging.level.to_level_filter());
    builder.parse_default_env();

    if let Some(log_path) = &config.logging.log_file {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }

    builder.init();
    Ok(())
}
