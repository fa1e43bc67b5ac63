use crate::cli::commands::ConfigSubcommands;
use anyhow::{Context, Result};
use crm_record_copy::config::Config;
use std::path::Path;

/// Handle the config subcommands; `path` is where the config is stored
pub async fn config_command(command: ConfigSubcommands, mut config: Config, path: &Path) -> Result<()> {
    match command {
        ConfigSubcommands::Show => {
            let content =
                toml::to_string_pretty(&config).context("Failed to serialize config to TOML")?;
            println!("{}", content);
        }
        ConfigSubcommands::Path => {
            println!("{}", path.display());
        }
        ConfigSubcommands::SetRequestOption { option } => {
            config.set_request_option(option);
            config.save_to(path)?;
            println!("Set request option to {}", option);
        }
        ConfigSubcommands::SetFixture { path: fixture } => {
            if !fixture.exists() {
                println!("Warning: fixture {:?} does not exist yet", fixture);
            }
            config.default_fixture = Some(fixture.clone());
            config.save_to(path)?;
            println!("Set default fixture to {}", fixture.display());
        }
    }

    Ok(())
}
