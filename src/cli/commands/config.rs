use clap::{Args, Subcommand};
use crm_record_copy::RequestOption;
use std::path::PathBuf;

#[derive(Args)]
pub struct ConfigCommands {
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Show current configuration
    Show,
    /// Print the config file location
    Path,
    /// Set the default request option
    SetRequestOption {
        /// online, offline, fastest, prefer-online or prefer-offline
        option: RequestOption,
    },
    /// Set the fixture used when --fixture is not given
    SetFixture {
        /// Path to the fixture file
        path: PathBuf,
    },
}
