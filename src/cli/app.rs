use super::commands::{ConfigCommands, CopyArgs, InspectArgs};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crm-copy")]
#[command(about = "Copy CRM record trees using template filters")]
pub struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy a record and its dependent records
    Copy(CopyArgs),
    /// Show the query-table tree of a template filter
    Inspect(InspectArgs),
    /// Configuration management
    Config(ConfigCommands),
}
