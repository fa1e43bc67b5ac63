use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct InspectArgs {
    /// Template filter to show
    #[arg(short = 'F', long)]
    pub filter: String,
    /// Fixture file with configuration and records (TOML or JSON)
    #[arg(short, long)]
    pub fixture: Option<PathBuf>,
}
