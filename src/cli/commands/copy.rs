use clap::Args;
use crm_record_copy::RequestOption;
use std::path::PathBuf;

#[derive(Args)]
pub struct CopyArgs {
    /// Template filter driving the copy
    #[arg(short = 'F', long)]
    pub filter: String,
    /// Record to copy (e.g. FI.x1234-5678)
    #[arg(short, long)]
    pub source: String,
    /// Existing record to copy the dependent records under
    #[arg(short, long)]
    pub destination: Option<String>,
    /// Fixture file with configuration and records (TOML or JSON)
    #[arg(short, long)]
    pub fixture: Option<PathBuf>,
    /// Filter parameter as NAME=VALUE, may be repeated
    #[arg(short, long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,
    /// Request option (online, offline, fastest, prefer-online, prefer-offline)
    #[arg(short, long)]
    pub request_option: Option<RequestOption>,
    /// Treat fixture results as server responses
    #[arg(long)]
    pub server_mode: bool,
    /// Pretty print the output
    #[arg(long)]
    pub pretty: bool,
}
