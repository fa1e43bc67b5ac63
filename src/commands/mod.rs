pub mod config;
pub mod copy;
pub mod inspect;

pub use config::config_command;
pub use copy::copy_command;
pub use inspect::inspect_command;

use anyhow::{Context, Result};
use crm_record_copy::config::Config;
use crm_record_copy::{Fixture, OfflineStore};
use log::info;
use std::path::PathBuf;

/// Loads the fixture named on the command line, or the configured default
fn load_store(fixture: Option<PathBuf>, config: &Config) -> Result<OfflineStore> {
    let path = fixture
        .or_else(|| config.default_fixture.clone())
        .context("No fixture given. Pass --fixture or run 'crm-copy config set-fixture' first.")?;

    info!("Loading fixture: {:?}", path);
    let fixture =
        Fixture::load(&path).with_context(|| format!("Failed to load fixture {:?}", path))?;

    Ok(OfflineStore::new(fixture))
}
