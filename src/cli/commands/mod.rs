pub mod config;
pub mod copy;
pub mod inspect;

pub use config::{ConfigCommands, ConfigSubcommands};
pub use copy::CopyArgs;
pub use inspect::InspectArgs;
