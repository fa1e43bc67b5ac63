use crate::copy::{LogLevel, MonitoringConfig};
use crate::crm::RequestOption;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CopySettings {
    #[serde(default)]
    pub request_option: RequestOption,
    #[serde(default = "default_true")]
    pub apply_default_values: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    #[serde(default = "default_true")]
    pub structured_events: bool,
    #[serde(default = "default_true")]
    pub correlation_ids: bool,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub default_fixture: Option<PathBuf>,
    #[serde(default)]
    pub copy: CopySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

impl Default for CopySettings {
    fn default() -> Self {
        Self {
            request_option: RequestOption::default(),
            apply_default_values: default_true(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            structured_events: default_true(),
            correlation_ids: default_true(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            // Use XDG config directory on Linux
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("crm-record-copy")
        } else {
            // Use home directory with dot prefix on Windows/Mac
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".crm-record-copy")
        };

        Ok(config_dir.join("config.toml"))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, using default config");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        debug!(
            "Loaded config: request option {}, log level {:?}",
            config.copy.request_option, config.logging.level
        );
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        debug!("Saving config to: {:?}", config_path);

        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir)
                    .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
                info!("Created config directory: {:?}", config_dir);
            }
        }

        let config_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Config saved successfully");
        Ok(())
    }

    pub fn set_request_option(&mut self, request_option: RequestOption) {
        info!("Updating default request option to: {}", request_option);
        self.copy.request_option = request_option;
    }

    /// Logger settings for copy runs
    pub fn monitoring_config(&self) -> MonitoringConfig {
        MonitoringConfig {
            correlation_ids: self.logging.correlation_ids,
            step_logging: self.logging.structured_events,
            log_level: self.logging.level,
        }
    }
}
