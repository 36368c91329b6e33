//! Global configuration at ~/.config/calsync/config.toml.

use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;

/// Color assigned to event types created by the sync when the config
/// does not override it.
const DEFAULT_EVENT_COLOR: i32 = 0xFF9C27B0u32 as i32;

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_database() -> PathBuf {
    PathBuf::from("~/.local/share/calsync/events.db")
}

fn default_color() -> i32 {
    DEFAULT_EVENT_COLOR
}

/// Global configuration. Every key is optional; a missing config file
/// yields the defaults.
#[derive(Deserialize, Clone)]
pub struct GlobalConfig {
    /// Remote calendar feed to sync.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    /// SQLite database holding synced events.
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Color assigned to event types created by the sync.
    #[serde(default = "default_color")]
    pub default_color: i32,
}

impl GlobalConfig {
    pub fn load() -> Result<Self> {
        let config: GlobalConfig = Config::builder()
            .add_source(File::from(Self::config_path()?).required(false))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("calsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Database path with `~` expanded.
    pub fn database_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.database.to_string_lossy()).into_owned();
        PathBuf::from(expanded)
    }
}
