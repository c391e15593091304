//! # Configuration Management Module
//!
//! Global configuration for the gamehall core. The global config is a TOML
//! file registering every known game type and the namespaces shared by all
//! instances:
//!
//! ```toml
//! data_dir = "./data"
//!
//! [worlds]
//! directory = "./worlds"
//! directory-label = "game"
//!
//! [logging]
//! level = "info"
//! file = "gamehall.log"
//!
//! [games.skywars]
//! layout = "skywars/layout.yml"
//! ```
//!
//! Per-game layout, coordinate-tag, and restoration documents are YAML and
//! live under `data_dir`; only their locations are configured here. The
//! config is immutable once loaded and re-read only on explicit reload.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory for game-type resources (layout files resolve
    /// relative to this).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Registered game types, keyed by game-type name.
    #[serde(default)]
    pub games: HashMap<String, GameTypeConfig>,
    #[serde(default)]
    pub worlds: WorldsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One registered game type: where its layout document lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameTypeConfig {
    /// Layout file path, relative to `data_dir`.
    pub layout: String,
}

/// Instance working-directory namespace.
///
/// Every running instance gets a directory named `<directory-label>_<id>`
/// under `directory`. The label doubles as the naming convention the
/// instance registry scans at startup to recover ids left behind by a
/// previous server run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldsConfig {
    pub directory: String,
    #[serde(rename = "directory-label")]
    pub directory_label: String,
}

impl Default for WorldsConfig {
    fn default() -> Self {
        Self {
            directory: "./worlds".to_string(),
            directory_label: "game".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

fn default_data_dir() -> String {
    "./data".to_string()
}

impl Config {
    /// Load configuration from a file.
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;
        config.validate()?;

        Ok(config)
    }

    /// Create a default configuration file.
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.worlds.directory_label.is_empty() {
            return Err(anyhow!("worlds.directory-label must not be empty"));
        }
        if self
            .worlds
            .directory_label
            .contains(&['/', '\\', '_'][..])
        {
            return Err(anyhow!(
                "worlds.directory-label must not contain '_' or path separators"
            ));
        }
        Ok(())
    }

    /// Resolve the layout file path for a game type, if one is registered.
    pub fn layout_path(&self, game: &str) -> Option<PathBuf> {
        self.games
            .get(game)
            .map(|g| PathBuf::from(&self.data_dir).join(&g.layout))
    }

    /// The directory holding per-instance working directories.
    pub fn worlds_dir(&self) -> PathBuf {
        PathBuf::from(&self.worlds.directory)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: default_data_dir(),
            games: HashMap::new(),
            worlds: WorldsConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("gamehall.log".to_string()),
            },
        }
    }
}
