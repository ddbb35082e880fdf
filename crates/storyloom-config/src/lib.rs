use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config at {config_path}: {reason}")]
    ConfigInvalid { config_path: PathBuf, reason: String },
}

/// Settings shared by the storyloom front ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// JSON file holding the story bible's entity directory.
    pub bible_path: PathBuf,
    #[serde(default = "default_reference_trigger")]
    pub reference_trigger: char,
    #[serde(default = "default_command_trigger")]
    pub command_trigger: char,
    /// Rows shown in a suggestion menu.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_reference_trigger() -> char {
    '['
}

fn default_command_trigger() -> char {
    '/'
}

fn default_page_size() -> usize {
    5
}

impl Config {
    pub fn new(bible_path: impl Into<PathBuf>) -> Self {
        Self {
            bible_path: bible_path.into(),
            reference_trigger: default_reference_trigger(),
            command_trigger: default_command_trigger(),
            page_size: default_page_size(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config
            .validate()
            .map_err(|reason| ConfigError::ConfigInvalid {
                config_path: config_path.to_path_buf(),
                reason,
            })?;

        // Expand shell variables and tilde in the bible path
        config.bible_path = Self::expand_path(&config.bible_path).unwrap_or(config.bible_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/storyloom");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Trigger characters must be distinct and visible, and a menu must
    /// show at least one row.
    fn validate(&self) -> Result<(), String> {
        for c in [self.reference_trigger, self.command_trigger] {
            if c.is_whitespace() || c.is_control() {
                return Err(format!("trigger {c:?} is not a visible character"));
            }
        }
        if self.reference_trigger == self.command_trigger {
            return Err("reference and command triggers are the same".to_string());
        }
        if self.page_size == 0 {
            return Err("page_size must be at least 1".to_string());
        }
        Ok(())
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
