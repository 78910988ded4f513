//! Scytale configuration
//!
//! Stored as YAML at `~/.config/scytale/config.yaml`. A missing file
//! means defaults; environment variables override whatever was loaded:
//!
//! | Variable           | Field       |
//! |--------------------|-------------|
//! | `SCYTALE_ALPHABET` | `alphabet`  |
//! | `SCYTALE_TRACE`    | `trace`     |
//! | `SCYTALE_LOG`      | `log_level` |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use scytale_core::AlphabetId;

pub const ENV_ALPHABET: &str = "SCYTALE_ALPHABET";
pub const ENV_TRACE: &str = "SCYTALE_TRACE";
pub const ENV_LOG: &str = "SCYTALE_LOG";

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScytaleConfig {
    /// Alphabet for the letter ciphers
    pub alphabet: AlphabetId,

    /// Show the step table by default
    pub trace: bool,

    /// Level for the `scytale` log target
    pub log_level: String,

    /// Default Playfair grid (`ru` or `en`)
    pub playfair: String,

    /// Default Polybius layout (`ru32`, `ru30` or `en25`)
    pub polybius: String,
}

impl Default for ScytaleConfig {
    fn default() -> Self {
        Self {
            alphabet: AlphabetId::default(),
            trace: false,
            log_level: "info".to_string(),
            playfair: "ru".to_string(),
            polybius: "ru32".to_string(),
        }
    }
}

impl ScytaleConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scytale")
            .join("config.yaml")
    }

    /// Read `path`, or defaults when it doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ScytaleConfig = serde_yaml::from_str(&content)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` (or the default location) and apply the environment
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        let mut config = Self::load(&path)?;
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_ALPHABET) {
            self.alphabet = value.parse::<AlphabetId>().map_err(|reason| ConfigError::Invalid {
                key: ENV_ALPHABET.to_string(),
                reason,
            })?;
        }
        if let Some(value) = lookup(ENV_TRACE) {
            self.trace = value != "false" && value != "0";
        }
        if let Some(value) = lookup(ENV_LOG) {
            self.log_level = value;
        }
        Ok(())
    }

    /// Write atomically: temp file, then rename
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;

        let temp_path = path.with_extension("yaml.tmp");
        std::fs::write(&temp_path, &content)?;
        std::fs::rename(&temp_path, path)?;

        tracing::info!("saved config to {}", path.display());
        Ok(())
    }

    /// `EnvFilter` directive for this config
    pub fn log_directive(&self) -> String {
        format!("scytale={}", self.log_level)
    }
}
