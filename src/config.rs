use crate::conversation::DEFAULT_SYSTEM_PROMPT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "http://localhost:8787";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Main application configuration, loaded from `~/.advisor/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the answering service.
    pub endpoint: String,

    /// Timeout for the single request/response round-trip, in seconds.
    pub request_timeout_secs: u64,

    /// Optional persona override for the leading system turn.
    pub system_prompt: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            system_prompt: None,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration, writing a default config file on first run so
    /// the user has something to edit.
    pub fn load_or_init() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }
        Self::load()
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to the given path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// The `~/.advisor` directory.
    pub fn advisor_home() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".advisor"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::advisor_home()?.join("config.toml"))
    }

    /// Log file path; stderr belongs to the TUI, so logs go here.
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::advisor_home()?.join("advisor.log"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The persona for the leading system turn.
    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }
}
