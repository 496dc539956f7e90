use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::projection::ExtremesPolicy;

pub const ENV_API_KEY: &str = "FORECAST_API_KEY";
pub const ENV_BASE_URL: &str = "FORECAST_BASE_URL";
pub const ENV_LOCATION: &str = "FORECAST_LOCATION";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_location = "Centralia"
/// timeout_secs = 10
/// extremes = "zeroed"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Credential appended to every forecast request.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout; expiry surfaces as a transport error.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Location used when none is given on the command line.
    #[serde(default)]
    pub default_location: Option<String>,

    #[serde(default)]
    pub extremes: ExtremesPolicy,
}

fn default_base_url() -> String {
    "https://api.tomorrow.io".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            default_location: None,
            extremes: ExtremesPolicy::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast-strip", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Returns the API key, or an error telling the user how to set one.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `forecast configure` or set {ENV_API_KEY}."
                )
            })
    }

    /// Explicit location wins over the configured default.
    pub fn resolve_location(&self, explicit: Option<String>) -> Result<String> {
        explicit
            .or_else(|| self.default_location.clone())
            .filter(|loc| !loc.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No location given and no default location configured.\n\
                     Hint: pass a location or run `forecast configure`."
                )
            })
    }

    /// Overlay values from `lookup`, which maps variable names to values.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(location) = lookup(ENV_LOCATION) {
            self.default_location = Some(location);
        }
    }

    /// Overlay values from the process environment.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_env_overrides(|name| std::env::var(name).ok());
        self
    }
}
