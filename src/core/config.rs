//! Startup configuration.
//!
//! The credential comes from the process environment (after loading `.env`
//! from the working directory). Model name, temperature and base URL default
//! to fixed values and may be overridden by a read-only `config.toml` in the
//! platform config directory. This module never writes files.

use std::env;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

pub const API_KEY_ENV: &str = "GROQ_API_KEY";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

/// Errors that stop the program before any chat interaction is served.
#[derive(Debug)]
pub enum ConfigurationError {
    /// The credential variable is unset or blank.
    MissingCredential { variable: &'static str },

    /// A `.env` file exists but could not be loaded.
    DotEnv(dotenvy::Error),

    /// Failed to read the settings file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`Settings`].
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A setting parsed but holds an unusable value.
    InvalidSetting { key: &'static str, message: String },
}

impl ConfigurationError {
    /// Follow-up advice printed under the error message.
    pub fn hint(&self) -> Option<String> {
        match self {
            ConfigurationError::MissingCredential { variable } => Some(format!(
                "Please make sure you have a .env file with your API key, e.g. {variable}=gsk_..."
            )),
            ConfigurationError::Parse { .. } | ConfigurationError::InvalidSetting { .. } => {
                Some("Fix or remove the settings file to fall back to the defaults.".to_string())
            }
            ConfigurationError::DotEnv(_) | ConfigurationError::Read { .. } => None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        2
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::MissingCredential { variable } => {
                write!(f, "{variable} not found in environment variables!")
            }
            ConfigurationError::DotEnv(err) => write!(f, "Failed to load .env file: {err}"),
            ConfigurationError::Read { path, source } => {
                write!(f, "Failed to read settings at {}: {source}", path.display())
            }
            ConfigurationError::Parse { path, source } => {
                write!(f, "Failed to parse settings at {}: {source}", path.display())
            }
            ConfigurationError::InvalidSetting { key, message } => {
                write!(f, "Invalid value for '{key}': {message}")
            }
        }
    }
}

impl Error for ConfigurationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigurationError::DotEnv(err) => Some(err),
            ConfigurationError::Read { source, .. } => Some(source),
            ConfigurationError::Parse { source, .. } => Some(source),
            ConfigurationError::MissingCredential { .. }
            | ConfigurationError::InvalidSetting { .. } => None,
        }
    }
}

/// Optional overrides read from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub base_url: Option<String>,
}

impl Settings {
    /// Loads settings from `path`. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Settings, ConfigurationError> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigurationError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "quillchat", "quillchat")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Everything needed to build the HTTP gateway.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Config {
    /// Loads `.env`, the optional settings file and the credential.
    pub fn load() -> Result<Config, ConfigurationError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env file"),
            Err(err) if err.not_found() => {}
            Err(err) => return Err(ConfigurationError::DotEnv(err)),
        }

        let settings = match Settings::default_path() {
            Some(path) => Settings::load_from_path(&path)?,
            None => Settings::default(),
        };

        Config::from_parts(env::var(API_KEY_ENV).ok(), settings)
    }

    /// Combines a credential and settings overrides, applying defaults.
    pub fn from_parts(
        api_key: Option<String>,
        settings: Settings,
    ) -> Result<Config, ConfigurationError> {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigurationError::MissingCredential {
                variable: API_KEY_ENV,
            })?;

        let model = match settings.model {
            Some(model) if model.trim().is_empty() => {
                return Err(ConfigurationError::InvalidSetting {
                    key: "model",
                    message: "must not be empty".to_string(),
                })
            }
            Some(model) => model,
            None => DEFAULT_MODEL.to_string(),
        };

        let temperature = settings.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        if !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(ConfigurationError::InvalidSetting {
                key: "temperature",
                message: format!(
                    "{temperature} is outside {}..={}",
                    TEMPERATURE_RANGE.start(),
                    TEMPERATURE_RANGE.end()
                ),
            });
        }

        let base_url = settings
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Config {
            api_key,
            model,
            temperature,
            base_url,
        })
    }
}
