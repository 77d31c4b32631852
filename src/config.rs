//! Service configuration.
//!
//! Loads `envmon.toml`, then applies environment overrides for the two
//! provider API keys. Configuration is an explicit struct constructed once
//! at startup and handed to whatever needs it; nothing reads the
//! environment ad hoc after that.

use serde::Deserialize;
use std::path::Path;

use crate::logging::LogLevel;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "./envmon.toml";

/// Environment variable overriding `[moenv] api_key`.
pub const MOENV_KEY_VAR: &str = "MOENV_API_KEY";

/// Environment variable overriding `[cwa] api_key`.
pub const CWA_KEY_VAR: &str = "CWA_API_KEY";

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub moenv: ProviderConfig,
    pub cwa: ProviderConfig,
    pub poll: PollConfig,
    pub log: LogConfig,
}

/// Credentials for one provider.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
}

/// Per-dataset poll periods for `--watch` mode, in seconds.
///
/// Defaults follow each dataset's publication cadence: air quality hourly
/// but checked often, the acid rain analysis daily, the rest in between.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub air_quality_secs: u64,
    pub acid_rain_secs: u64,
    pub uv_secs: u64,
    pub forecast_secs: u64,
    pub quake_secs: u64,
    pub rise_set_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            air_quality_secs: 60,
            acid_rain_secs: 86_400,
            uv_secs: 300,
            forecast_secs: 300,
            quake_secs: 300,
            rise_set_secs: 3_600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

impl LogConfig {
    /// The configured minimum level; unrecognized names fall back to Info.
    pub fn min_level(&self) -> LogLevel {
        LogLevel::parse(&self.level).unwrap_or(LogLevel::Info)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Io(String),
    /// The configuration file is not valid TOML for this schema.
    Parse(String),
    /// A required API key is configured neither in the file nor in the
    /// named environment variable.
    MissingApiKey(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Failed to read configuration: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::MissingApiKey(var) => {
                write!(
                    f,
                    "No API key configured: set {} or add it to {}",
                    var, DEFAULT_CONFIG_PATH
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Config::parse(&raw)
    }

    /// Loads the file if it exists, defaults otherwise.
    ///
    /// Used for the implicit [`DEFAULT_CONFIG_PATH`]; a missing file is
    /// fine there because the API keys can come from the environment. An
    /// explicitly passed `--config` path goes through [`Config::load`],
    /// where a missing file is an error.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        if path.exists() {
            Config::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Parses configuration from TOML text.
    pub fn parse(raw: &str) -> Result<Config, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies `MOENV_API_KEY` / `CWA_API_KEY` from the process environment.
    ///
    /// Call after `dotenv` has populated the environment. Environment wins
    /// over the file so deployments can rotate keys without editing
    /// configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_from(std::env::vars());
    }

    /// Same as [`Config::apply_env_overrides`] with an injected variable
    /// set, so override precedence is testable.
    pub fn apply_env_from<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                MOENV_KEY_VAR => self.moenv.api_key = Some(value),
                CWA_KEY_VAR => self.cwa.api_key = Some(value),
                _ => {}
            }
        }
    }

    /// The MOENV key, or an error naming how to provide one.
    pub fn require_moenv_key(&self) -> Result<&str, ConfigError> {
        self.moenv
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey(MOENV_KEY_VAR))
    }

    /// The CWA key, or an error naming how to provide one.
    pub fn require_cwa_key(&self) -> Result<&str, ConfigError> {
        self.cwa
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey(CWA_KEY_VAR))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
