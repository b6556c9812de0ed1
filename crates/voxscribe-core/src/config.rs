//! Configuration management for voxscribe.
//!
//! Loads configuration from ${VOXSCRIBE_HOME}/config.toml with sensible defaults.
//! Secrets may be left out of the file and supplied through the environment;
//! that fallback is resolved by the bot when it builds its runtime settings.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Telegram bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token for the Telegram Bot API.
    pub bot_token: Option<String>,
    /// Public URL registered with `setWebhook`.
    pub webhook_url: Option<String>,
}

/// HTTP server configuration (webhook endpoint and liveness probe).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: Option<u16>,
}

/// Speech-to-text provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// AssemblyAI API key
    pub api_key: Option<String>,
    /// Override for the AssemblyAI API base URL
    pub base_url: Option<String>,
    /// Speech model selector sent with each transcript request
    pub speech_model: String,
    /// Delay between transcript status polls, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            speech_model: Config::DEFAULT_SPEECH_MODEL.to_string(),
            poll_interval_ms: Config::DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl TranscriptionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Operator alert email configuration.
///
/// Alerts are enabled only when `user`, `password` and `recipient` are all present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub user: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
    /// Well-known mail service name used to pick the SMTP relay ("gmail", "outlook", "yahoo").
    pub service: Option<String>,
    /// Explicit SMTP relay host; wins over `service`.
    pub smtp_host: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub transcription: TranscriptionConfig,

    #[serde(default)]
    pub email: EmailConfig,
}

impl Config {
    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_SPEECH_MODEL: &str = "universal";
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
    pub const DEFAULT_EMAIL_SERVICE: &str = "gmail";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the commented default template to `path`, creating parent directories.
    ///
    /// # Errors
    /// Fails if the file already exists (no silent overwrite) or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            bail!("Config file already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

/// Returns the default config template with comments.
///
/// Embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for voxscribe configuration.
    //!
    //! VOXSCRIBE_HOME resolution order:
    //! 1. VOXSCRIBE_HOME environment variable (if set)
    //! 2. ~/.config/voxscribe (default)
    //! 3. ./.voxscribe when no home directory can be determined

    use std::path::PathBuf;

    pub fn voxscribe_home() -> PathBuf {
        if let Ok(home) = std::env::var("VOXSCRIBE_HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".voxscribe"),
            |h| h.join(".config").join("voxscribe"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        voxscribe_home().join("config.toml")
    }
}
