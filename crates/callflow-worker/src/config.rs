//! Worker configuration loading from file and environment variables.

use callflow_types::{AudioConfig, BuiltinAudioClip, NoiseCancellation, TurnDetection};
use callflow_voice::{LiveKitConfig, OpenAiConfig};
use serde::Deserialize;
use thiserror::Error;

/// Top-level worker configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// LiveKit server and credentials.
    #[serde(default)]
    pub livekit: LiveKitConfig,

    /// OpenAI-compatible speech and dialogue API.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Per-call session settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Background audio played while the agent is thinking.
    #[serde(default)]
    pub background_audio: BackgroundAudioConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Room the agent joins in `start` mode.
    #[serde(default = "default_room")]
    pub room: String,

    /// Participant identity of the agent.
    #[serde(default = "default_agent_identity")]
    pub agent_identity: String,

    /// Display name of the agent participant.
    #[serde(default = "default_agent_name")]
    pub agent_name: String,

    /// Inbound noise cancellation. Use `off` for self-hosted servers without it.
    #[serde(default)]
    pub noise_cancellation: NoiseCancellationMode,

    #[serde(default)]
    pub turn_detection: TurnDetection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseCancellationMode {
    Off,
    #[default]
    Bvc,
    BvcTelephony,
}

impl NoiseCancellationMode {
    pub fn filter(self) -> Option<NoiseCancellation> {
        match self {
            Self::Off => None,
            Self::Bvc => Some(NoiseCancellation::Bvc),
            Self::BvcTelephony => Some(NoiseCancellation::BvcTelephony),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackgroundAudioConfig {
    /// Directory holding the raw PCM clip assets.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,

    /// Clips to choose from while thinking.
    #[serde(default = "default_thinking_sound")]
    pub thinking_sound: Vec<AudioConfig>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "callflow_agent=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_room() -> String {
    "callflow-demo".to_string()
}

fn default_agent_identity() -> String {
    "callflow-agent".to_string()
}

fn default_agent_name() -> String {
    "Member Services".to_string()
}

fn default_assets_dir() -> String {
    "assets/audio".to_string()
}

fn default_thinking_sound() -> Vec<AudioConfig> {
    vec![
        AudioConfig::new(BuiltinAudioClip::KeyboardTyping, 0.8),
        AudioConfig::new(BuiltinAudioClip::KeyboardTyping2, 0.7),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            room: default_room(),
            agent_identity: default_agent_identity(),
            agent_name: default_agent_name(),
            noise_cancellation: NoiseCancellationMode::default(),
            turn_detection: TurnDetection::default(),
        }
    }
}

impl Default for BackgroundAudioConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            thinking_sound: default_thinking_sound(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `LIVEKIT_URL`, `LIVEKIT_API_KEY`, `LIVEKIT_API_SECRET` override `[livekit]`
/// - `OPENAI_API_KEY`, `OPENAI_BASE_URL` override `[openai]`
/// - `CALLFLOW_ROOM` overrides `session.room`
/// - `CALLFLOW_LOG_LEVEL` overrides `logging.level`
/// - `CALLFLOW_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`], reading overrides through `env`.
pub fn load_config_with(
    path: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    if let Some(url) = env("LIVEKIT_URL") {
        config.livekit.url = url;
    }
    if let Some(key) = env("LIVEKIT_API_KEY") {
        config.livekit.api_key = key;
    }
    if let Some(secret) = env("LIVEKIT_API_SECRET") {
        config.livekit.api_secret = secret;
    }
    if let Some(key) = env("OPENAI_API_KEY") {
        config.openai.api_key = key;
    }
    if let Some(base_url) = env("OPENAI_BASE_URL") {
        config.openai.base_url = base_url;
    }
    if let Some(room) = env("CALLFLOW_ROOM").filter(|r| !r.trim().is_empty()) {
        config.session.room = room;
    }
    if let Some(level) = env("CALLFLOW_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = env("CALLFLOW_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}
