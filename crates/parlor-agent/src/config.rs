//! Agent configuration loading from file and environment variables.

use parlor_types::ProviderSelection;
use serde::Deserialize;
use thiserror::Error;

/// Top-level agent configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Room and greeting settings.
    #[serde(default)]
    pub room: RoomConfig,

    /// Speech-provider selection, resolved once at startup.
    #[serde(default)]
    pub providers: ProviderSelection,

    /// Prompt material directories.
    #[serde(default)]
    pub prompts: PromptConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Room settings for the session.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomConfig {
    /// Name of the LiveKit room hosting the session.
    #[serde(default = "default_room_name")]
    pub name: String,

    /// Instruction handed to the voice pipeline for the opening turn.
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

/// Prompt directory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    /// Directory of instruction files (`*.txt`).
    #[serde(default = "default_instructions_dir")]
    pub instructions_dir: String,

    /// Directory of knowledge files (`*.txt`).
    #[serde(default = "default_knowledge_dir")]
    pub knowledge_dir: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "parlor_agent=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_room_name() -> String {
    "parlor-session".to_string()
}

fn default_greeting() -> String {
    "Greet the user warmly and offer your help.".to_string()
}

fn default_instructions_dir() -> String {
    "docs/instructions".to_string()
}

fn default_knowledge_dir() -> String {
    "docs/knowledge".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            name: default_room_name(),
            greeting: default_greeting(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            instructions_dir: default_instructions_dir(),
            knowledge_dir: default_knowledge_dir(),
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
/// - `PARLOR_ROOM` overrides `room.name`
/// - `PARLOR_GREETING` overrides `room.greeting`
/// - `PARLOR_INSTRUCTIONS_DIR` overrides `prompts.instructions_dir`
/// - `PARLOR_KNOWLEDGE_DIR` overrides `prompts.knowledge_dir`
/// - `PARLOR_LOG_LEVEL` overrides `logging.level`
/// - `PARLOR_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
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

    // Environment variable overrides
    if let Ok(room) = std::env::var("PARLOR_ROOM") {
        config.room.name = room;
    }
    if let Ok(greeting) = std::env::var("PARLOR_GREETING") {
        config.room.greeting = greeting;
    }
    if let Ok(dir) = std::env::var("PARLOR_INSTRUCTIONS_DIR") {
        config.prompts.instructions_dir = dir;
    }
    if let Ok(dir) = std::env::var("PARLOR_KNOWLEDGE_DIR") {
        config.prompts.knowledge_dir = dir;
    }
    if let Ok(level) = std::env::var("PARLOR_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("PARLOR_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}
