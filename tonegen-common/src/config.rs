//! Bootstrap configuration loading
//!
//! Configuration sources, highest priority first:
//! 1. Explicit config file path (`--config` or `TONEGEN_CONFIG`)
//! 2. Platform config file (`<config dir>/tonegen/config.toml`)
//! 3. Built-in defaults
//!
//! Only the session schedule and logging are configurable. Tone parameters
//! (table size, per-channel phase steps) are fixed in code.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Sample rates exercised by default, in order
pub const DEFAULT_SAMPLE_RATES: [u32; 2] = [44_100, 48_000];

/// Frames per callback invocation
pub const DEFAULT_FRAMES_PER_BUFFER: u32 = 64;

/// Seconds of playback per sample rate
pub const DEFAULT_PLAY_DURATION_SECS: u64 = 5;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Playback schedule
    #[serde(default)]
    pub session: SessionSettings,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Playback schedule settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSettings {
    /// Target sample rates, played in order
    #[serde(default = "default_sample_rates")]
    pub sample_rates: Vec<u32>,

    /// Frames the engine requests per callback
    #[serde(default = "default_frames_per_buffer")]
    pub frames_per_buffer: u32,

    /// How long each rate plays before the stream is torn down
    #[serde(default = "default_play_duration_secs")]
    pub play_duration_secs: u64,

    /// Ask the host to switch the device's nominal rate instead of resampling
    /// (only honored by hosts that support it)
    #[serde(default = "default_true")]
    pub hardware_rate_negotiation: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_sample_rates() -> Vec<u32> {
    DEFAULT_SAMPLE_RATES.to_vec()
}

fn default_frames_per_buffer() -> u32 {
    DEFAULT_FRAMES_PER_BUFFER
}

fn default_play_duration_secs() -> u64 {
    DEFAULT_PLAY_DURATION_SECS
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            sample_rates: default_sample_rates(),
            frames_per_buffer: default_frames_per_buffer(),
            play_duration_secs: default_play_duration_secs(),
            hardware_rate_negotiation: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SessionSettings {
    /// Playback duration per sample rate
    pub fn play_duration(&self) -> Duration {
        Duration::from_secs(self.play_duration_secs)
    }
}

impl TomlConfig {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Reject schedules the session controller cannot run
    pub fn validate(&self) -> Result<()> {
        let session = &self.session;

        if session.sample_rates.is_empty() {
            return Err(Error::Config("session.sample_rates must not be empty".to_string()));
        }
        if let Some(rate) = session.sample_rates.iter().find(|&&rate| rate == 0) {
            return Err(Error::Config(format!("Invalid sample rate: {}", rate)));
        }
        if session.frames_per_buffer == 0 {
            return Err(Error::Config("session.frames_per_buffer must be positive".to_string()));
        }

        match self.logging.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(Error::Config(format!("Unknown log level '{}'", other))),
        }
    }
}

/// Platform config file location (`~/.config/tonegen/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tonegen").join("config.toml"))
}

/// Pick the config file to load, if any
///
/// An explicit path always wins, even when it does not exist (loading it then
/// fails loudly). The platform file is only used when present.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    default_config_path().filter(|path| path.exists())
}

/// Load configuration from the resolved path, or fall back to built-in defaults
pub fn load_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(explicit) {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            TomlConfig::load(&path)
        }
        None => {
            debug!("No config file found, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}
