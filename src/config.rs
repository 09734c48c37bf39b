//! Configuration for the ingestion pipeline and challenge sessions.
//!
//! Settings are stored as JSON. Every field has a default, so an empty object
//! (or no file at all) yields a working configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKGROUND, DEFAULT_CORPUS_FILENAME, DEFAULT_IMAGE_URL_PREFIX,
    FAILURE_MESSAGE_DURATION_MS,
};
use crate::ingest::{OutputFormat, ResizePolicy};

/// Log level setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Ingestion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// How source images are fitted into the canonical canvas
    #[serde(default)]
    pub resize_policy: ResizePolicy,

    /// RGB padding color for the `contain` policy
    #[serde(default = "default_background")]
    pub background: [u8; 3],

    /// Encoding of the normalized images
    #[serde(default)]
    pub output_format: OutputFormat,

    /// URL prefix recorded in each challenge's `imageUrl`
    #[serde(default = "default_image_url_prefix")]
    pub image_url_prefix: String,

    /// Corpus artifact filename inside the output directory
    #[serde(default = "default_corpus_filename")]
    pub corpus_filename: String,

    /// Keep going after a per-file failure (skipping that file)
    #[serde(default = "default_continue_on_error")]
    pub continue_on_error: bool,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_background() -> [u8; 3] {
    DEFAULT_BACKGROUND
}

fn default_image_url_prefix() -> String {
    DEFAULT_IMAGE_URL_PREFIX.to_string()
}

fn default_corpus_filename() -> String {
    DEFAULT_CORPUS_FILENAME.to_string()
}

fn default_continue_on_error() -> bool {
    true
}

impl IngestConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            resize_policy: ResizePolicy::default(),
            background: default_background(),
            output_format: OutputFormat::default(),
            image_url_prefix: default_image_url_prefix(),
            corpus_filename: default_corpus_filename(),
            continue_on_error: default_continue_on_error(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Read configuration from a file.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "clickproof-config.json"
    }

    /// Get the default config file path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("clickproof").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("clickproof")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<std::path::PathBuf, ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(&path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(path)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings for a challenge session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Host identity reported in every verification response
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Site key of the embedding page
    #[serde(default)]
    pub site_key: String,

    /// How long a failure message stays visible, in milliseconds
    #[serde(default = "default_failure_message_duration")]
    pub failure_message_duration_ms: u64,
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_failure_message_duration() -> u64 {
    FAILURE_MESSAGE_DURATION_MS
}

impl SessionConfig {
    /// Create a session configuration for a host.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Default::default()
        }
    }

    /// Get the failure message lifetime.
    pub fn failure_message_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.failure_message_duration_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            site_key: String::new(),
            failure_message_duration_ms: default_failure_message_duration(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
