//! # Configuration Management
//!
//! Centralized configuration for the receiver.
//!
//! This module provides structured configuration for the listening
//! server, file storage, and logging, loadable from TOML files or
//! environment variables with validation for common misconfigurations.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-variable overrides via `from_env()`

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Max allowed inline message body (16 MB); larger declared
/// content-lengths are rejected before any allocation.
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Main configuration structure containing all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ReceiverConfig {
    /// Listening server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// File storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ReceiverConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    ///
    /// Every configurable setting has an override:
    /// `POSTLINE_SERVER_ADDRESS`, `POSTLINE_QUEUE_CAPACITY`,
    /// `POSTLINE_MAX_PAYLOAD_SIZE`, `POSTLINE_MAX_LINE_LENGTH`,
    /// `POSTLINE_TRANSFER_DIR`, `POSTLINE_RECEIVED_SUFFIX`,
    /// `POSTLINE_BLOCK_SIZE`, `POSTLINE_APP_NAME`, `POSTLINE_LOG_LEVEL`,
    /// `POSTLINE_LOG_TO_CONSOLE`, and `POSTLINE_JSON_FORMAT`.
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        use std::str::FromStr;

        fn parsed<T: FromStr>(name: &str) -> Option<T> {
            std::env::var(name).ok().and_then(|v| v.parse().ok())
        }

        let mut config = Self::default();

        if let Ok(addr) = std::env::var("POSTLINE_SERVER_ADDRESS") {
            config.server.address = addr;
        }
        if let Some(val) = parsed("POSTLINE_QUEUE_CAPACITY") {
            config.server.queue_capacity = val;
        }
        if let Some(val) = parsed("POSTLINE_MAX_PAYLOAD_SIZE") {
            config.server.max_payload_size = val;
        }
        if let Some(val) = parsed("POSTLINE_MAX_LINE_LENGTH") {
            config.server.max_line_length = val;
        }

        if let Ok(dir) = std::env::var("POSTLINE_TRANSFER_DIR") {
            config.storage.transfer_dir = dir;
        }
        if let Ok(suffix) = std::env::var("POSTLINE_RECEIVED_SUFFIX") {
            config.storage.received_suffix = suffix;
        }
        if let Some(val) = parsed("POSTLINE_BLOCK_SIZE") {
            config.storage.block_size = val;
        }

        if let Ok(name) = std::env::var("POSTLINE_APP_NAME") {
            config.logging.app_name = name;
        }
        if let Some(level) = parsed("POSTLINE_LOG_LEVEL") {
            config.logging.log_level = level;
        }
        if let Some(val) = parsed("POSTLINE_LOG_TO_CONSOLE") {
            config.logging.log_to_console = val;
        }
        if let Some(val) = parsed("POSTLINE_JSON_FORMAT") {
            config.logging.json_format = val;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        errors.extend(self.server.validate());
        errors.extend(self.storage.validate());
        errors.extend(self.logging.validate());

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Listening server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server listen address (e.g., "127.0.0.1:8080")
    pub address: String,

    /// Capacity of the bounded message queue; a full queue blocks the
    /// producing connection handlers
    pub queue_capacity: usize,

    /// Maximum accepted inline message body in bytes
    pub max_payload_size: usize,

    /// Maximum accepted attribute line in bytes
    pub max_line_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: String::from("127.0.0.1:8080"),
            queue_capacity: crate::protocol::queue::DEFAULT_QUEUE_CAPACITY,
            max_payload_size: MAX_PAYLOAD_SIZE,
            max_line_length: crate::transport::MAX_LINE_LEN,
        }
    }
}

impl ServerConfig {
    /// Validate server configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.address.is_empty() {
            errors.push("Server address cannot be empty".to_string());
        } else if self.address.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "Invalid server address format: '{}' (expected format: '0.0.0.0:8080')",
                self.address
            ));
        }

        if self.queue_capacity == 0 {
            errors.push("Queue capacity must be greater than 0".to_string());
        } else if self.queue_capacity > 1_000_000 {
            errors.push(format!(
                "Queue capacity too large: {} (max recommended: 1,000,000)",
                self.queue_capacity
            ));
        }

        if self.max_payload_size == 0 {
            errors.push("Max payload size cannot be 0".to_string());
        } else if self.max_payload_size > 100 * 1024 * 1024 {
            errors.push(format!(
                "Max payload size too large: {} bytes (maximum recommended: 100 MB)",
                self.max_payload_size
            ));
        }

        if self.max_line_length == 0 {
            errors.push("Max line length cannot be 0".to_string());
        } else if self.max_line_length > 1024 * 1024 {
            errors.push(format!(
                "Max line length too large: {} bytes (maximum recommended: 1 MB)",
                self.max_line_length
            ));
        }

        errors
    }
}

/// File storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory received files are written to
    pub transfer_dir: String,

    /// Suffix appended to received file names
    pub received_suffix: String,

    /// Block size used to stream file content to disk, in bytes
    pub block_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            transfer_dir: String::from("transfer"),
            received_suffix: String::from(crate::storage::RECEIVED_SUFFIX),
            block_size: crate::core::receiver::BLOCK_SIZE,
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.transfer_dir.is_empty() {
            errors.push("Transfer directory cannot be empty".to_string());
        }

        if self.received_suffix.is_empty() {
            errors.push("Received-file suffix cannot be empty".to_string());
        } else if !self.received_suffix.starts_with('.') {
            errors.push(format!(
                "Received-file suffix should start with '.': '{}'",
                self.received_suffix
            ));
        }

        if self.block_size == 0 {
            errors.push("Block size cannot be 0".to_string());
        } else if self.block_size > 1024 * 1024 {
            errors.push(format!(
                "Block size too large: {} bytes (maximum recommended: 1 MB)",
                self.block_size
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("postline"),
            log_level: Level::INFO,
            log_to_console: true,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
