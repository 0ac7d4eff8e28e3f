//! Configuration management and validation.
//!
//! Provides configuration structures for batch persistence and the exception
//! ledger, loaded from a TOML file with builder-style overrides.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_CHUNK_SIZE, DEFAULT_TICKET_SYSTEM, MAX_CHUNK_SIZE,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Batch persistence settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Records written or deleted between flushes
    pub chunk_size: usize,

    /// Show a progress bar over chunks
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            show_progress: false,
        }
    }
}

/// Exception ledger settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Ticket system recorded when none is given
    pub default_ticket_system: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_ticket_system: DEFAULT_TICKET_SYSTEM.to_string(),
        }
    }
}

/// Global configuration for station QC
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QcConfig {
    pub batch: BatchConfig,
    pub ledger: LedgerConfig,
}

impl QcConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: QcConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub async fn from_file(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::io(
                format!("Failed to read configuration file {}", path.display()),
                e,
            )
        })?;

        let config: QcConfig = toml::from_str(&text).map_err(|e| {
            Error::config_parse(path.display().to_string(), e.message().to_string(), Some(e))
        })?;
        config.validate()?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, else from the default location if it exists,
    /// else fall back to defaults
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path).await;
        }

        match Self::default_path() {
            Some(default_path) if default_path.exists() => Self::from_file(&default_path).await,
            _ => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Default configuration file location under the user config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.batch.chunk_size == 0 {
            return Err(Error::configuration("batch.chunk_size must be at least 1"));
        }
        if self.batch.chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::configuration(format!(
                "batch.chunk_size {} exceeds maximum {}",
                self.batch.chunk_size, MAX_CHUNK_SIZE
            )));
        }
        if self.ledger.default_ticket_system.trim().is_empty() {
            return Err(Error::configuration(
                "ledger.default_ticket_system cannot be empty",
            ));
        }
        Ok(())
    }

    /// Create configuration with custom chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.batch.chunk_size = chunk_size;
        self
    }

    /// Enable batch progress bars
    pub fn with_progress(mut self) -> Self {
        self.batch.show_progress = true;
        self
    }

    /// Set the default ticket system
    pub fn with_ticket_system(mut self, system: impl Into<String>) -> Self {
        self.ledger.default_ticket_system = system.into();
        self
    }
}
