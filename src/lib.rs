//! Station QC Library
//!
//! Quality-control state for hourly climate observations collected from a
//! network of monitoring stations.
//!
//! This library provides tools for:
//! - Encoding QC concerns into a stable integer flag vector
//! - Resolving the most specific QC threshold or effective-dated station metadata
//! - Tracking flagged data as exceptions and documenting their resolutions
//! - Writing and deleting large batches of records in flushed, ordered chunks
//! - Comprehensive error handling that never swallows data errors

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod storage;
    pub mod services {
        pub mod batch_persister;
        pub mod exception_ledger;
        pub mod parameter_resolver;
        pub mod quality_check;
    }
    pub mod adapters {
        pub mod cache;
        pub mod memory_store;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{
    Exception, ExceptionFact, ExceptionStatus, FactKey, FlagKind, FlagVector, ObservedValue,
    ReapplyPolicy, Resolution, ResolutionFact,
};
pub use config::QcConfig;

/// Result type alias for station QC operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for QC resolution, ledger and persistence operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed
    #[error("Configuration parse error in '{file}': {message}")]
    ConfigParse {
        file: String,
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// More than one parameter shares the highest specificity for a query
    #[error(
        "Ambiguous {kind} parameters for {query}: {candidates} candidates share the highest specificity"
    )]
    AmbiguousParameter {
        kind: String,
        query: String,
        candidates: usize,
    },

    /// A fact or resolution references a record that does not exist
    #[error("Unknown {entity} id {id}")]
    Referential { entity: String, id: i64 },

    /// A chunk of a bulk operation failed; earlier chunks stay committed
    #[error(
        "Batch '{operation}' aborted at chunk {chunk_index} after {committed_chunks} committed chunk(s)"
    )]
    BatchAborted {
        operation: String,
        chunk_index: usize,
        committed_chunks: usize,
        #[source]
        source: Box<Error>,
    },

    /// Storage collaborator reported a failure
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration parse error
    pub fn config_parse(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<toml::de::Error>,
    ) -> Self {
        Self::ConfigParse {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an ambiguous parameter error
    pub fn ambiguous_parameter(
        kind: impl Into<String>,
        query: impl Into<String>,
        candidates: usize,
    ) -> Self {
        Self::AmbiguousParameter {
            kind: kind.into(),
            query: query.into(),
            candidates,
        }
    }

    /// Create a referential error
    pub fn referential(entity: impl Into<String>, id: i64) -> Self {
        Self::Referential {
            entity: entity.into(),
            id,
        }
    }

    /// Wrap a chunk failure with its batch position
    pub fn batch_aborted(
        operation: impl Into<String>,
        chunk_index: usize,
        committed_chunks: usize,
        source: Error,
    ) -> Self {
        Self::BatchAborted {
            operation: operation.into(),
            chunk_index,
            committed_chunks,
            source: Box::new(source),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Check whether this error is a resolver configuration problem
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousParameter { .. } | Self::Configuration { .. } | Self::ConfigParse { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::ConfigParse {
            file: "unknown".to_string(),
            message: error.message().to_string(),
            source: Some(error),
        }
    }
}
