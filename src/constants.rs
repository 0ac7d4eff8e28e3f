//! Application constants for station QC
//!
//! This module contains default values, wire-format versions and the
//! sentinel values shared by the resolver, ledger and persister.

// =============================================================================
// Parameter Resolution
// =============================================================================

/// Value stored in a discrete parameter dimension meaning "applies to any value"
pub const WILDCARD: i32 = -1;

/// Valid calendar month range for month-scoped parameters
pub const MONTH_RANGE: std::ops::RangeInclusive<i32> = 1..=12;

// =============================================================================
// Flag Wire Format
// =============================================================================

/// Version of the flag-kind to bit-index table
///
/// Bump this only together with a data migration of every persisted flag integer.
pub const FLAG_TABLE_VERSION: u32 = 1;

/// Mask covering every bit owned by a declared flag kind
pub const KNOWN_FLAG_MASK: u64 = 0b11_1111;

// =============================================================================
// Batch Persistence
// =============================================================================

/// Default number of records written or deleted between flushes
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Upper bound accepted for a configured chunk size
pub const MAX_CHUNK_SIZE: usize = 10_000;

// =============================================================================
// Exception Ledger
// =============================================================================

/// Ticket system recorded when the caller does not name one
pub const DEFAULT_TICKET_SYSTEM: &str = "internal";

/// Maximum length accepted for an exception description
pub const MAX_DESCRIPTION_LENGTH: usize = 4000;

// =============================================================================
// Configuration and Logging
// =============================================================================

/// Directory name under the user configuration directory
pub const CONFIG_DIR_NAME: &str = "station-qc";

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Log target used for the default `EnvFilter` directive
pub const LOG_TARGET: &str = "station_qc";

/// Progress bar template used for chunked batch operations
pub const BATCH_PROGRESS_TEMPLATE: &str =
    "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} chunks";
