//! Error types for CaskKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using CaskError
pub type Result<T> = std::result::Result<T, CaskError>;

/// Unified error type for CaskKV operations
#[derive(Debug, Error)]
pub enum CaskError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Log Format Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt record header: {0}")]
    CorruptHeader(String),

    #[error("Record too large: {0}")]
    RecordTooLarge(String),

    #[error("Truncated record at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// Clean end of the log. Replay and merge use this as their stop signal.
    #[error("End of log at offset {offset}")]
    EndOfLog { offset: u64 },

    // -------------------------------------------------------------------------
    // Index Errors
    // -------------------------------------------------------------------------
    /// The index points at an offset that does not hold a PUT for the key.
    /// Only reachable through a bug or external tampering with the log.
    #[error("Index inconsistency: {0}")]
    IndexInconsistency(String),

    #[error("Failed to load index at offset {offset}: {source}")]
    IndexLoadFailed {
        offset: u64,
        #[source]
        source: Box<CaskError>,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CaskError {
    /// True for the clean end-of-log signal
    pub fn is_end_of_log(&self) -> bool {
        matches!(self, CaskError::EndOfLog { .. })
    }

    /// True when a record claims more bytes than the log holds
    pub fn is_truncated(&self) -> bool {
        matches!(self, CaskError::Truncated { .. })
    }
}
