//! Command definitions
//!
//! Operations an external caller (such as the CLI) can route through
//! [`Engine::execute`](crate::engine::Engine::execute).

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a value by key
    Get { key: Vec<u8> },

    /// Put a key-value pair
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Delete { key: Vec<u8> },

    /// Compact the log
    Merge,
}
