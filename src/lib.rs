//! # CaskKV
//!
//! A minimal log-structured (bitcask-style) key-value store with:
//! - A single append-only log file as the only source of truth
//! - A full in-memory index (key → offset of latest record), rebuilt by
//!   replaying the log on startup
//! - Merge compaction that rewrites only live records into a fresh log
//! - Shared reads / exclusive writes under one RwLock
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Caller / CLI (caskkv-cli)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ put / get / delete / merge
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Engine                                │
//! │            RwLock<(KeyDir, AppendLog)>                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   KeyDir    │          │ AppendLog   │
//!   │ key→offset  │◄─replay──│  (Record    │
//!   │             │          │   codec)    │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod log;
pub mod index;
pub mod command;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CaskError, Result};
pub use config::Config;
pub use engine::{Engine, Stats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of CaskKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
