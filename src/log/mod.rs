//! Append Log Module
//!
//! The single on-disk, append-only log of key/value records.
//!
//! ## Responsibilities
//! - Fixed-header binary encoding of records
//! - Sequential append at the tracked write offset
//! - Positional reads (safe to issue from many readers at once)
//! - Sequential scans for index replay and merge
//!
//! ## File Format
//! No file-level header or trailer: the file is a plain concatenation of
//! records. All integers are big-endian.
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ Record 1                                                      │
//! │ ┌──────────────┬────────────────┬────────┬───────┬─────────┐  │
//! │ │ KeySize (4)  │ ValueSize (4)  │ Op (2) │  Key  │  Value  │  │
//! │ └──────────────┴────────────────┴────────┴───────┴─────────┘  │
//! ├───────────────────────────────────────────────────────────────┤
//! │ Record 2                                                      │
//! │ ...                                                           │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//! - Op: 0 = PUT, 1 = DELETE
//! - A DELETE (tombstone) has ValueSize 0 and no value bytes

mod record;
mod file;
mod iterator;

pub use record::{decode_header, Operation, Record, RecordHeader, HEADER_SIZE};
pub use file::AppendLog;
pub use iterator::LogIterator;
