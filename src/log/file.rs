//! Append Log file
//!
//! Owns the log file handle and the write offset.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::{CaskError, Result};

use super::record::{decode_header, Record, HEADER_SIZE};
use super::LogIterator;

/// Append-only log file with positional reads
///
/// ## Concurrency:
/// - `read_at` takes `&self` and never moves a shared file cursor, so any
///   number of readers can use it at once
/// - `append`/`sync`/`truncate` take `&mut self` (the engine's write lock)
pub struct AppendLog {
    /// Current location of the file
    path: PathBuf,
    /// Open handle (read + write)
    file: File,
    /// Where the next record goes; equals the logical file length
    write_offset: u64,
    /// How often appends are fsynced
    sync_strategy: SyncStrategy,
    /// Appends since the last fsync
    unsynced: usize,
    /// A failed append left bytes past `write_offset` that could not be cut
    dirty_tail: bool,
}

impl AppendLog {
    /// Open a log file for read/write, creating it if missing.
    ///
    /// The write offset resumes at the current file length.
    pub fn open_or_create(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        let write_offset = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            write_offset,
            sync_strategy,
            unsynced: 0,
            dirty_tail: false,
        })
    }

    /// Create an empty log file, discarding any existing content
    pub(crate) fn create_empty(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            write_offset: 0,
            sync_strategy,
            unsynced: 0,
            dirty_tail: false,
        })
    }

    /// Read the record starting at `offset`.
    ///
    /// Errors:
    /// - `EndOfLog` — `offset` is at or past the end of the log
    /// - `Truncated` — the header or payload runs past the end of the log
    /// - `CorruptHeader` — unknown operation tag
    pub fn read_at(&self, offset: u64) -> Result<Record> {
        if offset >= self.write_offset {
            return Err(CaskError::EndOfLog { offset });
        }

        let available = self.write_offset - offset;
        if available < HEADER_SIZE as u64 {
            return Err(CaskError::Truncated {
                offset,
                needed: HEADER_SIZE as u64,
                available,
            });
        }

        let mut header_buf = [0u8; HEADER_SIZE];
        self.fill(&mut header_buf, offset, offset, HEADER_SIZE as u64)?;
        let header = decode_header(&header_buf)?;

        // Sizes are only trusted once we know the payload is really there
        let needed = header.encoded_size();
        if available < needed {
            return Err(CaskError::Truncated {
                offset,
                needed,
                available,
            });
        }

        let key_offset = offset + HEADER_SIZE as u64;
        let mut key = vec![0u8; header.key_size as usize];
        self.fill(&mut key, key_offset, offset, needed)?;

        let value_offset = key_offset + header.key_size as u64;
        let mut value = vec![0u8; header.value_size as usize];
        self.fill(&mut value, value_offset, offset, needed)?;

        Ok(Record {
            key,
            value,
            operation: header.operation,
        })
    }

    /// Append a record, returning the offset it starts at.
    ///
    /// On failure the write offset is left where it was and the file is
    /// cut back to it. If that cut also fails the log refuses further
    /// appends until a retried cut succeeds, so a later, shorter record can
    /// never leave the stale bytes looking like a record behind it.
    pub fn append(&mut self, record: &Record) -> Result<u64> {
        let offset = self.write_record(record)?;

        if let Err(e) = self.maybe_sync() {
            self.rollback(offset);
            return Err(e);
        }

        Ok(offset)
    }

    /// Write a record without applying the sync strategy
    pub(crate) fn write_record(&mut self, record: &Record) -> Result<u64> {
        if self.dirty_tail {
            self.file.set_len(self.write_offset)?;
            self.dirty_tail = false;
        }

        let offset = self.write_offset;
        let encoded = record.encode();

        if let Err(e) = write_all_at(&self.file, &encoded, offset) {
            self.rollback(offset);
            return Err(e.into());
        }

        self.write_offset += encoded.len() as u64;
        Ok(offset)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Cut the file back to `len` bytes (drops a partial trailing record)
    pub(crate) fn truncate(&mut self, len: u64) -> Result<()> {
        self.file.set_len(len)?;
        self.file.sync_all()?;
        self.write_offset = len;
        self.unsynced = 0;
        self.dirty_tail = false;
        Ok(())
    }

    /// Record that the underlying file was renamed to `path`
    pub(crate) fn relocate(&mut self, path: PathBuf) {
        self.path = path;
    }

    /// Sequential scan of every record from offset 0
    pub fn iter(&self) -> LogIterator<'_> {
        LogIterator::new(self)
    }

    /// Offset the next record will be written at
    pub fn write_offset(&self) -> u64 {
        self.write_offset
    }

    pub fn is_empty(&self) -> bool {
        self.write_offset == 0
    }

    /// Whether bytes from a failed append are still past `write_offset`
    pub fn has_dirty_tail(&self) -> bool {
        self.dirty_tail
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn maybe_sync(&mut self) -> Result<()> {
        match self.sync_strategy {
            SyncStrategy::EveryWrite => self.sync(),
            SyncStrategy::EveryNEntries { count } => {
                self.unsynced += 1;
                if self.unsynced >= count {
                    self.sync()?;
                }
                Ok(())
            }
        }
    }

    /// Drop bytes written past `offset`; a failed cut marks the tail dirty
    fn rollback(&mut self, offset: u64) {
        self.write_offset = offset;
        if let Err(e) = self.file.set_len(offset) {
            self.dirty_tail = true;
            tracing::warn!(
                "Failed to roll back {} to offset {}: {}",
                self.path.display(),
                offset,
                e
            );
        }
    }

    /// Positional read of `buf.len()` bytes for the record at `record_offset`
    fn fill(&self, buf: &mut [u8], at: u64, record_offset: u64, needed: u64) -> Result<()> {
        read_exact_at(&self.file, buf, at).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                // File shrank underneath us
                CaskError::Truncated {
                    offset: record_offset,
                    needed,
                    available: self.write_offset.saturating_sub(record_offset),
                }
            } else {
                CaskError::Io(e)
            }
        })
    }
}

// =============================================================================
// Positional I/O
// =============================================================================

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(unix)]
fn write_all_at(file: &File, buf: &[u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.write_all_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "failed to fill whole buffer",
                ))
            }
            Ok(n) => {
                buf = &mut buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(windows)]
fn write_all_at(file: &File, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_write(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "failed to write whole buffer",
                ))
            }
            Ok(n) => {
                buf = &buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
