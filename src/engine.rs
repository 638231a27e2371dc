//! Engine Module
//!
//! The storage engine that coordinates the index and the Append Log.
//!
//! ## Responsibilities
//! - Open/create the log and rebuild the index by replay
//! - Serve put/get/delete, keeping the index in step with the log
//! - Merge: rewrite only live records into a fresh log and swap it in

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::command::Command;
use crate::config::Config;
use crate::error::{CaskError, Result};
use crate::index::{KeyDir, Replay};
use crate::log::{AppendLog, Operation, Record};

/// The main storage engine
///
/// ## Concurrency Model: one RwLock over (index, log)
///
/// - **Reads** (get): shared guard. Many readers run in parallel; each
///   does positional reads that never touch a shared file cursor.
/// - **Writes** (put/delete/merge/sync): exclusive guard. At most one
///   mutation at a time and no reads interleave with it.
///
/// The index and the log's write offset live behind the same lock so
/// they can never be observed out of step, and merge can rewrite every
/// offset and swap the file in a single critical section.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Canonical log file path
    log_path: PathBuf,

    /// Temporary output of a running merge
    merge_path: PathBuf,

    /// Index + log, guarded as one unit
    state: RwLock<EngineState>,
}

struct EngineState {
    index: KeyDir,
    log: AppendLog,
}

/// Point-in-time engine statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Number of keys with a live value
    pub live_keys: usize,

    /// Bytes in the log, live and garbage
    pub log_size: u64,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    pub const LOG_FILENAME: &'static str = "caskkv.data";
    pub const MERGE_FILENAME: &'static str = "caskkv.data.merge";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Check (or create) the data directory
    /// 2. Remove a merge file left by an interrupted merge
    /// 3. Open/create the log
    /// 4. Replay the log into a fresh index
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Data directory
        if !config.data_dir.exists() {
            if !config.create_if_missing {
                return Err(CaskError::Config(format!(
                    "data directory {} does not exist",
                    config.data_dir.display()
                )));
            }
            fs::create_dir_all(&config.data_dir)?;
        } else if !config.data_dir.is_dir() {
            return Err(CaskError::Config(format!(
                "{} is not a directory",
                config.data_dir.display()
            )));
        }

        let log_path = config.data_dir.join(Self::LOG_FILENAME);
        let merge_path = config.data_dir.join(Self::MERGE_FILENAME);

        // Step 2: The canonical log is authoritative until a merge renames
        // over it, so a leftover merge file is always garbage
        if merge_path.exists() {
            tracing::warn!(
                "Removing stale merge file {} from an interrupted merge",
                merge_path.display()
            );
            fs::remove_file(&merge_path)?;
        }

        // Step 3: Open the log
        let mut log = AppendLog::open_or_create(&log_path, config.sync_strategy)?;

        // Step 4: Rebuild the index
        let (index, replay) = Replay::load(&mut log, config.recovery_mode)?;

        tracing::info!(
            "Opened {}: {} records replayed, {} live keys, {} bytes",
            log_path.display(),
            replay.records_replayed,
            replay.live_keys,
            log.write_offset()
        );

        Ok(Self {
            config,
            log_path,
            merge_path,
            state: RwLock::new(EngineState { index, log }),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Option<Vec<u8>>> {
        match command {
            Command::Get { key } => self.get(&key),
            Command::Put { key, value } => {
                self.put(&key, &value)?;
                Ok(None)
            }
            Command::Delete { key } => {
                self.delete(&key)?;
                Ok(None)
            }
            Command::Merge => {
                self.merge()?;
                Ok(None)
            }
        }
    }

    /// Get a value by key
    ///
    /// An empty key is never stored, so it is simply "not found".
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if key.is_empty() {
            return Ok(None);
        }

        let state = self.state.read();

        let offset = match state.index.get(key) {
            Some(offset) => offset,
            None => return Ok(None),
        };

        let record = match state.log.read_at(offset) {
            Ok(record) => record,
            Err(CaskError::EndOfLog { .. }) => {
                return Err(CaskError::IndexInconsistency(format!(
                    "key {:?} indexed at offset {} past end of log ({} bytes)",
                    String::from_utf8_lossy(key),
                    offset,
                    state.log.write_offset()
                )));
            }
            Err(e) => return Err(e),
        };

        if record.operation != Operation::Put || record.key != key {
            return Err(CaskError::IndexInconsistency(format!(
                "key {:?} indexed at offset {} but found {:?} for key {:?}",
                String::from_utf8_lossy(key),
                offset,
                record.operation,
                String::from_utf8_lossy(&record.key)
            )));
        }

        Ok(Some(record.value))
    }

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Acquire write lock
    /// 2. Append PUT record to the log
    /// 3. Point the index at the new record
    ///
    /// An empty key is ignored. If the append fails the index is untouched.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            tracing::trace!("Ignoring put with empty key");
            return Ok(());
        }

        let record = Record::put(key.to_vec(), value.to_vec());
        record.validate()?;

        let mut state = self.state.write();
        let offset = state.log.append(&record)?;
        state.index.insert(record.key, offset);

        Ok(())
    }

    /// Delete a key
    ///
    /// Steps:
    /// 1. Acquire write lock
    /// 2. Append tombstone to the log
    /// 3. Remove the key from the index
    ///
    /// Empty or absent keys are ignored and write nothing.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            tracing::trace!("Ignoring delete with empty key");
            return Ok(());
        }

        let mut state = self.state.write();

        if !state.index.contains_key(key) {
            tracing::debug!(
                "Ignoring delete of absent key {:?}",
                String::from_utf8_lossy(key)
            );
            return Ok(());
        }

        let record = Record::delete(key.to_vec());
        record.validate()?;

        // Tombstone must be in the log before the index forgets the key
        state.log.append(&record)?;
        state.index.remove(key);

        Ok(())
    }

    /// Compact the log
    ///
    /// Steps (all under the write lock):
    /// 1. Skip if the log is empty
    /// 2. Scan the log, keeping records the index still points at
    /// 3. Skip if nothing is live
    /// 4. Write live records to the merge file and fsync it
    /// 5. Rename the merge file over the canonical log
    /// 6. Swap in the new log handle and its index
    /// 7. Fsync the data directory so the rename itself is durable
    ///
    /// Any failure before step 5 removes the merge file and leaves the
    /// original log and index untouched. A failure in step 7 is returned,
    /// but the engine already serves the merged log.
    pub fn merge(&self) -> Result<()> {
        let mut state = self.state.write();

        // Step 1
        if state.log.is_empty() {
            tracing::debug!("Merge skipped: log is empty");
            return Ok(());
        }

        let size_before = state.log.write_offset();

        // Step 2
        let live = Self::collect_live(&state)?;

        // Step 3
        if live.is_empty() {
            tracing::debug!("Merge skipped: no live records");
            return Ok(());
        }

        // Step 4
        let (mut merged_log, merged_index) = match self.write_merge_log(&live, &state.index) {
            Ok(merged) => merged,
            Err(e) => {
                self.discard_merge_file();
                return Err(e);
            }
        };

        // Step 5: the rename is the commit point
        if let Err(e) = fs::rename(&self.merge_path, &self.log_path) {
            drop(merged_log);
            self.discard_merge_file();
            return Err(e.into());
        }
        merged_log.relocate(self.log_path.clone());

        // Step 6: dropping the old handle closes the replaced file
        let size_after = merged_log.write_offset();
        state.log = merged_log;
        state.index = merged_index;

        // Step 7
        sync_dir(&self.config.data_dir)?;

        tracing::info!(
            "Merge complete: {} live records, {} -> {} bytes",
            live.len(),
            size_before,
            size_after
        );

        Ok(())
    }

    /// Force sync the log to disk
    pub fn sync(&self) -> Result<()> {
        self.state.write().log.sync()
    }

    /// Close the engine gracefully
    ///
    /// Syncs the log so every acknowledged write is on disk
    pub fn close(self) -> Result<()> {
        let mut state = self.state.into_inner();
        state.log.sync()?;
        tracing::debug!("Closed {}", self.log_path.display());
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the canonical log file path
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Get the current log size in bytes
    pub fn log_size(&self) -> u64 {
        self.state.read().log.write_offset()
    }

    /// Get the number of live keys
    pub fn key_count(&self) -> usize {
        self.state.read().index.len()
    }

    /// Get live key count and log size under one guard
    pub fn stats(&self) -> Stats {
        let state = self.state.read();
        Stats {
            live_keys: state.index.len(),
            log_size: state.log.write_offset(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Scan the whole log and keep the records the index points at, in
    /// log order
    fn collect_live(state: &EngineState) -> Result<Vec<Record>> {
        let mut live = Vec::with_capacity(state.index.len());

        for item in state.log.iter() {
            let (offset, record) = item?;
            if state.index.is_live(offset, &record) {
                live.push(record);
            }
        }

        // Every indexed key must point at a record the scan found
        if live.len() != state.index.len() {
            return Err(CaskError::IndexInconsistency(format!(
                "merge scan found {} live records but index holds {} keys",
                live.len(),
                state.index.len()
            )));
        }

        Ok(live)
    }

    /// Write `live` into a fresh merge file and build the matching index.
    ///
    /// The current index is only read here; it is replaced by the caller
    /// once the merge file has been renamed into place.
    fn write_merge_log(&self, live: &[Record], current: &KeyDir) -> Result<(AppendLog, KeyDir)> {
        let mut merged_log = AppendLog::create_empty(&self.merge_path, self.config.sync_strategy)?;
        let mut merged_index = KeyDir::new();

        for record in live {
            let offset = merged_log.write_record(record)?;
            tracing::trace!(
                "Migrated {:?}: {:?} -> {}",
                String::from_utf8_lossy(&record.key),
                current.get(&record.key),
                offset
            );
            merged_index.insert(record.key.clone(), offset);
        }

        merged_log.sync()?;

        Ok((merged_log, merged_index))
    }

    fn discard_merge_file(&self) {
        if let Err(e) = fs::remove_file(&self.merge_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    "Failed to remove merge file {}: {}",
                    self.merge_path.display(),
                    e
                );
            }
        }
        tracing::warn!("Merge aborted; original log left in place");
    }
}

/// Fsync a directory so renames inside it survive a crash
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}

/// Directory handles cannot be fsynced here; NTFS journals the rename
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
