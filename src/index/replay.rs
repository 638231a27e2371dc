//! Index replay
//!
//! Rebuilds the index by scanning the Append Log from offset 0.

use crate::config::RecoveryMode;
use crate::error::{CaskError, Result};
use crate::log::AppendLog;

use super::KeyDir;

/// Rebuilds a [`KeyDir`] from the log
pub struct Replay;

/// Result of a replay
#[derive(Debug, Default)]
pub struct ReplayResult {
    /// Number of complete records applied
    pub records_replayed: u64,

    /// Number of keys left in the index
    pub live_keys: usize,

    /// Whether a partial trailing record was cut off
    pub was_truncated: bool,

    /// Bytes removed from the end of the file
    pub bytes_discarded: u64,
}

impl Replay {
    /// Replay every record into a fresh index.
    ///
    /// A record that runs past the end of the file, following at least
    /// one cleanly read record, can only be the last one, left behind by
    /// an interrupted append. Under
    /// `RecoveryMode::TruncateTail` it is discarded and the file is cut
    /// back to the last complete record; under `Strict` it fails the load.
    /// Anything else that is not a clean end-of-log fails with
    /// `IndexLoadFailed`.
    pub fn load(log: &mut AppendLog, mode: RecoveryMode) -> Result<(KeyDir, ReplayResult)> {
        let mut index = KeyDir::new();
        let mut result = ReplayResult::default();
        let mut partial_tail: Option<u64> = None;

        {
            let mut records = log.iter();
            while let Some(item) = records.next() {
                match item {
                    Ok((offset, record)) => {
                        index.apply(offset, &record);
                        result.records_replayed += 1;
                    }
                    // Only a record after at least one clean record can be a
                    // partial tail; a bad first record is corruption
                    Err(e)
                        if e.is_truncated()
                            && mode == RecoveryMode::TruncateTail
                            && records.offset() > 0 =>
                    {
                        partial_tail = Some(records.offset());
                    }
                    Err(e) => {
                        return Err(CaskError::IndexLoadFailed {
                            offset: records.offset(),
                            source: Box::new(e),
                        });
                    }
                }
            }
        }

        if let Some(clean_end) = partial_tail {
            let discarded = log.write_offset() - clean_end;
            tracing::warn!(
                "Discarding {} bytes of partial trailing record at offset {} in {}",
                discarded,
                clean_end,
                log.path().display()
            );
            log.truncate(clean_end).map_err(|e| CaskError::IndexLoadFailed {
                offset: clean_end,
                source: Box::new(e),
            })?;
            result.was_truncated = true;
            result.bytes_discarded = discarded;
        }

        result.live_keys = index.len();
        Ok((index, result))
    }
}
