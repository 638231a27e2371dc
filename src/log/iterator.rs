//! Log Iterator
//!
//! Sequential iteration over all records in the Append Log.

use crate::error::Result;

use super::{AppendLog, Record};

/// Iterator over `(start_offset, record)` pairs in log order.
///
/// Ends quietly at a clean end-of-log. Any other error is yielded once
/// and then iteration stops.
pub struct LogIterator<'a> {
    log: &'a AppendLog,
    /// Start of the next record to read
    offset: u64,
    finished: bool,
}

impl<'a> LogIterator<'a> {
    pub(super) fn new(log: &'a AppendLog) -> Self {
        Self {
            log,
            offset: 0,
            finished: false,
        }
    }

    /// Offset of the next record, or of the record that failed to decode
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl<'a> Iterator for LogIterator<'a> {
    type Item = Result<(u64, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.log.read_at(self.offset) {
            Ok(record) => {
                let start = self.offset;
                self.offset += record.encoded_size();
                Some(Ok((start, record)))
            }
            Err(e) if e.is_end_of_log() => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
