//! KeyDir implementation
//!
//! HashMap-based key → offset index.

use std::collections::HashMap;

use crate::log::{Operation, Record};

/// Maps each live key to the start offset of its latest PUT record
#[derive(Debug, Default, Clone)]
pub struct KeyDir {
    entries: HashMap<Vec<u8>, u64>,
}

impl KeyDir {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the latest PUT for `key`
    pub fn get(&self, key: &[u8]) -> Option<u64> {
        self.entries.get(key).copied()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// Point `key` at `offset`, returning the previous offset
    pub fn insert(&mut self, key: Vec<u8>, offset: u64) -> Option<u64> {
        self.entries.insert(key, offset)
    }

    pub fn remove(&mut self, key: &[u8]) -> Option<u64> {
        self.entries.remove(key)
    }

    /// Apply one replayed record found at `offset`.
    ///
    /// Same effect as the point operation that wrote it: PUT sets the
    /// entry, DELETE removes it.
    pub fn apply(&mut self, offset: u64, record: &Record) {
        match record.operation {
            Operation::Put => {
                self.entries.insert(record.key.clone(), offset);
            }
            Operation::Delete => {
                self.entries.remove(&record.key);
            }
        }
    }

    /// A record is live iff the index still points at exactly its offset.
    /// Tombstones are never live.
    pub fn is_live(&self, offset: u64, record: &Record) -> bool {
        record.operation == Operation::Put && self.get(&record.key) == Some(offset)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all live keys (arbitrary order)
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.keys().map(|k| k.as_slice())
    }
}
