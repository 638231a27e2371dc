//! Record codec
//!
//! Encoding and decoding of a single log record.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{CaskError, Result};

/// Header size: KeySize (4) + ValueSize (4) + Op (2) = 10 bytes
pub const HEADER_SIZE: usize = 10;

/// Operation recorded by a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Operation {
    /// Set a key to a value
    Put = 0,

    /// Tombstone: the key is removed as of this record
    Delete = 1,
}

impl TryFrom<u16> for Operation {
    type Error = CaskError;

    fn try_from(tag: u16) -> Result<Self> {
        match tag {
            0 => Ok(Operation::Put),
            1 => Ok(Operation::Delete),
            _ => Err(CaskError::CorruptHeader(format!("unknown operation tag: {}", tag))),
        }
    }
}

/// Decoded fixed-size header of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub key_size: u32,
    pub value_size: u32,
    pub operation: Operation,
}

impl RecordHeader {
    /// Decode the first `HEADER_SIZE` bytes of `bytes`.
    ///
    /// Does not look at the key/value payload; the caller reads those
    /// once the sizes are known.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(CaskError::CorruptHeader(format!(
                "expected {} header bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut buf = &bytes[..HEADER_SIZE];
        let key_size = buf.get_u32();
        let value_size = buf.get_u32();
        let operation = Operation::try_from(buf.get_u16())?;

        Ok(Self {
            key_size,
            value_size,
            operation,
        })
    }

    /// Total on-disk size of the record this header describes
    pub fn encoded_size(&self) -> u64 {
        HEADER_SIZE as u64 + self.key_size as u64 + self.value_size as u64
    }
}

/// Decode a record header (see [`RecordHeader::decode`])
pub fn decode_header(bytes: &[u8]) -> Result<RecordHeader> {
    RecordHeader::decode(bytes)
}

/// A single logged operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub operation: Operation,
}

impl Record {
    /// Create a PUT record
    pub fn put(key: Vec<u8>, value: Vec<u8>) -> Self {
        Self {
            key,
            value,
            operation: Operation::Put,
        }
    }

    /// Create a DELETE (tombstone) record, which never carries a value
    pub fn delete(key: Vec<u8>) -> Self {
        Self {
            key,
            value: Vec::new(),
            operation: Operation::Delete,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.operation == Operation::Delete
    }

    /// Check that key and value lengths fit the u32 size fields
    pub fn validate(&self) -> Result<()> {
        if u32::try_from(self.key.len()).is_err() || u32::try_from(self.value.len()).is_err() {
            return Err(CaskError::RecordTooLarge(format!(
                "key {} bytes, value {} bytes (max {} each)",
                self.key.len(),
                self.value.len(),
                u32::MAX
            )));
        }
        Ok(())
    }

    pub fn header(&self) -> RecordHeader {
        RecordHeader {
            key_size: self.key.len() as u32,
            value_size: self.value.len() as u32,
            operation: self.operation,
        }
    }

    /// header + key + value
    pub fn encoded_size(&self) -> u64 {
        (HEADER_SIZE + self.key.len() + self.value.len()) as u64
    }

    /// Encode to the on-disk layout: header, then key, then value.
    ///
    /// Sizes are written as u32; call [`Record::validate`] first for
    /// untrusted input.
    pub fn encode(&self) -> Bytes {
        let header = self.header();
        let mut buf = BytesMut::with_capacity(self.encoded_size() as usize);

        buf.put_u32(header.key_size);
        buf.put_u32(header.value_size);
        buf.put_u16(header.operation as u16);
        buf.put_slice(&self.key);
        buf.put_slice(&self.value);

        buf.freeze()
    }
}
