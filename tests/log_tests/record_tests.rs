//! Tests for the record codec
//!
//! These tests verify:
//! - Exact on-disk byte layout (big-endian header, key, value)
//! - Header decoding for PUT and DELETE
//! - Rejection of short headers and unknown operation tags

use caskkv::log::{decode_header, Operation, Record, RecordHeader, HEADER_SIZE};
use caskkv::CaskError;

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_header_size_is_ten_bytes() {
    assert_eq!(HEADER_SIZE, 10);
}

#[test]
fn test_encode_put_layout() {
    let record = Record::put(b"key".to_vec(), b"value".to_vec());
    let bytes = record.encode();

    assert_eq!(bytes.len(), 10 + 3 + 5);
    assert_eq!(&bytes[0..4], &[0, 0, 0, 3]); // key_size
    assert_eq!(&bytes[4..8], &[0, 0, 0, 5]); // value_size
    assert_eq!(&bytes[8..10], &[0, 0]); // PUT
    assert_eq!(&bytes[10..13], b"key");
    assert_eq!(&bytes[13..18], b"value");
}

#[test]
fn test_encode_delete_layout() {
    let record = Record::delete(b"gone".to_vec());
    let bytes = record.encode();

    assert_eq!(bytes.len(), 14);
    assert_eq!(&bytes[0..4], &[0, 0, 0, 4]);
    assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
    assert_eq!(&bytes[8..10], &[0, 1]); // DELETE
    assert_eq!(&bytes[10..], b"gone");
}

#[test]
fn test_encode_sizes_are_big_endian() {
    let record = Record::put(vec![7u8; 300], vec![9u8; 70_000]);
    let bytes = record.encode();

    assert_eq!(&bytes[0..4], &300u32.to_be_bytes());
    assert_eq!(&bytes[4..8], &70_000u32.to_be_bytes());
    assert_eq!(bytes.len() as u64, record.encoded_size());
}

#[test]
fn test_encoded_size() {
    assert_eq!(Record::put(b"a".to_vec(), b"123".to_vec()).encoded_size(), 14);
    assert_eq!(Record::delete(b"ab".to_vec()).encoded_size(), 12);
    assert_eq!(Record::put(b"k".to_vec(), Vec::new()).encoded_size(), 11);
}

// =============================================================================
// Header Decoding Tests
// =============================================================================

#[test]
fn test_decode_delete_header_with_empty_value() {
    let record = Record::delete(b"k".to_vec());
    let bytes = record.encode();

    let header = decode_header(&bytes).unwrap();

    assert_eq!(header.key_size, 1);
    assert_eq!(header.value_size, 0);
    assert_eq!(header.operation, Operation::Delete);
    assert_eq!(header.operation as u16, 1);
    assert_eq!(bytes.len(), HEADER_SIZE + 1); // no value bytes
}

#[test]
fn test_decode_put_header() {
    let bytes = Record::put(b"hello".to_vec(), b"world!".to_vec()).encode();

    let header = RecordHeader::decode(&bytes).unwrap();

    assert_eq!(
        header,
        RecordHeader {
            key_size: 5,
            value_size: 6,
            operation: Operation::Put,
        }
    );
    assert_eq!(header.encoded_size(), 21);
}

#[test]
fn test_decode_header_ignores_payload() {
    // Only the first 10 bytes matter
    let bytes = [0, 0, 0, 2, 0, 0, 0, 0, 0, 1];
    let header = decode_header(&bytes).unwrap();

    assert_eq!(header.key_size, 2);
    assert_eq!(header.operation, Operation::Delete);
}

#[test]
fn test_decode_header_too_short() {
    let bytes = [0u8; 9];

    let result = decode_header(&bytes);

    assert!(matches!(result, Err(CaskError::CorruptHeader(_))));
}

#[test]
fn test_decode_header_empty_input() {
    assert!(matches!(decode_header(&[]), Err(CaskError::CorruptHeader(_))));
}

#[test]
fn test_decode_header_unknown_operation() {
    let bytes = [0, 0, 0, 1, 0, 0, 0, 1, 0, 2];

    let result = decode_header(&bytes);

    assert!(matches!(result, Err(CaskError::CorruptHeader(_))));
}

#[test]
fn test_operation_from_tag() {
    assert_eq!(Operation::try_from(0).unwrap(), Operation::Put);
    assert_eq!(Operation::try_from(1).unwrap(), Operation::Delete);
    assert!(Operation::try_from(0xFFFF).is_err());
}

// =============================================================================
// Record Helpers
// =============================================================================

#[test]
fn test_tombstone_has_no_value() {
    let record = Record::delete(b"k".to_vec());

    assert!(record.is_tombstone());
    assert!(record.value.is_empty());
    assert!(!Record::put(b"k".to_vec(), b"v".to_vec()).is_tombstone());
}

#[test]
fn test_validate_accepts_normal_record() {
    let record = Record::put(b"key".to_vec(), vec![0u8; 1024]);
    assert!(record.validate().is_ok());
}
