//! Tests for the KeyDir index
//!
//! These tests verify:
//! - Basic insert/get/remove
//! - Replay semantics of `apply` (PUT sets, DELETE removes)
//! - The merge liveness test

use caskkv::index::KeyDir;
use caskkv::log::Record;

#[test]
fn test_new_is_empty() {
    let index = KeyDir::new();

    assert!(index.is_empty());
    assert_eq!(index.len(), 0);
    assert_eq!(index.get(b"missing"), None);
}

#[test]
fn test_insert_get_remove() {
    let mut index = KeyDir::new();

    assert_eq!(index.insert(b"key".to_vec(), 10), None);
    assert_eq!(index.insert(b"key".to_vec(), 42), Some(10));
    assert_eq!(index.get(b"key"), Some(42));
    assert!(index.contains_key(b"key"));

    assert_eq!(index.remove(b"key"), Some(42));
    assert!(!index.contains_key(b"key"));
    assert_eq!(index.remove(b"key"), None);
}

#[test]
fn test_apply_put_then_delete() {
    let mut index = KeyDir::new();

    index.apply(0, &Record::put(b"a".to_vec(), b"1".to_vec()));
    assert_eq!(index.get(b"a"), Some(0));

    index.apply(12, &Record::put(b"a".to_vec(), b"2".to_vec()));
    assert_eq!(index.get(b"a"), Some(12));

    index.apply(24, &Record::delete(b"a".to_vec()));
    assert_eq!(index.get(b"a"), None);
}

#[test]
fn test_apply_delete_of_unknown_key() {
    let mut index = KeyDir::new();

    index.apply(0, &Record::delete(b"ghost".to_vec()));

    assert!(index.is_empty());
}

#[test]
fn test_apply_sequence_matches_last_write() {
    let mut index = KeyDir::new();
    let records = [
        (0, Record::put(b"a".to_vec(), b"1".to_vec())),
        (12, Record::put(b"b".to_vec(), b"2".to_vec())),
        (24, Record::put(b"a".to_vec(), b"3".to_vec())),
        (36, Record::delete(b"b".to_vec())),
        (47, Record::put(b"c".to_vec(), b"4".to_vec())),
    ];

    for (offset, record) in &records {
        index.apply(*offset, record);
    }

    assert_eq!(index.len(), 2);
    assert_eq!(index.get(b"a"), Some(24));
    assert_eq!(index.get(b"b"), None);
    assert_eq!(index.get(b"c"), Some(47));
}

#[test]
fn test_is_live_only_for_latest_offset() {
    let mut index = KeyDir::new();
    let old = Record::put(b"a".to_vec(), b"1".to_vec());
    let new = Record::put(b"a".to_vec(), b"2".to_vec());
    index.apply(0, &old);
    index.apply(12, &new);

    assert!(!index.is_live(0, &old));
    assert!(index.is_live(12, &new));
}

#[test]
fn test_tombstone_is_never_live() {
    let mut index = KeyDir::new();
    index.insert(b"a".to_vec(), 12);

    // Even if the offsets happen to coincide
    assert!(!index.is_live(12, &Record::delete(b"a".to_vec())));
}

#[test]
fn test_is_live_unknown_key() {
    let index = KeyDir::new();

    assert!(!index.is_live(0, &Record::put(b"a".to_vec(), b"1".to_vec())));
}

#[test]
fn test_keys() {
    let mut index = KeyDir::new();
    index.insert(b"x".to_vec(), 0);
    index.insert(b"y".to_vec(), 12);

    let mut keys: Vec<&[u8]> = index.keys().collect();
    keys.sort();

    assert_eq!(keys, vec![b"x".as_slice(), b"y".as_slice()]);
}
