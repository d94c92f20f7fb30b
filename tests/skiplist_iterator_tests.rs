// Skip List Iterator tests
// Tests for iterating over skip list entries in sorted order.

use lsm_core::iterator::StorageIterator;
use lsm_core::memtable::skiplist::SkipList;

// =============================================================================
// Test 1: Empty iterator
// =============================================================================
// An iterator over an empty skip list should immediately be invalid.
#[test]
fn iterator_empty_skiplist_is_invalid() {
    let sl = SkipList::new();
    let iter = sl.iter();
    assert!(!iter.is_valid());
    assert_eq!(iter.key(), b"");
}

// =============================================================================
// Test 2: Single entry iteration
// =============================================================================
#[test]
fn iterator_single_entry() {
    let mut sl = SkipList::new();
    sl.insert(b"key".to_vec(), b"value".to_vec());

    let mut iter = sl.iter();
    assert!(iter.is_valid());
    assert_eq!(iter.key(), b"key");
    assert_eq!(iter.value(), b"value");

    iter.next().unwrap();
    assert!(!iter.is_valid());

    // Advancing an exhausted iterator is a no-op.
    iter.next().unwrap();
    assert!(!iter.is_valid());
}

// =============================================================================
// Test 3: Multiple entries come out sorted
// =============================================================================
#[test]
fn iterator_returns_sorted_order() {
    let mut sl = SkipList::new();
    sl.insert(b"charlie".to_vec(), b"3".to_vec());
    sl.insert(b"alpha".to_vec(), b"1".to_vec());
    sl.insert(b"bravo".to_vec(), b"2".to_vec());

    let expected: [(&[u8], &[u8]); 3] = [(b"alpha", b"1"), (b"bravo", b"2"), (b"charlie", b"3")];

    let mut iter = sl.iter();
    for (key, value) in expected {
        assert!(iter.is_valid());
        assert_eq!(iter.key(), key);
        assert_eq!(iter.value(), value);
        iter.next().unwrap();
    }
    assert!(!iter.is_valid());
}

// =============================================================================
// Test 4: Collect all entries
// =============================================================================
#[test]
fn iterator_collect_all_entries() {
    let mut sl = SkipList::new();
    for i in (0..100u32).rev() {
        let key = format!("key_{:03}", i).into_bytes();
        let val = format!("val_{}", i).into_bytes();
        sl.insert(key, val);
    }

    let mut iter = sl.iter();
    let mut collected = Vec::new();
    while iter.is_valid() {
        collected.push((iter.key().to_vec(), iter.value().to_vec()));
        iter.next().unwrap();
    }

    assert_eq!(collected.len(), 100);
    for i in 0..100u32 {
        assert_eq!(collected[i as usize].0, format!("key_{:03}", i).into_bytes());
        assert_eq!(collected[i as usize].1, format!("val_{}", i).into_bytes());
    }
}

// =============================================================================
// Test 5: Restartable
// =============================================================================
// Calling iter() again starts from the first entry.
#[test]
fn iterator_restarts_from_the_beginning() {
    let mut sl = SkipList::new();
    sl.insert(b"a".to_vec(), b"1".to_vec());
    sl.insert(b"b".to_vec(), b"2".to_vec());

    let mut first = sl.iter();
    first.next().unwrap();
    first.next().unwrap();
    assert!(!first.is_valid());

    let second = sl.iter();
    assert!(second.is_valid());
    assert_eq!(second.key(), b"a");
}

// =============================================================================
// Test 6: Deleted entries are skipped
// =============================================================================
#[test]
fn iterator_skips_deleted_entries() {
    let mut sl = SkipList::new();
    sl.insert(b"a".to_vec(), b"1".to_vec());
    sl.insert(b"b".to_vec(), b"2".to_vec());
    sl.insert(b"c".to_vec(), b"3".to_vec());
    sl.delete(b"b").unwrap();

    let mut iter = sl.iter();
    assert_eq!(iter.key(), b"a");
    iter.next().unwrap();
    assert_eq!(iter.key(), b"c");
    iter.next().unwrap();
    assert!(!iter.is_valid());
}

// =============================================================================
// Test 7: Seek to existing key
// =============================================================================
#[test]
fn iterator_seek_to_existing_key() {
    let mut sl = SkipList::new();
    sl.insert(b"a".to_vec(), b"1".to_vec());
    sl.insert(b"c".to_vec(), b"3".to_vec());
    sl.insert(b"e".to_vec(), b"5".to_vec());

    let mut iter = sl.iter();
    iter.seek(b"c").unwrap();

    assert!(iter.is_valid());
    assert_eq!(iter.key(), b"c");
    assert_eq!(iter.value(), b"3");
}

// =============================================================================
// Test 8: Seek to non-existing key (lands on next)
// =============================================================================
#[test]
fn iterator_seek_to_nonexistent_key() {
    let mut sl = SkipList::new();
    sl.insert(b"a".to_vec(), b"1".to_vec());
    sl.insert(b"c".to_vec(), b"3".to_vec());
    sl.insert(b"e".to_vec(), b"5".to_vec());

    let mut iter = sl.iter();
    iter.seek(b"b").unwrap();

    assert!(iter.is_valid());
    assert_eq!(iter.key(), b"c");
}

// =============================================================================
// Test 9: Seek past all entries
// =============================================================================
#[test]
fn iterator_seek_past_end() {
    let mut sl = SkipList::new();
    sl.insert(b"a".to_vec(), b"1".to_vec());
    sl.insert(b"b".to_vec(), b"2".to_vec());

    let mut iter = sl.iter();
    iter.seek(b"z").unwrap();

    assert!(!iter.is_valid());
}

// =============================================================================
// Test 10: Seek backwards
// =============================================================================
// Seeking to a key before the current position goes back.
#[test]
fn iterator_seek_backwards() {
    let mut sl = SkipList::new();
    sl.insert(b"b".to_vec(), b"2".to_vec());
    sl.insert(b"c".to_vec(), b"3".to_vec());

    let mut iter = sl.iter();
    iter.seek(b"c").unwrap();
    iter.seek(b"a").unwrap();

    assert!(iter.is_valid());
    assert_eq!(iter.key(), b"b");
}
