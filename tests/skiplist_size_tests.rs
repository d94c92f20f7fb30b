// Skip List Size Tracking tests
// size_bytes() is the sum of live key and value lengths.

use lsm_core::memtable::skiplist::SkipList;

// =============================================================================
// Test 1: Empty skip list size
// =============================================================================
#[test]
fn empty_skiplist_size_is_zero() {
    let sl = SkipList::new();
    assert_eq!(sl.size_bytes(), 0);
}

// =============================================================================
// Test 2: Size grows by key + value on insert
// =============================================================================
#[test]
fn size_increases_after_insert() {
    let mut sl = SkipList::new();
    sl.insert(b"hello".to_vec(), b"world".to_vec());
    assert_eq!(sl.size_bytes(), 10);
}

// =============================================================================
// Test 3: Overwrite swaps the old value's size for the new one
// =============================================================================
#[test]
fn overwrite_tracks_value_length() {
    let mut sl = SkipList::new();
    sl.insert(b"key".to_vec(), b"small".to_vec());
    assert_eq!(sl.size_bytes(), 8);

    sl.insert(b"key".to_vec(), b"much larger value".to_vec());
    assert_eq!(sl.size_bytes(), 3 + 17);

    sl.insert(b"key".to_vec(), b"x".to_vec());
    assert_eq!(sl.size_bytes(), 4);
}

// =============================================================================
// Test 4: Delete gives the bytes back
// =============================================================================
#[test]
fn delete_releases_size() {
    let mut sl = SkipList::new();
    sl.insert(b"key1".to_vec(), b"value1".to_vec());
    sl.insert(b"key2".to_vec(), b"value2".to_vec());
    assert_eq!(sl.size_bytes(), 20);

    sl.delete(b"key1").unwrap();
    assert_eq!(sl.size_bytes(), 10);

    // Failed delete changes nothing.
    assert!(sl.delete(b"key1").is_err());
    assert_eq!(sl.size_bytes(), 10);
}

// =============================================================================
// Test 5: Multiple inserts accumulate size
// =============================================================================
#[test]
fn multiple_inserts_accumulate_size() {
    let mut sl = SkipList::new();

    let entries = vec![
        (b"key1".to_vec(), b"value1".to_vec()),
        (b"key2".to_vec(), b"value2".to_vec()),
        (b"key3".to_vec(), b"value3".to_vec()),
    ];

    let total_data_size: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();

    for (k, v) in entries {
        sl.insert(k, v);
    }

    assert_eq!(sl.size_bytes(), total_data_size);
}
