use crate::ring::KeySpace;
use crate::storage::store::{KeyStore, PutOutcome};

fn space() -> KeySpace {
    KeySpace::new(4).unwrap()
}

/// Find a key hashing to `id` under `space`.
fn key_with_id(space: KeySpace, id: u64) -> String {
    (0..10_000)
        .map(|i| format!("key-{}", i))
        .find(|k| space.hash(k) == id)
        .expect("no key found for id")
}

#[test]
fn get_returns_stored_value() {
    let store = KeyStore::new(space());
    assert_eq!(store.put_if_absent("foo", "bar".to_string()), PutOutcome::Inserted);
    assert_eq!(store.get("foo"), Some("bar".to_string()));
}

#[test]
fn get_missing_key_is_none() {
    let store = KeyStore::new(space());
    assert_eq!(store.get("baz"), None);
}

#[test]
fn keys_are_write_once() {
    let store = KeyStore::new(space());
    assert_eq!(store.put_if_absent("foo", "bar".to_string()), PutOutcome::Inserted);
    assert_eq!(
        store.put_if_absent("foo", "qux".to_string()),
        PutOutcome::AlreadyPresent
    );
    // The first value survives the rejected overwrite.
    assert_eq!(store.get("foo"), Some("bar".to_string()));
}

#[test]
fn delete_removes_and_reports() {
    let store = KeyStore::new(space());
    store.put_if_absent("foo", "bar".to_string());
    assert!(store.delete("foo"));
    assert!(!store.delete("foo"));
    assert_eq!(store.get("foo"), None);
    assert!(store.is_empty());
}

#[test]
fn deleted_key_can_be_written_again() {
    let store = KeyStore::new(space());
    store.put_if_absent("foo", "bar".to_string());
    store.delete("foo");
    assert_eq!(store.put_if_absent("foo", "qux".to_string()), PutOutcome::Inserted);
    assert_eq!(store.get("foo"), Some("qux".to_string()));
}

#[test]
fn scan_range_selects_by_hashed_key() {
    let space = space();
    let store = KeyStore::new(space);

    // One key per id so arc membership is fully predictable.
    for id in 0..space.size() {
        let key = key_with_id(space, id);
        store.put_if_absent(&key, format!("value-{}", id));
    }

    let picked = store.scan_range(4, 8);
    let mut ids: Vec<u64> = picked.iter().map(|(k, _)| space.hash(k)).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![5, 6, 7, 8]);
}

#[test]
fn scan_range_wraps_around_zero() {
    let space = space();
    let store = KeyStore::new(space);
    for id in 0..space.size() {
        store.put_if_absent(&key_with_id(space, id), String::new());
    }

    let picked = store.scan_range(13, 2);
    let mut ids: Vec<u64> = picked.iter().map(|(k, _)| space.hash(k)).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2, 14, 15]);
}

#[test]
fn scan_range_degenerate_arc_is_ring_minus_endpoint() {
    let space = space();
    let store = KeyStore::new(space);
    for id in 0..space.size() {
        store.put_if_absent(&key_with_id(space, id), String::new());
    }

    let picked = store.scan_range(6, 6);
    assert_eq!(picked.len() as u64, space.size() - 1);
    assert!(picked.iter().all(|(k, _)| space.hash(k) != 6));
}

#[test]
fn entries_copies_the_whole_store() {
    let store = KeyStore::new(space());
    store.put_if_absent("a", "1".to_string());
    store.put_if_absent("b", "2".to_string());

    let mut entries = store.entries();
    entries.sort();
    assert_eq!(
        entries,
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string())
        ]
    );
    assert_eq!(store.len(), 2);
}
