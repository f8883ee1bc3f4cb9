use std::collections::HashMap;
use std::sync::RwLock;

use crate::ring::{in_half_open_right, KeySpace};

/// Result of a write-once insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Inserted,
    AlreadyPresent,
}

/// In-memory mapping from key to value for the locally-owned arc.
///
/// A single `RwLock` serializes every mutation with respect to every other
/// operation while still letting reads run concurrently. Entries are copied
/// out under the lock; nothing is transmitted while holding it.
pub struct KeyStore {
    space: KeySpace,
    entries: RwLock<HashMap<String, String>>,
}

impl KeyStore {
    pub fn new(space: KeySpace) -> Self {
        Self {
            space,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    /// Insert `value` under `key` unless the key is already present.
    /// Keys are write-once from the client's perspective.
    pub fn put_if_absent(&self, key: &str, value: String) -> PutOutcome {
        let mut entries = self.entries.write().unwrap();
        if entries.contains_key(key) {
            PutOutcome::AlreadyPresent
        } else {
            entries.insert(key.to_string(), value);
            PutOutcome::Inserted
        }
    }

    pub fn delete(&self, key: &str) -> bool {
        self.entries.write().unwrap().remove(key).is_some()
    }

    /// Every entry whose hashed key lies in the half-open arc `(lo, hi]`.
    pub fn scan_range(&self, lo: u64, hi: u64) -> Vec<(String, String)> {
        self.entries
            .read()
            .unwrap()
            .iter()
            .filter(|(key, _)| in_half_open_right(lo, self.space.hash(key), hi))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Copy of every entry, for whole-store transfer on leave.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries
            .read()
            .unwrap()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}
