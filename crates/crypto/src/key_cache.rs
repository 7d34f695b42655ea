//! Derived-key cache

use dashmap::DashMap;

use crate::kdf::{DerivedKey, SharedSecret};

/// Default upper bound on cached keys
pub const DEFAULT_KEY_CACHE_CAPACITY: usize = 1024;

/// Thread-safe cache of derived keys
///
/// Keyed by `(secret version, context)`, so keys derived under an older
/// secret are never served once the version changes. Holds at most
/// `capacity` keys; inserts beyond that are dropped.
pub struct KeyCache {
    keys: DashMap<(u32, String), DerivedKey>,
    capacity: usize,
}

impl Default for KeyCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_KEY_CACHE_CAPACITY)
    }
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: DashMap::new(),
            capacity,
        }
    }

    /// Cached key for `context` under the secret's current version
    pub fn get(&self, secret: &SharedSecret, context: &str) -> Option<DerivedKey> {
        self.keys
            .get(&(secret.version(), context.to_owned()))
            .map(|key| key.clone())
    }

    /// Store a key the caller has already used successfully
    ///
    /// Returns false when the cache is full and `context` is not yet cached.
    pub fn insert(&self, secret: &SharedSecret, context: &str, key: DerivedKey) -> bool {
        let cache_key = (secret.version(), context.to_owned());
        if !self.keys.contains_key(&cache_key) && self.keys.len() >= self.capacity {
            return false;
        }
        self.keys.insert(cache_key, key);
        true
    }

    /// Drop every key derived under `version`
    pub fn evict_version(&self, version: u32) {
        self.keys.retain(|(v, _), _| *v != version);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&self) {
        self.keys.clear();
    }
}
