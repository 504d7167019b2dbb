//! The per-page path prefetch cache.
//!
//! An upstream layer records which system paths each page touches, keyed by
//! the request's base path. On the first lookup of a request the resolver
//! reads that entry and resolves all of those paths with one broad storage
//! query instead of N narrow ones. The resolver invalidates single entries
//! on writes and drops the whole cache during a debounced global flush.

use papaya::HashMap as PapayaHashMap;

/// Cache of "system paths touched by this page", keyed by page.
pub trait PrefetchPathCache: Send + Sync {
    /// Returns the recorded system paths for a page key.
    fn get(&self, key: &str) -> Option<Vec<String>>;

    /// Records the system paths for a page key, replacing any prior entry.
    fn set(&self, key: &str, paths: Vec<String>);

    /// Drops the entry for a single page key.
    fn invalidate(&self, key: &str);

    /// Drops every entry. This is the heavy step the flush coordinator
    /// debounces.
    fn clear(&self);
}

/// In-memory prefetch cache on a lock-free map.
#[derive(Debug, Default)]
pub struct MemoryPrefetchCache {
    entries: PapayaHashMap<String, Vec<String>>,
}

impl MemoryPrefetchCache {
    /// Creates a new empty prefetch cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached pages.
    pub fn len(&self) -> usize {
        self.entries.pin().len()
    }

    /// Returns `true` if no pages are cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PrefetchPathCache for MemoryPrefetchCache {
    fn get(&self, key: &str) -> Option<Vec<String>> {
        self.entries.pin().get(key).cloned()
    }

    fn set(&self, key: &str, paths: Vec<String>) {
        self.entries.pin().insert(key.to_string(), paths);
    }

    fn invalidate(&self, key: &str) {
        self.entries.pin().remove(key);
    }

    fn clear(&self) {
        self.entries.pin().clear();
    }
}
