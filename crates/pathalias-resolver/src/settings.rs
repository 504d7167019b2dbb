//! The persisted settings store.
//!
//! The whitelist snapshot and the flush marker are the only two values the
//! resolver shares across requests. They are modeled as an injected
//! key-value store rather than process globals so they stay testable and
//! swappable for a durable implementation.

use papaya::HashMap as PapayaHashMap;

/// A small persisted string key-value store with no TTL.
///
/// `remove` must be atomic: when several requests race to take the same
/// key, exactly one of them may receive the prior value. The flush
/// coordinator relies on this for its exactly-once step.
pub trait SettingsStore: Send + Sync {
    /// Returns the value for `key`, if set.
    fn get(&self, key: &str) -> Option<String>;

    /// Sets `key` to `value`, replacing any prior value.
    fn set(&self, key: &str, value: String);

    /// Removes `key`, returning the prior value if one was set.
    fn remove(&self, key: &str) -> Option<String>;
}

/// In-memory settings store on a lock-free map.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: PapayaHashMap<String, String>,
}

impl MemorySettings {
    /// Creates a new empty settings store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.pin().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.values.pin().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) -> Option<String> {
        self.values.pin().remove(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let settings = MemorySettings::new();
        assert!(settings.get("k").is_none());

        settings.set("k", "v1".to_string());
        assert_eq!(settings.get("k").as_deref(), Some("v1"));

        settings.set("k", "v2".to_string());
        assert_eq!(settings.get("k").as_deref(), Some("v2"));

        assert_eq!(settings.remove("k").as_deref(), Some("v2"));
        assert!(settings.get("k").is_none());
        assert!(settings.remove("k").is_none());
    }

    #[test]
    fn test_remove_is_taken_once() {
        use std::sync::Arc;
        use std::thread;

        let settings = Arc::new(MemorySettings::new());
        settings.set("marker", "1".to_string());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let settings = Arc::clone(&settings);
            handles.push(thread::spawn(move || settings.remove("marker").is_some()));
        }

        let taken = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|taken| *taken)
            .count();
        assert_eq!(taken, 1);
    }
}
