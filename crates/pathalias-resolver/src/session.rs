//! Request-scoped resolution cache.
//!
//! One `RequestCache` lives inside each [`crate::AliasResolver`]; it is
//! reset simply by constructing a new resolver for the next request. It
//! remembers every resolution made during the request - positive and
//! negative, in both directions - plus the bulk-prefetch bookkeeping.

use std::collections::{HashMap, HashSet};

use pathalias_core::Language;

/// Per-request memory of resolved aliases.
#[derive(Debug, Default)]
pub struct RequestCache {
    /// language -> (source -> alias); `None` is a confirmed negative.
    map: HashMap<Language, HashMap<String, Option<String>>>,
    /// language -> aliases known to have no source (negative reverse hits).
    no_source: HashMap<Language, HashSet<String>>,
    /// System paths expected to be touched this request, from the per-page
    /// prefetch cache.
    system_paths: Vec<String>,
    /// Languages for which the bulk prefetch has already run.
    preloaded: HashSet<Language>,
}

impl RequestCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached resolution for `source`, if this request has
    /// already resolved it. The outer `Option` is "known at all"; the
    /// inner is positive vs. confirmed negative.
    pub fn cached_alias(&self, language: &Language, source: &str) -> Option<Option<String>> {
        self.map.get(language)?.get(source).cloned()
    }

    /// Records a resolution (positive or negative) for `source`.
    pub fn insert_alias(&mut self, language: &Language, source: &str, alias: Option<String>) {
        self.map
            .entry(language.clone())
            .or_default()
            .insert(source.to_string(), alias);
    }

    /// Scans already-resolved positive entries for one whose alias is
    /// `alias`, returning its source.
    pub fn reverse_lookup(&self, language: &Language, alias: &str) -> Option<String> {
        self.map.get(language)?.iter().find_map(|(source, cached)| {
            (cached.as_deref() == Some(alias)).then(|| source.clone())
        })
    }

    /// Returns `true` if a reverse lookup for `alias` already came back
    /// empty this request.
    pub fn is_known_no_source(&self, language: &Language, alias: &str) -> bool {
        self.no_source
            .get(language)
            .is_some_and(|set| set.contains(alias))
    }

    /// Remembers a negative reverse lookup.
    pub fn note_no_source(&mut self, language: &Language, alias: &str) {
        self.no_source
            .entry(language.clone())
            .or_default()
            .insert(alias.to_string());
    }

    /// Returns `true` if the bulk prefetch has run for `language`.
    pub fn is_preloaded(&self, language: &Language) -> bool {
        self.preloaded.contains(language)
    }

    /// Marks the bulk prefetch as done for `language`.
    pub fn mark_preloaded(&mut self, language: &Language) {
        self.preloaded.insert(language.clone());
    }

    /// Stores the system paths recorded for the current page.
    pub fn set_system_paths(&mut self, paths: Vec<String>) {
        self.system_paths = paths;
    }

    /// The system paths recorded for the current page.
    pub fn system_paths(&self) -> &[String] {
        &self.system_paths
    }

    /// Drops every cached resolution for `source`, in all languages, so a
    /// write becomes visible without waiting for the session to end.
    pub fn purge_source(&mut self, source: &str) {
        for entries in self.map.values_mut() {
            entries.remove(source);
        }
    }

    /// Drops every negative reverse entry for `alias`, in all languages.
    /// A newly saved alias may turn an earlier negative stale.
    pub fn purge_alias(&mut self, alias: &str) {
        for set in self.no_source.values_mut() {
            set.remove(alias);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_and_negative_entries() {
        let mut cache = RequestCache::new();
        let en = Language::new("en");

        assert!(cache.cached_alias(&en, "user/1").is_none());

        cache.insert_alias(&en, "user/1", Some("alice".to_string()));
        cache.insert_alias(&en, "user/2", None);

        assert_eq!(
            cache.cached_alias(&en, "user/1"),
            Some(Some("alice".to_string()))
        );
        // Confirmed negative is a hit too.
        assert_eq!(cache.cached_alias(&en, "user/2"), Some(None));
        // Other languages are unaffected.
        assert!(cache.cached_alias(&Language::new("fr"), "user/1").is_none());
    }

    #[test]
    fn test_reverse_lookup_scans_positives() {
        let mut cache = RequestCache::new();
        let en = Language::new("en");
        cache.insert_alias(&en, "user/1", Some("alice".to_string()));
        cache.insert_alias(&en, "user/2", None);

        assert_eq!(cache.reverse_lookup(&en, "alice"), Some("user/1".to_string()));
        assert!(cache.reverse_lookup(&en, "bob").is_none());
    }

    #[test]
    fn test_no_source_memo() {
        let mut cache = RequestCache::new();
        let en = Language::new("en");

        assert!(!cache.is_known_no_source(&en, "ghost"));
        cache.note_no_source(&en, "ghost");
        assert!(cache.is_known_no_source(&en, "ghost"));

        cache.purge_alias("ghost");
        assert!(!cache.is_known_no_source(&en, "ghost"));
    }

    #[test]
    fn test_purge_source_spans_languages() {
        let mut cache = RequestCache::new();
        cache.insert_alias(&Language::new("en"), "user/1", Some("alice".to_string()));
        cache.insert_alias(&Language::new("fr"), "user/1", Some("alicefr".to_string()));
        cache.insert_alias(&Language::new("en"), "user/2", Some("bob".to_string()));

        cache.purge_source("user/1");
        assert!(cache.cached_alias(&Language::new("en"), "user/1").is_none());
        assert!(cache.cached_alias(&Language::new("fr"), "user/1").is_none());
        assert!(cache.cached_alias(&Language::new("en"), "user/2").is_some());
    }

    #[test]
    fn test_preload_bookkeeping() {
        let mut cache = RequestCache::new();
        let en = Language::new("en");
        assert!(!cache.is_preloaded(&en));
        cache.mark_preloaded(&en);
        assert!(cache.is_preloaded(&en));

        cache.set_system_paths(vec!["node/1".to_string()]);
        assert_eq!(cache.system_paths(), ["node/1".to_string()]);
    }
}
