//! The whitelist cache of first path segments.
//!
//! Most requested paths have no alias at all; querying storage for every
//! miss is wasteful. Aliasable paths cluster by their top-level segment
//! (e.g. all `node/...` paths), so a small set of first segments is enough
//! to rule out storage round-trips for everything else.
//!
//! The whitelist may be stale-permissive (naming segments that no longer
//! have any alias) but must not stay stale-restrictive: every save runs
//! `rebuild` with the new source as a hint before the alias becomes
//! visible to lookups.

use std::collections::BTreeSet;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::{debug, warn};

use pathalias_core::first_segment;
use pathalias_storage::{DynAliasStorage, StorageError};

use crate::settings::SettingsStore;

/// Default settings-store key for the persisted whitelist snapshot.
pub const DEFAULT_WHITELIST_KEY: &str = "pathalias.whitelist";

/// Process-wide cache of first path segments that have at least one alias.
///
/// The in-process copy is replaced whole-value; concurrent rebuilds by two
/// requests are safe but wasteful - each computes the same result and the
/// last write wins. Convergence, not mutual exclusion.
pub struct WhitelistCache {
    settings: Arc<dyn SettingsStore>,
    storage: DynAliasStorage,
    key: String,
    cached: ArcSwapOption<BTreeSet<String>>,
}

impl WhitelistCache {
    /// Creates a whitelist cache persisting under the default key,
    /// rebuilding from the given (authoritative) storage backend.
    pub fn new(settings: Arc<dyn SettingsStore>, storage: DynAliasStorage) -> Self {
        Self::with_key(settings, storage, DEFAULT_WHITELIST_KEY)
    }

    /// Creates a whitelist cache persisting under a custom settings key.
    pub fn with_key(
        settings: Arc<dyn SettingsStore>,
        storage: DynAliasStorage,
        key: impl Into<String>,
    ) -> Self {
        Self {
            settings,
            storage,
            key: key.into(),
            cached: ArcSwapOption::empty(),
        }
    }

    /// Loads the whitelist if this process has not yet done so: from the
    /// persisted setting when available, otherwise by a full rebuild from
    /// storage.
    pub async fn ensure(&self) -> Result<(), StorageError> {
        if self.cached.load().is_some() {
            return Ok(());
        }
        if let Some(raw) = self.settings.get(&self.key) {
            match serde_json::from_str::<BTreeSet<String>>(&raw) {
                Ok(set) => {
                    self.cached.store(Some(Arc::new(set)));
                    return Ok(());
                }
                Err(err) => {
                    warn!(key = %self.key, error = %err, "Discarding unreadable whitelist snapshot");
                }
            }
        }
        self.rebuild_full().await
    }

    /// O(1) membership test for a first path segment. Loads the whitelist
    /// on first use.
    pub async fn contains(&self, segment: &str) -> Result<bool, StorageError> {
        self.ensure().await?;
        Ok(self
            .cached
            .load()
            .as_ref()
            .is_some_and(|set| set.contains(segment)))
    }

    /// Rebuilds the whitelist from storage and persists it.
    ///
    /// When `hint_source` is given and its first segment is already a
    /// member, the cached whitelist is returned unchanged - the common
    /// "another alias under a known segment" case costs nothing.
    pub async fn rebuild(&self, hint_source: Option<&str>) -> Result<(), StorageError> {
        if let Some(hint) = hint_source {
            let segment = first_segment(hint);
            if self.contains(segment).await? {
                debug!(segment, "Whitelist already covers segment, skipping rebuild");
                return Ok(());
            }
        }
        self.rebuild_full().await
    }

    /// Drops the in-process copy, forcing the next `ensure` to reload from
    /// the persisted setting or storage.
    pub fn reset(&self) {
        self.cached.store(None);
    }

    async fn rebuild_full(&self) -> Result<(), StorageError> {
        let set = self.storage.whitelist().await?;
        debug!(
            backend = self.storage.backend_name(),
            segments = set.len(),
            "Rebuilt alias whitelist"
        );
        let raw = serde_json::to_string(&set)
            .map_err(|err| StorageError::internal(err.to_string()))?;
        self.settings.set(&self.key, raw);
        self.cached.store(Some(Arc::new(set)));
        Ok(())
    }
}

impl std::fmt::Debug for WhitelistCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhitelistCache")
            .field("key", &self.key)
            .field("loaded", &self.cached.load().is_some())
            .finish()
    }
}
