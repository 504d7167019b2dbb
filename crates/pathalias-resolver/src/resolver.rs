//! The alias resolver: per-request lookup caching, whitelist
//! short-circuiting, language-fallback lookups and write-through with
//! best-effort mirroring.
//!
//! [`ResolverContext`] owns everything shared across requests (the two
//! storage backends, the whitelist, the prefetch cache, the flush
//! coordinator, the event broadcaster); [`AliasResolver`] is built from it
//! once per inbound request and owns the session-scoped cache.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use pathalias_core::{AliasEvent, AliasRecord, EventBroadcaster, Language, first_segment};
use pathalias_storage::{AliasFilter, DynAliasStorage, StorageError, StorageResult};

use crate::config::ResolverConfig;
use crate::error::Result;
use crate::flush::FlushCoordinator;
use crate::prefetch::PrefetchPathCache;
use crate::session::RequestCache;
use crate::settings::SettingsStore;
use crate::whitelist::WhitelistCache;

/// Process-wide resolver wiring.
///
/// Cheap to clone; all shared parts are behind `Arc`. The only
/// cross-request mutable state lives in the storage backends, the settings
/// store (whitelist snapshot, flush marker) and the prefetch cache.
#[derive(Clone)]
pub struct ResolverContext {
    primary: DynAliasStorage,
    cache_store: Option<DynAliasStorage>,
    settings: Arc<dyn SettingsStore>,
    prefetch: Arc<dyn PrefetchPathCache>,
    whitelist: Arc<WhitelistCache>,
    flush: Arc<FlushCoordinator>,
    broadcaster: Arc<EventBroadcaster>,
    config: ResolverConfig,
}

impl ResolverContext {
    /// Creates a context over the authoritative store.
    ///
    /// The whitelist cache rebuilds from `primary` and persists through
    /// `settings`; the flush coordinator shares the same settings store.
    pub fn new(
        primary: DynAliasStorage,
        settings: Arc<dyn SettingsStore>,
        prefetch: Arc<dyn PrefetchPathCache>,
        config: ResolverConfig,
    ) -> Self {
        let whitelist = Arc::new(WhitelistCache::with_key(
            Arc::clone(&settings),
            Arc::clone(&primary),
            config.whitelist_key.clone(),
        ));
        let flush = Arc::new(FlushCoordinator::new(
            Arc::clone(&settings),
            config.flush_debounce(),
        ));
        Self {
            primary,
            cache_store: None,
            settings,
            prefetch,
            whitelist,
            flush,
            broadcaster: EventBroadcaster::new_shared(),
            config,
        }
    }

    /// Attaches the secondary cache store. Reads will prefer it and fall
    /// back to the primary; writes mirror to it best-effort.
    #[must_use]
    pub fn with_cache_store(mut self, cache_store: DynAliasStorage) -> Self {
        self.cache_store = Some(cache_store);
        self
    }

    /// Replaces the event broadcaster (to share one bus across engines).
    #[must_use]
    pub fn with_broadcaster(mut self, broadcaster: Arc<EventBroadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    /// The whitelist cache.
    pub fn whitelist(&self) -> &Arc<WhitelistCache> {
        &self.whitelist
    }

    /// The flush coordinator.
    pub fn flush(&self) -> &Arc<FlushCoordinator> {
        &self.flush
    }

    /// The alias-change event broadcaster.
    pub fn broadcaster(&self) -> &Arc<EventBroadcaster> {
        &self.broadcaster
    }

    /// The per-page prefetch cache.
    pub fn prefetch(&self) -> &Arc<dyn PrefetchPathCache> {
        &self.prefetch
    }

    /// The injected settings store.
    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        &self.settings
    }

    /// Runs the debounced heavy invalidation if one is due. Returns `true`
    /// for the caller that performed it.
    pub fn run_pending_flush(&self) -> bool {
        self.flush.run_pending(self.prefetch.as_ref())
    }

    /// Builds the resolver for one inbound request.
    ///
    /// `page_key` identifies the current page in the prefetch cache
    /// (typically the request's base path); `None` disables the bulk
    /// prefetch for this request. Also gives the debounced flush a chance
    /// to run, so a pending flush is picked up by request traffic.
    pub fn new_request(&self, page_key: Option<&str>) -> AliasResolver {
        self.run_pending_flush();
        AliasResolver {
            primary: Arc::clone(&self.primary),
            cache_store: self.cache_store.clone(),
            whitelist: Arc::clone(&self.whitelist),
            prefetch: Arc::clone(&self.prefetch),
            broadcaster: Arc::clone(&self.broadcaster),
            prefetch_enabled: self.config.prefetch_enabled,
            page_key: page_key.map(str::to_string),
            cache: Mutex::new(RequestCache::new()),
        }
    }
}

impl std::fmt::Debug for ResolverContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverContext")
            .field("primary", &self.primary.backend_name())
            .field(
                "cache_store",
                &self.cache_store.as_ref().map(|s| s.backend_name()),
            )
            .finish()
    }
}

/// Per-request alias resolver.
///
/// Within a request resolution is synchronous from the caller's point of
/// view; the session cache mutex is uncontended in the one-resolver-per-
/// request model and only makes the shared-reference API possible.
pub struct AliasResolver {
    primary: DynAliasStorage,
    cache_store: Option<DynAliasStorage>,
    whitelist: Arc<WhitelistCache>,
    prefetch: Arc<dyn PrefetchPathCache>,
    broadcaster: Arc<EventBroadcaster>,
    prefetch_enabled: bool,
    page_key: Option<String>,
    cache: Mutex<RequestCache>,
}

impl AliasResolver {
    /// Resolves the public alias for a system path in `language`.
    ///
    /// Returns `Ok(None)` when the path has no alias; that answer is as
    /// cacheable as a positive one.
    pub async fn lookup_alias(&self, source: &str, language: &Language) -> Result<Option<String>> {
        {
            let mut cache = self.cache.lock().await;
            if !cache.is_preloaded(language) {
                self.preload(&mut cache, language).await?;
            }
            if let Some(known) = cache.cached_alias(language, source) {
                return Ok(known);
            }
        }

        // The core latency win: paths outside the whitelist can never have
        // an alias, so storage is not consulted at all.
        if !self.whitelist.contains(first_segment(source)).await? {
            return Ok(None);
        }

        let found = self.read_alias(source, language).await?;
        let alias = found.map(|record| record.alias);
        self.cache
            .lock()
            .await
            .insert_alias(language, source, alias.clone());
        Ok(alias)
    }

    /// Reverse resolution: finds the system path behind a public alias.
    pub async fn lookup_source(&self, alias: &str, language: &Language) -> Result<Option<String>> {
        {
            let cache = self.cache.lock().await;
            if cache.is_known_no_source(language, alias) {
                return Ok(None);
            }
            if let Some(source) = cache.reverse_lookup(language, alias) {
                return Ok(Some(source));
            }
        }

        let found = self.read_source(alias, language).await?;
        let mut cache = self.cache.lock().await;
        match &found {
            Some(record) => {
                cache.insert_alias(language, &record.source, Some(record.alias.clone()));
            }
            None => cache.note_no_source(language, alias),
        }
        Ok(found.map(|record| record.source))
    }

    /// Saves an alias record: durable write to the primary store,
    /// best-effort mirror to the cache store, whitelist rebuild, cache
    /// invalidation and change notification.
    ///
    /// Insert-or-update dispatches on `record.id`; an insert writes the
    /// assigned id back into `record`. Returns the emitted event, which
    /// carries the old and new record values.
    pub async fn save(&self, record: &mut AliasRecord) -> Result<AliasEvent> {
        record.validate()?;

        let old = match record.id {
            Some(id) => self.primary.load(&AliasFilter::new().with_id(id)).await?,
            None => None,
        };
        self.primary.save(record).await?;
        self.mirror_save(old.as_ref(), record).await;

        // The new alias must be visible to lookups immediately: rebuild the
        // whitelist before touching the session cache.
        self.whitelist.rebuild(Some(&record.source)).await?;

        {
            let mut cache = self.cache.lock().await;
            cache.purge_source(&record.source);
            cache.purge_alias(&record.alias);
            if let Some(old) = &old {
                cache.purge_source(&old.source);
                cache.purge_alias(&old.alias);
            }
        }
        self.prefetch.invalidate(&record.source);
        if let Some(old) = &old
            && old.source != record.source
        {
            self.prefetch.invalidate(&old.source);
        }

        let event = match old {
            Some(old) => AliasEvent::updated(old, record.clone()),
            None => AliasEvent::inserted(record.clone()),
        };
        self.emit(&event);
        Ok(event)
    }

    /// Deletes the records matching `filter` from the primary store
    /// (mirrored best-effort), invalidates caches and notifies listeners.
    ///
    /// Returns the best-matching record that existed before the delete, if
    /// any, as the notification payload.
    pub async fn delete(&self, filter: &AliasFilter) -> Result<Option<AliasRecord>> {
        let old = self.primary.load(filter).await?;
        self.primary.delete(filter).await?;
        self.mirror_delete(filter, old.as_ref()).await;

        {
            let mut cache = self.cache.lock().await;
            if let Some(source) = &filter.source {
                cache.purge_source(source);
            }
            if let Some(old) = &old {
                cache.purge_source(&old.source);
                cache.purge_alias(&old.alias);
            }
        }

        if let Some(old) = &old {
            self.prefetch.invalidate(&old.source);
            self.emit(&AliasEvent::deleted(old.clone()));
        }
        Ok(old)
    }

    // ==================== Internals ====================

    /// First-call bulk prefetch: one broad query for every system path the
    /// current page is known to touch, instead of N narrow ones. Paths the
    /// broad query did not return are confirmed negatives.
    async fn preload(&self, cache: &mut RequestCache, language: &Language) -> Result<()> {
        cache.mark_preloaded(language);
        if !self.prefetch_enabled {
            return Ok(());
        }
        let Some(page_key) = &self.page_key else {
            return Ok(());
        };
        if cache.system_paths().is_empty() {
            match self.prefetch.get(page_key) {
                Some(paths) => cache.set_system_paths(paths),
                None => return Ok(()),
            }
        }
        let paths = cache.system_paths().to_vec();
        if paths.is_empty() {
            return Ok(());
        }

        let resolved = self.read_preload(&paths, language).await?;
        for path in &paths {
            cache.insert_alias(language, path, resolved.get(path).cloned());
        }
        debug!(
            page = %page_key,
            language = %language,
            paths = paths.len(),
            hits = resolved.len(),
            "Prefetched page aliases"
        );
        Ok(())
    }

    /// Cache-store-first read. An empty cache-store answer is not final:
    /// a failed best-effort mirror write leaves the record primary-only,
    /// so `Ok(None)` falls through to the primary just like an error does.
    /// The whitelist already filters true negatives before this point.
    async fn read_alias(
        &self,
        source: &str,
        language: &Language,
    ) -> StorageResult<Option<AliasRecord>> {
        if let Some(cache_store) = &self.cache_store {
            match cache_store.lookup_alias(source, language).await {
                Ok(Some(found)) => return Ok(Some(found)),
                Ok(None) => {}
                Err(err) => self.note_degraded(cache_store, &err),
            }
        }
        self.primary.lookup_alias(source, language).await
    }

    async fn read_source(
        &self,
        alias: &str,
        language: &Language,
    ) -> StorageResult<Option<AliasRecord>> {
        if let Some(cache_store) = &self.cache_store {
            match cache_store.lookup_source(alias, language).await {
                Ok(Some(found)) => return Ok(Some(found)),
                Ok(None) => {}
                Err(err) => self.note_degraded(cache_store, &err),
            }
        }
        self.primary.lookup_source(alias, language).await
    }

    async fn read_preload(
        &self,
        paths: &[String],
        language: &Language,
    ) -> StorageResult<std::collections::HashMap<String, String>> {
        let Some(cache_store) = &self.cache_store else {
            return self.primary.preload_aliases(paths, language).await;
        };
        let mut resolved = match cache_store.preload_aliases(paths, language).await {
            Ok(found) => found,
            Err(err) => {
                self.note_degraded(cache_store, &err);
                return self.primary.preload_aliases(paths, language).await;
            }
        };
        // Paths the cache store could not answer may still exist in the
        // primary after a failed mirror write.
        let missing: Vec<String> = paths
            .iter()
            .filter(|path| !resolved.contains_key(*path))
            .cloned()
            .collect();
        if !missing.is_empty() {
            resolved.extend(self.primary.preload_aliases(&missing, language).await?);
        }
        Ok(resolved)
    }

    fn note_degraded(&self, cache_store: &DynAliasStorage, err: &StorageError) {
        warn!(
            backend = cache_store.backend_name(),
            category = %err.category(),
            error = %err,
            "Secondary store unavailable, falling back to primary"
        );
    }

    /// Best-effort write-through: the mirror holds the current winner per
    /// (source, language), so superseded rows are dropped before the fresh
    /// copy is inserted with a mirror-assigned id. Failures degrade the
    /// read path, never the save.
    async fn mirror_save(&self, old: Option<&AliasRecord>, record: &AliasRecord) {
        let Some(cache_store) = &self.cache_store else {
            return;
        };
        let result = async {
            if let Some(old) = old {
                cache_store
                    .delete(
                        &AliasFilter::new()
                            .with_source(old.source.as_str())
                            .with_language(old.language.clone()),
                    )
                    .await?;
            }
            cache_store
                .delete(
                    &AliasFilter::new()
                        .with_source(record.source.as_str())
                        .with_language(record.language.clone()),
                )
                .await?;
            let mut mirrored = record.clone();
            mirrored.id = None;
            cache_store.save(&mut mirrored).await
        }
        .await;
        if let Err(err) = result {
            warn!(
                backend = cache_store.backend_name(),
                error = %err,
                "Best-effort mirror write failed"
            );
        }
    }

    /// Mirrors a delete with the same breadth as the primary delete. A
    /// non-id filter matches the same rows in both stores and passes
    /// through unchanged; mirror ids differ from primary ids, so an
    /// id-based filter is widened to the loaded record's source.
    async fn mirror_delete(&self, filter: &AliasFilter, old: Option<&AliasRecord>) {
        let Some(cache_store) = &self.cache_store else {
            return;
        };
        let mirror = match (filter.id, old) {
            (None, _) => filter.clone(),
            (Some(_), Some(old)) => AliasFilter::new().with_source(old.source.as_str()),
            (Some(_), None) => return,
        };
        if let Err(err) = cache_store.delete(&mirror).await {
            warn!(
                backend = cache_store.backend_name(),
                error = %err,
                "Best-effort mirror delete failed"
            );
        }
    }

    fn emit(&self, event: &AliasEvent) {
        if self.broadcaster.subscriber_count() == 0 {
            return;
        }
        let delivered = self.broadcaster.send(event.clone());
        debug!(
            event = %event.event_type,
            source = event.source_path().unwrap_or_default(),
            subscribers = delivered,
            "Emitted alias event"
        );
    }
}

impl std::fmt::Debug for AliasResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasResolver")
            .field("primary", &self.primary.backend_name())
            .field("page_key", &self.page_key)
            .finish()
    }
}
