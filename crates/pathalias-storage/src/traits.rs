//! Storage traits for the alias storage abstraction layer.
//!
//! This module defines the contract that both the system-of-record store and
//! the secondary cache store implement with identical semantics.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use pathalias_core::{AliasId, AliasRecord, Language};

use crate::error::StorageError;
use crate::types::AliasFilter;

/// The storage contract consumed by the resolver.
///
/// Implementations must be thread-safe (`Send + Sync`). Every operation is a
/// single storage-level call, atomic at that layer; the resolver performs no
/// multi-step transactions across calls.
///
/// An implementation that cannot reach its underlying medium fails the whole
/// operation with [`StorageError::Connection`]; it never returns `Ok(None)`
/// to mask an outage. Falling back to another backend is the resolver's job,
/// not the backend's.
#[async_trait]
pub trait AliasStorage: Send + Sync {
    // ==================== Loads ====================

    /// Loads the single best record matching a conjunction filter.
    ///
    /// "Best" is the match with the largest id (most recently created).
    /// Returns `Ok(None)` when nothing matches - not-found is not an error.
    async fn load(&self, filter: &AliasFilter) -> Result<Option<AliasRecord>, StorageError>;

    /// Looks up the alias for a system path in the given language, applying
    /// the language-fallback ordering from `pathalias_core::language`.
    ///
    /// Both backends must reproduce that ordering exactly: it decides which
    /// of several historical records for the same source wins.
    async fn lookup_alias(
        &self,
        source: &str,
        language: &Language,
    ) -> Result<Option<AliasRecord>, StorageError>;

    /// Reverse lookup: finds the system path behind a public alias in the
    /// given language, with the same fallback ordering.
    async fn lookup_source(
        &self,
        alias: &str,
        language: &Language,
    ) -> Result<Option<AliasRecord>, StorageError>;

    /// Bulk prefetch: resolves the best alias for each of `sources` in one
    /// broad query. The result maps source path to winning alias; sources
    /// without any alias are absent from the map.
    async fn preload_aliases(
        &self,
        sources: &[String],
        language: &Language,
    ) -> Result<HashMap<String, String>, StorageError>;

    // ==================== Writes ====================

    /// Upserts a record: update when `record.id` is set, insert otherwise.
    /// An insert assigns a new id into the record (out-parameter semantics).
    /// Recomputes `first_segment` from `source` on every save.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidRecord`] before any write when the
    /// record fails validation, or when an update names an unknown id.
    async fn save(&self, record: &mut AliasRecord) -> Result<(), StorageError>;

    /// Removes all records matching the filter. Safe to call with zero
    /// matches; returns nothing either way.
    async fn delete(&self, filter: &AliasFilter) -> Result<(), StorageError>;

    // ==================== Whitelist ====================

    /// Returns the distinct `first_segment` values across all stored
    /// records. Defined to be expensive - callers must cache the result.
    async fn whitelist(&self) -> Result<BTreeSet<String>, StorageError>;

    // ==================== Traversal ====================

    /// Returns up to `limit` records with `id > min_id`, ordered by id
    /// ascending. Restartable: pass the last seen id to continue. Used only
    /// by the import/sync job.
    async fn records_after(
        &self,
        min_id: AliasId,
        limit: usize,
    ) -> Result<Vec<AliasRecord>, StorageError>;

    // ==================== Maintenance ====================

    /// Removes all records and drops any auxiliary indexes. Used for test
    /// teardown and full resync.
    async fn clear(&self) -> Result<(), StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
