use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use papaya::HashMap as PapayaHashMap;

use pathalias_core::{AliasId, AliasRecord, Language, best_match, compare_candidates, is_candidate};
use pathalias_storage::{AliasFilter, AliasStorage, StorageError};

/// In-memory alias storage backend using a papaya lock-free HashMap.
///
/// Records are keyed by their storage-assigned id; ids come from an atomic
/// counter and are never reused, so "largest id" is the most recently
/// created record. Superseded records are not removed - lookup precedence
/// alone decides the winner, matching the contract.
#[derive(Debug, Default)]
pub struct InMemoryAliasStorage {
    /// Main storage using papaya for lock-free concurrent access
    records: PapayaHashMap<AliasId, AliasRecord>,
    /// Atomic counter for assigning record ids
    next_id: AtomicU64,
}

impl InMemoryAliasStorage {
    /// Creates a new empty in-memory storage.
    pub fn new() -> Self {
        Self {
            records: PapayaHashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.pin().len()
    }

    /// Returns `true` if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn assign_id(&self) -> AliasId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn collect_matching(&self, filter: &AliasFilter) -> Vec<AliasRecord> {
        let guard = self.records.pin();
        guard
            .iter()
            .filter(|(_, record)| filter.matches(record))
            .map(|(_, record)| record.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl AliasStorage for InMemoryAliasStorage {
    async fn load(&self, filter: &AliasFilter) -> Result<Option<AliasRecord>, StorageError> {
        let mut matching = self.collect_matching(filter);
        matching.sort_by_key(|record| record.id);
        Ok(matching.pop())
    }

    async fn lookup_alias(
        &self,
        source: &str,
        language: &Language,
    ) -> Result<Option<AliasRecord>, StorageError> {
        let guard = self.records.pin();
        let candidates: Vec<&AliasRecord> = guard
            .iter()
            .map(|(_, record)| record)
            .filter(|record| record.source == source && is_candidate(language, &record.language))
            .collect();
        Ok(best_match(language, candidates).cloned())
    }

    async fn lookup_source(
        &self,
        alias: &str,
        language: &Language,
    ) -> Result<Option<AliasRecord>, StorageError> {
        let guard = self.records.pin();
        let candidates: Vec<&AliasRecord> = guard
            .iter()
            .map(|(_, record)| record)
            .filter(|record| record.alias == alias && is_candidate(language, &record.language))
            .collect();
        Ok(best_match(language, candidates).cloned())
    }

    async fn preload_aliases(
        &self,
        sources: &[String],
        language: &Language,
    ) -> Result<HashMap<String, String>, StorageError> {
        let wanted: HashSet<&str> = sources.iter().map(String::as_str).collect();
        let mut winners: HashMap<String, AliasRecord> = HashMap::new();

        let guard = self.records.pin();
        for (_, record) in guard.iter() {
            if !wanted.contains(record.source.as_str())
                || !is_candidate(language, &record.language)
            {
                continue;
            }
            match winners.get(&record.source) {
                Some(current)
                    if compare_candidates(
                        language,
                        (&current.language, current.id.unwrap_or(0)),
                        (&record.language, record.id.unwrap_or(0)),
                    ) != std::cmp::Ordering::Greater =>
                {
                    // current row already wins
                }
                _ => {
                    winners.insert(record.source.clone(), record.clone());
                }
            }
        }

        Ok(winners
            .into_iter()
            .map(|(source, record)| (source, record.alias))
            .collect())
    }

    async fn save(&self, record: &mut AliasRecord) -> Result<(), StorageError> {
        record.validate()?;
        record.refresh_first_segment();

        let guard = self.records.pin();
        match record.id {
            Some(id) => {
                if guard.get(&id).is_none() {
                    return Err(StorageError::invalid_record(format!(
                        "cannot update unknown alias record id {id}"
                    )));
                }
                guard.insert(id, record.clone());
            }
            None => {
                let id = self.assign_id();
                record.id = Some(id);
                guard.insert(id, record.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, filter: &AliasFilter) -> Result<(), StorageError> {
        let ids: Vec<AliasId> = self
            .collect_matching(filter)
            .into_iter()
            .filter_map(|record| record.id)
            .collect();

        let guard = self.records.pin();
        for id in ids {
            guard.remove(&id);
        }
        Ok(())
    }

    async fn whitelist(&self) -> Result<BTreeSet<String>, StorageError> {
        let guard = self.records.pin();
        Ok(guard
            .iter()
            .map(|(_, record)| record.first_segment.clone())
            .collect())
    }

    async fn records_after(
        &self,
        min_id: AliasId,
        limit: usize,
    ) -> Result<Vec<AliasRecord>, StorageError> {
        let guard = self.records.pin();
        let mut page: Vec<AliasRecord> = guard
            .iter()
            .filter(|(id, _)| **id > min_id)
            .map(|(_, record)| record.clone())
            .collect();
        page.sort_by_key(|record| record.id);
        page.truncate(limit);
        Ok(page)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.records.pin().clear();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn saved(
        storage: &InMemoryAliasStorage,
        source: &str,
        alias: &str,
        language: Language,
    ) -> AliasRecord {
        let mut record = AliasRecord::new(source, alias, language);
        storage.save(&mut record).await.unwrap();
        record
    }

    #[tokio::test]
    async fn test_save_assigns_monotonic_ids() {
        let storage = InMemoryAliasStorage::new();
        let a = saved(&storage, "user/1", "one", Language::neutral()).await;
        let b = saved(&storage, "user/2", "two", Language::neutral()).await;
        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));
        assert_eq!(storage.len(), 2);
    }

    #[tokio::test]
    async fn test_save_updates_in_place() {
        let storage = InMemoryAliasStorage::new();
        let mut record = saved(&storage, "user/1", "one", Language::neutral()).await;

        record.alias = "uno".to_string();
        storage.save(&mut record).await.unwrap();
        assert_eq!(storage.len(), 1);

        let loaded = storage
            .load(&AliasFilter::new().with_source("user/1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.alias, "uno");
    }

    #[tokio::test]
    async fn test_save_recomputes_first_segment() {
        let storage = InMemoryAliasStorage::new();
        let mut record = saved(&storage, "user/1", "one", Language::neutral()).await;

        record.source = "node/9".to_string();
        storage.save(&mut record).await.unwrap();

        let loaded = storage
            .load(&AliasFilter::new().with_id(record.id.unwrap()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.first_segment, "node");
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_record_before_write() {
        let storage = InMemoryAliasStorage::new();
        let mut record = AliasRecord::new("/abs", "alias", Language::neutral());
        assert!(storage.save(&mut record).await.is_err());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_save_rejects_unknown_id() {
        let storage = InMemoryAliasStorage::new();
        let mut record = AliasRecord::new("user/1", "one", Language::neutral()).with_id(99);
        let err = storage.save(&mut record).await.unwrap_err();
        assert!(err.to_string().contains("unknown"));
    }

    #[tokio::test]
    async fn test_load_returns_largest_id() {
        let storage = InMemoryAliasStorage::new();
        saved(&storage, "user/1", "one", Language::neutral()).await;
        let newer = saved(&storage, "user/1", "uno", Language::neutral()).await;

        let loaded = storage
            .load(&AliasFilter::new().with_source("user/1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.id, newer.id);
        assert_eq!(loaded.alias, "uno");
    }

    #[tokio::test]
    async fn test_load_not_found_is_none() {
        let storage = InMemoryAliasStorage::new();
        let loaded = storage
            .load(&AliasFilter::new().with_source("missing"))
            .await
            .unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_lookup_alias_language_fallback() {
        let storage = InMemoryAliasStorage::new();
        saved(&storage, "user/42", "alice", Language::neutral()).await;
        saved(&storage, "user/42", "users/alice", Language::new("en")).await;

        let en = storage
            .lookup_alias("user/42", &Language::new("en"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(en.alias, "users/alice");

        let fr = storage
            .lookup_alias("user/42", &Language::new("fr"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fr.alias, "alice");
    }

    #[tokio::test]
    async fn test_lookup_source_roundtrip() {
        let storage = InMemoryAliasStorage::new();
        saved(&storage, "user/42", "alice", Language::neutral()).await;

        let found = storage
            .lookup_source("alice", &Language::neutral())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.source, "user/42");

        let missing = storage
            .lookup_source("nobody", &Language::neutral())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_preload_aliases() {
        let storage = InMemoryAliasStorage::new();
        saved(&storage, "user/1", "one", Language::neutral()).await;
        saved(&storage, "user/1", "en-one", Language::new("en")).await;
        saved(&storage, "user/2", "two", Language::neutral()).await;

        let sources = vec![
            "user/1".to_string(),
            "user/2".to_string(),
            "user/3".to_string(),
        ];
        let preloaded = storage
            .preload_aliases(&sources, &Language::new("en"))
            .await
            .unwrap();

        assert_eq!(preloaded.get("user/1").map(String::as_str), Some("en-one"));
        assert_eq!(preloaded.get("user/2").map(String::as_str), Some("two"));
        assert!(!preloaded.contains_key("user/3"));
    }

    #[tokio::test]
    async fn test_delete_by_filter_and_zero_matches() {
        let storage = InMemoryAliasStorage::new();
        saved(&storage, "user/1", "one", Language::neutral()).await;
        saved(&storage, "user/1", "en-one", Language::new("en")).await;
        saved(&storage, "user/2", "two", Language::neutral()).await;

        storage
            .delete(&AliasFilter::new().with_source("user/1"))
            .await
            .unwrap();
        assert_eq!(storage.len(), 1);

        // Zero matches is fine.
        storage
            .delete(&AliasFilter::new().with_source("user/1"))
            .await
            .unwrap();
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn test_whitelist_distinct_first_segments() {
        let storage = InMemoryAliasStorage::new();
        saved(&storage, "user/1", "one", Language::neutral()).await;
        saved(&storage, "user/2", "two", Language::neutral()).await;
        saved(&storage, "node/1", "page", Language::neutral()).await;

        let whitelist = storage.whitelist().await.unwrap();
        assert_eq!(
            whitelist.into_iter().collect::<Vec<_>>(),
            vec!["node".to_string(), "user".to_string()]
        );
    }

    #[tokio::test]
    async fn test_records_after_pages_in_id_order() {
        let storage = InMemoryAliasStorage::new();
        for i in 1..=5 {
            saved(&storage, &format!("user/{i}"), &format!("u{i}"), Language::neutral()).await;
        }

        let first = storage.records_after(0, 2).await.unwrap();
        assert_eq!(
            first.iter().map(|r| r.id.unwrap()).collect::<Vec<_>>(),
            vec![1, 2]
        );

        let rest = storage.records_after(2, 10).await.unwrap();
        assert_eq!(
            rest.iter().map(|r| r.id.unwrap()).collect::<Vec<_>>(),
            vec![3, 4, 5]
        );

        assert!(storage.records_after(5, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let storage = InMemoryAliasStorage::new();
        saved(&storage, "user/1", "one", Language::neutral()).await;
        storage.clear().await.unwrap();
        assert!(storage.is_empty());
        assert!(storage.whitelist().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sync_backends_repopulates_with_fresh_ids() {
        let src = InMemoryAliasStorage::new();
        for i in 1..=7 {
            saved(&src, &format!("user/{i}"), &format!("u{i}"), Language::neutral()).await;
        }
        // Gap in the id sequence must not stall the traversal.
        src.delete(&AliasFilter::new().with_source("user/3"))
            .await
            .unwrap();

        let dst = InMemoryAliasStorage::new();
        saved(&dst, "stale/1", "gone", Language::neutral()).await;
        dst.clear().await.unwrap();

        let copied = pathalias_storage::sync_backends(&src, &dst, 2).await.unwrap();
        assert_eq!(copied, 6);
        assert_eq!(dst.len(), 6);

        // Destination assigned its own ids (never reused after clear) and
        // kept the mapping.
        let found = dst
            .lookup_alias("user/7", &Language::neutral())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.alias, "u7");
        let ids: Vec<_> = dst
            .records_after(0, 10)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id.unwrap())
            .collect();
        assert_eq!(ids, (2..=7).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_concurrent_saves_get_unique_ids() {
        use std::sync::Arc;
        use tokio::task::JoinSet;

        let storage = Arc::new(InMemoryAliasStorage::new());
        let mut join_set = JoinSet::new();

        for i in 0..50 {
            let storage = Arc::clone(&storage);
            join_set.spawn(async move {
                let mut record =
                    AliasRecord::new(format!("user/{i}"), format!("u{i}"), Language::neutral());
                storage.save(&mut record).await.unwrap();
                record.id.unwrap()
            });
        }

        let mut ids = Vec::new();
        while let Some(result) = join_set.join_next().await {
            ids.push(result.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 50);
        assert_eq!(storage.len(), 50);
    }

    #[tokio::test]
    async fn test_concurrent_reads_during_writes() {
        use std::sync::Arc;
        use tokio::task::JoinSet;

        let storage = Arc::new(InMemoryAliasStorage::new());
        for i in 0..10 {
            saved(&storage, &format!("user/{i}"), &format!("u{i}"), Language::neutral()).await;
        }

        let mut join_set = JoinSet::new();
        for i in 0..40 {
            let storage = Arc::clone(&storage);
            if i % 2 == 0 {
                join_set.spawn(async move {
                    storage
                        .lookup_alias(&format!("user/{}", i % 10), &Language::neutral())
                        .await
                        .unwrap()
                        .is_some()
                });
            } else {
                join_set.spawn(async move {
                    let mut record = AliasRecord::new(
                        format!("node/{i}"),
                        format!("n{i}"),
                        Language::neutral(),
                    );
                    storage.save(&mut record).await.unwrap();
                    true
                });
            }
        }

        while let Some(result) = join_set.join_next().await {
            assert!(result.unwrap());
        }
        assert_eq!(storage.len(), 30);
    }
}
