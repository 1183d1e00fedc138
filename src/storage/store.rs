//! The record store: single source of truth for the collection.
//!
//! Every operation reads the backing file afresh so edits made outside the
//! process are honored. Mutations run load, mutate and persist under one
//! writer lock, which makes concurrent mutations serializable. Reads skip the
//! lock; the atomic rename in [`CollectionFile::save`] guarantees they see a
//! whole snapshot.

use super::cache::RecordCache;
use super::persistence::{CollectionFile, DurabilityMode};
use crate::core::{Record, RecordPatch, Result, StoreError};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub path: PathBuf,
    pub durability: DurabilityMode,
    /// Accept inserts whose id is already present (lookups stay first-match).
    pub allow_duplicate_ids: bool,
    pub create_if_missing: bool,
}

impl StoreOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            durability: DurabilityMode::default(),
            allow_duplicate_ids: false,
            create_if_missing: false,
        }
    }

    pub fn durability(mut self, durability: DurabilityMode) -> Self {
        self.durability = durability;
        self
    }

    pub fn allow_duplicate_ids(mut self, allow: bool) -> Self {
        self.allow_duplicate_ids = allow;
        self
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }
}

pub struct RecordStore {
    file: CollectionFile,
    cache: RecordCache,
    writer: Mutex<()>,
    allow_duplicate_ids: bool,
}

impl RecordStore {
    /// Opens the store, optionally creating an empty collection, and primes
    /// the listing cache. Fails fast on an unreadable or corrupt file.
    pub async fn open(options: StoreOptions) -> Result<Self> {
        let file = CollectionFile::new(&options.path, options.durability);

        if options.create_if_missing && !file.exists().await {
            info!(path = %file.path().display(), "creating empty record file");
            file.create_empty().await?;
        }

        let store = Self {
            file,
            cache: RecordCache::new(),
            writer: Mutex::new(()),
            allow_duplicate_ids: options.allow_duplicate_ids,
        };

        let records = store.load_cached().await?;
        info!(
            path = %store.path().display(),
            records = records.len(),
            durability = %options.durability,
            allow_duplicate_ids = options.allow_duplicate_ids,
            "record store opened"
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Always-fresh read of the whole collection.
    pub async fn load_all(&self) -> Result<Vec<Record>> {
        self.file.load().await
    }

    /// Serves the cached collection, loading it on a miss.
    ///
    /// The cache is invalidated by every mutation committed through this
    /// store; changes made to the file by anything else show up here only
    /// after the next such mutation.
    pub async fn load_cached(&self) -> Result<Vec<Record>> {
        let (cached, generation) = self.cache.get().await;
        if let Some(records) = cached {
            return Ok(records);
        }

        let records = self.file.load().await?;
        if !self.cache.fill(generation, records.clone()).await {
            debug!("listing cache fill skipped, a mutation committed meanwhile");
        }
        Ok(records)
    }

    /// First record with `id` in insertion order.
    pub async fn find_by_id(&self, id: i64) -> Result<Record> {
        self.load_all()
            .await?
            .into_iter()
            .find(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    /// Appends `record` and returns it unchanged.
    pub async fn insert(&self, record: Record) -> Result<Record> {
        let allow_duplicates = self.allow_duplicate_ids;
        self.commit("insert", move |records| {
            if !allow_duplicates && records.iter().any(|existing| existing.id == record.id) {
                return Err(StoreError::DuplicateId(record.id));
            }
            records.push(record.clone());
            Ok(record)
        })
        .await
    }

    /// Merges `patch` into the first record with `patch.id`.
    pub async fn update(&self, patch: RecordPatch) -> Result<Record> {
        self.commit("update", move |records| {
            let record = records
                .iter_mut()
                .find(|record| record.id == patch.id)
                .ok_or(StoreError::NotFound(patch.id))?;
            patch.apply_to(record);
            Ok(record.clone())
        })
        .await
    }

    /// Removes every record with `id` and returns what remains.
    ///
    /// Deleting an absent id succeeds and leaves the collection as it was.
    pub async fn delete(&self, id: i64) -> Result<Vec<Record>> {
        self.commit("delete", move |records| {
            records.retain(|record| record.id != id);
            Ok(records.clone())
        })
        .await
    }

    async fn commit<T, F>(&self, op: &'static str, mutation: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Record>) -> Result<T>,
    {
        let _writer = self.writer.lock().await;

        let mut records = self.file.load().await?;
        let outcome = match mutation(&mut records) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(op, error = %err, "mutation rejected, nothing written");
                return Err(err);
            }
        };

        if let Err(err) = self.file.save(&records).await {
            warn!(op, error = %err, "mutation not persisted");
            return Err(err);
        }
        self.cache.invalidate().await;

        info!(
            op,
            path = %self.path().display(),
            records = records.len(),
            "record file written"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store_with(records: &[Record]) -> (TempDir, RecordStore) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        CollectionFile::new(&path, DurabilityMode::Async)
            .save(records)
            .await
            .unwrap();
        let store = RecordStore::open(StoreOptions::new(path)).await.unwrap();
        (temp_dir, store)
    }

    #[tokio::test]
    async fn test_open_missing_file_fails_without_create_flag() {
        let temp_dir = TempDir::new().unwrap();
        let result = RecordStore::open(StoreOptions::new(temp_dir.path().join("data.json"))).await;
        assert!(matches!(result, Err(StoreError::ReadFailure { .. })));
    }

    #[tokio::test]
    async fn test_open_creates_empty_collection_when_asked() {
        let temp_dir = TempDir::new().unwrap();
        let options = StoreOptions::new(temp_dir.path().join("data.json")).create_if_missing(true);
        let store = RecordStore::open(options).await.unwrap();
        assert!(store.load_all().await.unwrap().is_empty());
        assert!(store.cache.is_primed().await);
    }

    #[tokio::test]
    async fn test_cache_is_invalidated_by_mutation() {
        let (_dir, store) = store_with(&[Record::new(1, "A", "red", "2020")]).await;
        assert!(store.cache.is_primed().await);

        store.insert(Record::new(2, "B", "blue", "2021")).await.unwrap();
        assert!(!store.cache.is_primed().await);
        assert_eq!(store.load_cached().await.unwrap().len(), 2);
        assert!(store.cache.is_primed().await);
    }

    #[tokio::test]
    async fn test_cached_listing_ignores_external_edits_until_mutation() {
        let (_dir, store) = store_with(&[Record::new(1, "A", "red", "2020")]).await;
        std::fs::write(store.path(), "[]").unwrap();

        assert_eq!(store.load_cached().await.unwrap().len(), 1);
        assert!(store.load_all().await.unwrap().is_empty());

        store.delete(42).await.unwrap();
        assert!(store.load_cached().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_mutation_keeps_cache() {
        let (_dir, store) = store_with(&[Record::new(1, "A", "red", "2020")]).await;
        let err = store.update(RecordPatch::new(5).name("X")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(5)));
        assert!(store.cache.is_primed().await);
    }
}
