//! Cache storage

use std::time::SystemTime;

use bytes::Bytes;
use dashmap::DashMap;

use super::entity::{CacheEntity, CachedPayload};
use crate::error::{self, Result};

/// Storage for cache entities, grouped by directory name.
pub trait DiskCache: Send + Sync {
    /// The entity stored under `key`, if present and still usable.
    fn get(&self, dir: &str, key: &str) -> Option<CacheEntity>;

    /// Store `entity` under its own key, replacing any previous one.
    fn put(&self, dir: &str, entity: CacheEntity);

    /// Load the cached body.
    fn materialize(&self, entity: &CacheEntity) -> Result<Bytes>;
}

/// In-process `DiskCache` keyed by `(directory, key)`.
///
/// Expired entities are evicted when looked up.
#[derive(Debug, Default)]
pub struct MemoryDiskCache {
    entries: DashMap<(String, String), CacheEntity>,
}

impl MemoryDiskCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&self, dir: &str, key: &str) -> Option<CacheEntity> {
        self.entries
            .remove(&(dir.to_owned(), key.to_owned()))
            .map(|(_, entity)| entity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DiskCache for MemoryDiskCache {
    fn get(&self, dir: &str, key: &str) -> Option<CacheEntity> {
        let id = (dir.to_owned(), key.to_owned());
        let mut entry = self.entries.get_mut(&id)?;
        if entry.is_expired(SystemTime::now()) {
            drop(entry);
            self.entries.remove(&id);
            tracing::debug!(target: "cachet::cache", dir, key, "evicted expired entity");
            return None;
        }
        entry.hits += 1;
        Some(entry.clone())
    }

    fn put(&self, dir: &str, entity: CacheEntity) {
        tracing::debug!(target: "cachet::cache", dir, key = %entity.key, "storing entity");
        self.entries
            .insert((dir.to_owned(), entity.key.clone()), entity);
    }

    fn materialize(&self, entity: &CacheEntity) -> Result<Bytes> {
        match &entity.payload {
            CachedPayload::Text(text) => Ok(Bytes::from(text.clone())),
            CachedPayload::File(path) => std::fs::read(path)
                .map(Bytes::from)
                .map_err(error::cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cache::entity::Expiry;

    fn text(key: &str, body: &str) -> CacheEntity {
        CacheEntity::new(key, CachedPayload::Text(body.to_owned()))
    }

    #[test]
    fn entries_are_scoped_by_directory() {
        let cache = MemoryDiskCache::new();
        cache.put("a", text("k", "one"));
        cache.put("b", text("k", "two"));

        let hit = cache.get("a", "k").unwrap();
        assert_eq!(cache.materialize(&hit).unwrap(), Bytes::from("one"));
        assert_eq!(hit.hits, 1);
        assert!(cache.get("c", "k").is_none());
    }

    #[test]
    fn expired_entries_are_evicted() {
        let cache = MemoryDiskCache::new();
        let past = SystemTime::now() - Duration::from_secs(5);
        cache.put("d", text("k", "stale").with_expires(Expiry::At(past)));
        assert!(cache.get("d", "k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_file_payload_is_a_cache_error() {
        let cache = MemoryDiskCache::new();
        let entity = CacheEntity::new(
            "k",
            CachedPayload::File("/definitely/not/here.bin".into()),
        );
        assert!(cache.materialize(&entity).unwrap_err().is_cache());
    }
}
