//! In-process snapshot cache.
//!
//! Holds at most one entry per environment for the lifetime of the process.
//! Entries are replaced wholesale and never merged; nothing is persisted.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ports::{SnapshotCache, SnapshotCacheError};
use crate::domain::{CachedSnapshot, Environment};

/// Per-environment cache guarded by a read/write lock.
#[derive(Debug, Default)]
pub struct InMemorySnapshotCache {
    entries: RwLock<HashMap<Environment, CachedSnapshot>>,
}

impl InMemorySnapshotCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotCache for InMemorySnapshotCache {
    async fn get(&self, environment: Environment) -> Result<Option<CachedSnapshot>, SnapshotCacheError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| SnapshotCacheError::backend("snapshot cache lock poisoned"))?;
        Ok(entries.get(&environment).cloned())
    }

    async fn put(&self, environment: Environment, entry: CachedSnapshot) -> Result<(), SnapshotCacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| SnapshotCacheError::backend("snapshot cache lock poisoned"))?;
        entries.insert(environment, entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ExportSnapshot;
    use chrono::DateTime;
    use rstest::rstest;

    fn entry(source_file: &str) -> CachedSnapshot {
        CachedSnapshot {
            snapshot: Arc::new(ExportSnapshot::default()),
            source_file: source_file.to_owned(),
            etag: "etag".to_owned(),
            last_modified: DateTime::UNIX_EPOCH,
            fetched_at: DateTime::UNIX_EPOCH,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn empty_cache_misses() {
        let cache = InMemorySnapshotCache::new();
        let result = cache.get(Environment::Local).await.expect("get succeeds");
        assert!(result.is_none(), "empty cache should miss");
    }

    #[rstest]
    #[tokio::test]
    async fn entries_are_kept_per_environment_and_replaced_wholesale() {
        let cache = InMemorySnapshotCache::new();
        cache
            .put(Environment::Local, entry("local-1.json"))
            .await
            .expect("put succeeds");
        cache
            .put(Environment::Production, entry("production.json"))
            .await
            .expect("put succeeds");
        cache
            .put(Environment::Local, entry("local-2.json"))
            .await
            .expect("put succeeds");

        let local = cache.get(Environment::Local).await.expect("get succeeds");
        let production = cache.get(Environment::Production).await.expect("get succeeds");
        assert_eq!(local.map(|entry| entry.source_file), Some("local-2.json".to_owned()));
        assert_eq!(
            production.map(|entry| entry.source_file),
            Some("production.json".to_owned())
        );
    }
}
