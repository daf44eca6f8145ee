//! Cached read path for export snapshots.
//!
//! An entry younger than the freshness window is served straight from the
//! cache. Older entries are revalidated: the latest key is located and its
//! entity tag compared with the cached one. Only a changed key or tag causes
//! a download.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::Error;
use crate::domain::ports::{SnapshotCache, SnapshotQuery, SnapshotSource, SnapshotSourceError};
use crate::domain::snapshot::{CachedSnapshot, Environment, SnapshotEnvelope};

/// Freshness window applied when none is configured.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(300);

/// Snapshot service configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotServiceConfig {
    /// How long an entry is served without contacting storage.
    pub freshness: Duration,
}

impl Default for SnapshotServiceConfig {
    fn default() -> Self {
        Self {
            freshness: DEFAULT_FRESHNESS,
        }
    }
}

/// Domain service implementing [`SnapshotQuery`] over a source and a cache.
pub struct SnapshotService {
    source: Arc<dyn SnapshotSource>,
    cache: Arc<dyn SnapshotCache>,
    clock: Arc<dyn Clock>,
    freshness: TimeDelta,
}

impl SnapshotService {
    /// Create a service; windows too large for [`TimeDelta`] saturate.
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        cache: Arc<dyn SnapshotCache>,
        clock: Arc<dyn Clock>,
        config: SnapshotServiceConfig,
    ) -> Self {
        Self {
            source,
            cache,
            clock,
            freshness: TimeDelta::from_std(config.freshness).unwrap_or(TimeDelta::MAX),
        }
    }

    async fn cached_entry(&self, environment: Environment) -> Option<CachedSnapshot> {
        match self.cache.get(environment).await {
            Ok(entry) => entry,
            Err(error) => {
                warn!(%environment, %error, "snapshot cache read failed; treating as miss");
                None
            }
        }
    }

    async fn store(&self, environment: Environment, entry: CachedSnapshot) {
        if let Err(error) = self.cache.put(environment, entry).await {
            warn!(%environment, %error, "snapshot cache write failed");
        }
    }

    async fn revalidate(
        &self,
        environment: Environment,
        cached: Option<CachedSnapshot>,
    ) -> Result<SnapshotEnvelope, Error> {
        let key = self
            .source
            .locate_latest(environment)
            .await
            .map_err(|error| map_source_error(environment, "Could not list exports", error))?;
        let metadata = self
            .source
            .object_metadata(environment, &key)
            .await
            .map_err(|error| map_source_error(environment, "Could not fetch file metadata", error))?;
        let now = self.clock.utc();

        if let Some(entry) = cached.filter(|entry| entry.matches(&key, &metadata.etag)) {
            debug!(%environment, key = %key, "snapshot unchanged; renewing cache entry");
            let renewed = entry.renewed(now);
            let envelope = renewed.to_envelope(true);
            self.store(environment, renewed).await;
            return Ok(envelope);
        }

        let snapshot = self
            .source
            .fetch_snapshot(environment, &key)
            .await
            .map_err(|error| map_source_error(environment, "Could not fetch file content", error))?;
        info!(
            %environment,
            key = %key,
            jobs = snapshot.jobs.len(),
            projects = snapshot.unique_projects.len(),
            "downloaded snapshot"
        );
        let entry = CachedSnapshot {
            snapshot: Arc::new(snapshot),
            source_file: key,
            etag: metadata.etag,
            last_modified: metadata.last_modified,
            fetched_at: now,
        };
        let envelope = entry.to_envelope(false);
        self.store(environment, entry).await;
        Ok(envelope)
    }
}

#[async_trait]
impl SnapshotQuery for SnapshotService {
    async fn fetch_snapshot(
        &self,
        environment: Environment,
        force_refresh: bool,
    ) -> Result<SnapshotEnvelope, Error> {
        let cached = self.cached_entry(environment).await;
        if !force_refresh {
            if let Some(entry) = cached.as_ref() {
                if entry.is_fresh(self.clock.utc(), self.freshness) {
                    debug!(%environment, "serving snapshot inside freshness window");
                    return Ok(entry.to_envelope(true));
                }
            }
        }
        self.revalidate(environment, cached).await
    }
}

fn map_source_error(environment: Environment, context: &str, error: SnapshotSourceError) -> Error {
    warn!(%environment, %error, context, "snapshot source failed");
    let details = json!({ "environment": environment.as_str() });
    let mapped = match error {
        SnapshotSourceError::NotFound { message } => Error::not_found(message),
        error if error.is_unavailable() => {
            Error::service_unavailable(format!("{context}: object storage unavailable"))
        }
        error => Error::internal(format!("{context}: {error}")),
    };
    mapped.with_details(details)
}
