//! Driving port for reading the current snapshot of an environment.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;

use crate::domain::Error;
use crate::domain::snapshot::{Environment, ExportSnapshot, SnapshotEnvelope};

/// Read access to the latest export, possibly served from cache.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotQuery: Send + Sync {
    /// Latest snapshot for `environment`.
    ///
    /// `force_refresh` skips the freshness window but still revalidates
    /// against storage before downloading.
    async fn fetch_snapshot(
        &self,
        environment: Environment,
        force_refresh: bool,
    ) -> Result<SnapshotEnvelope, Error>;
}

/// Fixture returning an empty snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureSnapshotQuery;

#[async_trait]
impl SnapshotQuery for FixtureSnapshotQuery {
    async fn fetch_snapshot(
        &self,
        environment: Environment,
        _force_refresh: bool,
    ) -> Result<SnapshotEnvelope, Error> {
        Ok(SnapshotEnvelope {
            snapshot: Arc::new(ExportSnapshot::default()),
            last_modified: DateTime::UNIX_EPOCH,
            source_file: format!("fixture/{environment}.json"),
            from_cache: false,
        })
    }
}
