//! Port interface for caching downloaded snapshots per environment.
use async_trait::async_trait;

use super::define_port_error;
use crate::domain::snapshot::{CachedSnapshot, Environment};

define_port_error! {
    /// Errors surfaced by the caching adapter.
    pub enum SnapshotCacheError {
        /// Cache backend is unavailable.
        Backend { message: String } => "snapshot cache backend failure: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    /// Read the entry held for `environment`.
    async fn get(&self, environment: Environment) -> Result<Option<CachedSnapshot>, SnapshotCacheError>;

    /// Store `entry`, replacing any previous entry for `environment`.
    async fn put(&self, environment: Environment, entry: CachedSnapshot) -> Result<(), SnapshotCacheError>;
}
