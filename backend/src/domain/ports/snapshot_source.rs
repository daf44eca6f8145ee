//! Driven port for reading export snapshots from object storage.
//!
//! The domain owns the metadata shape so the cache layer can revalidate
//! without knowing which storage API sits behind the adapter.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::snapshot::{Environment, ExportSnapshot, ObjectMetadata};

define_port_error! {
    /// Errors surfaced while reading from object storage.
    pub enum SnapshotSourceError {
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "object store transport failed: {message}",
        /// Storage call exceeded its timeout.
        Timeout { message: String } =>
            "object store timeout: {message}",
        /// No export matching the naming pattern exists.
        NotFound { message: String } =>
            "export not found: {message}",
        /// Storage answered with an unexpected status.
        Status { message: String } =>
            "object store rejected request: {message}",
        /// Listing or snapshot body could not be decoded.
        Decode { message: String } =>
            "export decode failed: {message}",
    }
}

impl SnapshotSourceError {
    /// Whether the failure reflects unreachable storage rather than bad data.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }
}

/// Port for locating and downloading export snapshots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Key of the newest export for `environment`.
    async fn locate_latest(&self, environment: Environment) -> Result<String, SnapshotSourceError>;

    /// Entity tag and modification time of `key`, without its body.
    async fn object_metadata(
        &self,
        environment: Environment,
        key: &str,
    ) -> Result<ObjectMetadata, SnapshotSourceError>;

    /// Download and decode the export stored at `key`.
    async fn fetch_snapshot(
        &self,
        environment: Environment,
        key: &str,
    ) -> Result<ExportSnapshot, SnapshotSourceError>;
}

/// Fixture serving one fixed snapshot for every environment.
#[derive(Debug, Clone, Default)]
pub struct FixtureSnapshotSource {
    /// Snapshot returned by every download.
    pub snapshot: ExportSnapshot,
    /// Metadata returned by every head request.
    pub metadata: ObjectMetadata,
    /// Key reported as the latest export.
    pub key: String,
}

#[async_trait]
impl SnapshotSource for FixtureSnapshotSource {
    async fn locate_latest(&self, _environment: Environment) -> Result<String, SnapshotSourceError> {
        if self.key.is_empty() {
            return Err(SnapshotSourceError::not_found("fixture has no export"));
        }
        Ok(self.key.clone())
    }

    async fn object_metadata(
        &self,
        _environment: Environment,
        _key: &str,
    ) -> Result<ObjectMetadata, SnapshotSourceError> {
        Ok(self.metadata.clone())
    }

    async fn fetch_snapshot(
        &self,
        _environment: Environment,
        _key: &str,
    ) -> Result<ExportSnapshot, SnapshotSourceError> {
        Ok(self.snapshot.clone())
    }
}
