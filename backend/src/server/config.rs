//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use project_explorer::config::{ExplorerSettings, SettingsError};
use project_explorer::domain::SnapshotServiceConfig;
use project_explorer::outbound::object_store::{ObjectStoreLayout, S3ClientSettings};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) s3: S3ClientSettings,
    pub(crate) layout: ObjectStoreLayout,
    pub(crate) cors_origins: Vec<String>,
    pub(crate) snapshots: SnapshotServiceConfig,
}

impl ServerConfig {
    /// Resolve settings into a server configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the bind address or endpoint is invalid.
    pub fn from_settings(settings: &ExplorerSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            s3: settings.s3_client()?,
            layout: settings.layout(),
            cors_origins: settings.cors_origins(),
            snapshots: SnapshotServiceConfig {
                freshness: settings.cache_freshness(),
            },
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
