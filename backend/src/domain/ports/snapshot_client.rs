//! Driven port used by the explorer session to reach the backend proxy.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::snapshot::{Environment, SnapshotEnvelope};

define_port_error! {
    /// Errors surfaced while calling the backend proxy.
    pub enum SnapshotClientError {
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "explorer api transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } =>
            "explorer api timeout: {message}",
        /// The proxy reported a failure.
        Api { message: String } =>
            "explorer api error: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "explorer api response decode failed: {message}",
    }
}

/// Port for fetching the latest snapshot through the proxy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotClient: Send + Sync {
    /// Fetch the snapshot for `environment`, bypassing the proxy's freshness
    /// window when `refresh` is set.
    async fn fetch_projects(
        &self,
        environment: Environment,
        refresh: bool,
    ) -> Result<SnapshotEnvelope, SnapshotClientError>;
}
