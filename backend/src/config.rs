//! Server settings loaded via OrthoConfig.
//!
//! Every field is optional; accessors fall back to the defaults for the
//! production ridership-modeling buckets.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::DEFAULT_FRESHNESS;
use crate::outbound::object_store::{ObjectStoreLayout, S3ClientSettings};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_REGION: &str = "eu-west-1";
const DEFAULT_BUCKET_BASE: &str = "citymapper-cfc-ridership-modeling-eu-west-1-";
const DEFAULT_FILE_PREFIX: &str = "ridership_modeling_dumps/";
const DEFAULT_FILE_PATTERN: &str = "ridership_modeling_jobs_";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

/// Raised when a configured value cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address `{0}`")]
    BindAddress(String),
    #[error("invalid object store endpoint `{endpoint}`: {message}")]
    Endpoint { endpoint: String, message: String },
}

/// Settings for the snapshot proxy server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EXPLORER")]
pub struct ExplorerSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Endpoint override for S3-compatible stores.
    pub endpoint: Option<String>,
    /// Region of the export buckets.
    pub region: Option<String>,
    /// Address buckets path-style; defaults to on when an endpoint is set.
    pub force_path_style: Option<bool>,
    /// Bucket name without the `staging`/`production` suffix.
    pub bucket_base: Option<String>,
    /// Key prefix exports are listed under.
    pub file_prefix: Option<String>,
    /// File name stem preceding the export timestamp.
    pub file_pattern: Option<String>,
    /// Object store request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// How long a cached snapshot is served without revalidation.
    pub cache_freshness_secs: Option<u64>,
    /// Comma-separated browser origins allowed to call the API.
    pub cors_origins: Option<String>,
}

impl ExplorerSettings {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddress`] when host and port do not form
    /// a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = format!("{}:{}", self.host(), self.port());
        raw.parse().map_err(|_| SettingsError::BindAddress(raw))
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Validated endpoint override, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Endpoint`] when the value is not a base URL.
    pub fn endpoint(&self) -> Result<Option<Url>, SettingsError> {
        let Some(raw) = self.endpoint.as_deref() else {
            return Ok(None);
        };
        let url = Url::parse(raw).map_err(|err| SettingsError::Endpoint {
            endpoint: raw.to_owned(),
            message: err.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(SettingsError::Endpoint {
                endpoint: raw.to_owned(),
                message: "not a base URL".to_owned(),
            });
        }
        Ok(Some(url))
    }

    /// S3 client settings: region, endpoint override, addressing style, and
    /// the per-operation timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Endpoint`] when the endpoint is unusable.
    pub fn s3_client(&self) -> Result<S3ClientSettings, SettingsError> {
        let endpoint = self.endpoint()?;
        Ok(S3ClientSettings {
            region: self.region().to_owned(),
            force_path_style: self.force_path_style.unwrap_or(endpoint.is_some()),
            endpoint: endpoint.map(|url| url.as_str().trim_end_matches('/').to_owned()),
            operation_timeout: self.request_timeout(),
        })
    }

    /// Browser origins allowed by CORS; blank entries are skipped.
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .unwrap_or(DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Bucket and key layout of the exports.
    pub fn layout(&self) -> ObjectStoreLayout {
        ObjectStoreLayout {
            bucket_base: self
                .bucket_base
                .clone()
                .unwrap_or_else(|| DEFAULT_BUCKET_BASE.to_owned()),
            prefix: self
                .file_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_FILE_PREFIX.to_owned()),
            pattern: self
                .file_pattern
                .clone()
                .unwrap_or_else(|| DEFAULT_FILE_PATTERN.to_owned()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Freshness window of the snapshot cache.
    pub fn cache_freshness(&self) -> Duration {
        self.cache_freshness_secs
            .map_or(DEFAULT_FRESHNESS, Duration::from_secs)
    }
}
