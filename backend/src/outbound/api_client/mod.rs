//! Reqwest client for the explorer's backend proxy.
//!
//! Implements the `SnapshotClient` port. Logging is not hard-wired: every
//! request and outcome is reported to the [`HttpExchangeHooks`] supplied at
//! construction.

mod dto;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use self::dto::ProjectsResponseDto;
use crate::domain::ports::{SnapshotClient, SnapshotClientError};
use crate::domain::{Environment, SnapshotEnvelope};

/// Observer of the client's HTTP exchanges.
pub trait HttpExchangeHooks: Send + Sync {
    /// Called before a request is sent.
    fn on_request(&self, url: &Url);

    /// Called once a response status is known.
    fn on_response(&self, url: &Url, status: StatusCode, elapsed: Duration);

    /// Called when the exchange fails before producing a usable response.
    fn on_error(&self, url: &Url, error: &SnapshotClientError);
}

/// Hooks that emit `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHooks;

impl HttpExchangeHooks for TracingHooks {
    fn on_request(&self, url: &Url) {
        debug!(%url, "requesting projects");
    }

    fn on_response(&self, url: &Url, status: StatusCode, elapsed: Duration) {
        debug!(%url, status = status.as_u16(), elapsed_ms = elapsed.as_millis(), "projects response");
    }

    fn on_error(&self, url: &Url, error: &SnapshotClientError) {
        warn!(%url, %error, "projects request failed");
    }
}

/// HTTP client for `GET /api/projects`.
pub struct ExplorerApiClient {
    client: Client,
    base_url: Url,
    hooks: Arc<dyn HttpExchangeHooks>,
}

impl ExplorerApiClient {
    /// Build a client with an explicit request timeout and exchange hooks.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        timeout: Duration,
        hooks: Arc<dyn HttpExchangeHooks>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            hooks,
        })
    }

    fn projects_url(&self, environment: Environment, refresh: bool) -> Result<Url, SnapshotClientError> {
        let mut url = self
            .base_url
            .join("api/projects")
            .map_err(|error| SnapshotClientError::transport(format!("invalid base url: {error}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("environment", environment.as_str());
            if refresh {
                query.append_pair("refresh", "true");
            }
        }
        Ok(url)
    }

    async fn exchange(&self, url: &Url) -> Result<SnapshotEnvelope, SnapshotClientError> {
        let started = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        self.hooks.on_response(url, status, started.elapsed());
        let body = response.bytes().await.map_err(map_transport_error)?;
        let decoded: ProjectsResponseDto = serde_json::from_slice(body.as_ref()).map_err(|error| {
            SnapshotClientError::decode(format!("status {}: {error}", status.as_u16()))
        })?;
        decoded.into_envelope().map_err(SnapshotClientError::api)
    }
}

#[async_trait]
impl SnapshotClient for ExplorerApiClient {
    async fn fetch_projects(
        &self,
        environment: Environment,
        refresh: bool,
    ) -> Result<SnapshotEnvelope, SnapshotClientError> {
        let url = self.projects_url(environment, refresh)?;
        self.hooks.on_request(&url);
        let result = self.exchange(&url).await;
        if let Err(error) = &result {
            self.hooks.on_error(&url, error);
        }
        result
    }
}

fn map_transport_error(error: reqwest::Error) -> SnapshotClientError {
    if error.is_timeout() {
        SnapshotClientError::timeout(error.to_string())
    } else {
        SnapshotClientError::transport(error.to_string())
    }
}
