//! Client-side explorer session.
//!
//! The session ties a [`ViewStateManager`] to the snapshot fetched through a
//! [`SnapshotClient`]. Fetches are never cancelled or sequenced: whichever
//! result is applied last becomes the loaded state, even if it was requested
//! first.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use super::explorer_view::ExplorerView;
use super::ports::{SnapshotClient, SnapshotClientError};
use super::snapshot::{Environment, SnapshotEnvelope};
use super::view_state::{LocationDescriptor, ViewState, ViewStateManager, ViewStateUpdate};

/// Result of one fetch through the proxy.
pub type FetchResult = Result<SnapshotEnvelope, SnapshotClientError>;

/// Load status of the session's snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch is in flight and nothing has resolved since.
    Loading,
    /// The most recently applied fetch succeeded.
    Loaded(SnapshotEnvelope),
    /// The most recently applied fetch failed; the user may retry.
    Failed { message: String },
}

impl LoadState {
    /// Loaded envelope, if any.
    #[must_use]
    pub fn envelope(&self) -> Option<&SnapshotEnvelope> {
        match self {
            Self::Loaded(envelope) => Some(envelope),
            _ => None,
        }
    }
}

/// Explorer state for one user.
pub struct ExplorerSession<L> {
    client: Arc<dyn SnapshotClient>,
    view_state: ViewStateManager<L>,
    load_state: LoadState,
}

impl<L: LocationDescriptor> ExplorerSession<L> {
    /// Hydrate view state from `location`; nothing is fetched yet.
    pub fn new(client: Arc<dyn SnapshotClient>, location: L) -> Self {
        Self {
            client,
            view_state: ViewStateManager::hydrate(location),
            load_state: LoadState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> &ViewState {
        self.view_state.state()
    }

    #[must_use]
    pub fn location(&self) -> &L {
        self.view_state.location()
    }

    #[must_use]
    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    /// Mark the session as loading and return the fetch for the current
    /// environment.
    ///
    /// The future owns everything it needs, so several may be in flight at
    /// once; feed each result to [`Self::apply_result`] as it resolves.
    pub fn pending_fetch(&mut self, refresh: bool) -> BoxFuture<'static, FetchResult> {
        let client = Arc::clone(&self.client);
        let environment = self.state().environment;
        self.load_state = LoadState::Loading;
        debug!(%environment, refresh, "fetching snapshot");
        Box::pin(async move { client.fetch_projects(environment, refresh).await })
    }

    /// Overwrite the load state with `result`.
    pub fn apply_result(&mut self, result: FetchResult) {
        self.load_state = match result {
            Ok(envelope) => LoadState::Loaded(envelope),
            Err(error) => {
                warn!(%error, "snapshot fetch failed");
                LoadState::Failed {
                    message: error.to_string(),
                }
            }
        };
    }

    /// Fetch the current environment.
    pub async fn load(&mut self) -> &LoadState {
        let result = self.pending_fetch(false).await;
        self.apply_result(result);
        &self.load_state
    }

    /// Fetch the current environment, bypassing the proxy's freshness window.
    pub async fn refresh(&mut self) -> &LoadState {
        let result = self.pending_fetch(true).await;
        self.apply_result(result);
        &self.load_state
    }

    /// Switch environment and reload. The selection is kept as is.
    pub async fn set_environment(&mut self, environment: Environment) -> &LoadState {
        self.view_state
            .set_view_state(ViewStateUpdate::new().environment(environment));
        self.load().await
    }

    /// Change view parameters other than the environment.
    ///
    /// Environment changes in `update` are applied but do not fetch; use
    /// [`Self::set_environment`] to reload.
    pub fn set_view_state(&mut self, update: ViewStateUpdate) {
        self.view_state.set_view_state(update);
    }

    pub fn select(&mut self, id: &str) {
        self.view_state.select(id);
    }

    pub fn deselect(&mut self, id: &str) {
        self.view_state.deselect(id);
    }

    /// Select every project of the loaded snapshot; a no-op while nothing
    /// is loaded.
    pub fn select_all(&mut self) {
        let Some(envelope) = self.load_state.envelope() else {
            return;
        };
        let snapshot = Arc::clone(&envelope.snapshot);
        self.view_state.select_all(snapshot.project_ids());
    }

    pub fn clear_all(&mut self) {
        self.view_state.clear_all();
    }

    /// Derived view of the loaded snapshot.
    #[must_use]
    pub fn view(&self) -> Option<ExplorerView> {
        self.load_state
            .envelope()
            .map(|envelope| ExplorerView::from_envelope(envelope, self.state()))
    }
}
