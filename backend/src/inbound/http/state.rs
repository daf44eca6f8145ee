//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{FixtureSnapshotQuery, SnapshotQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub snapshots: Arc<dyn SnapshotQuery>,
}

impl HttpState {
    /// Bundle the snapshot query port.
    pub fn new(snapshots: Arc<dyn SnapshotQuery>) -> Self {
        Self { snapshots }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(Arc::new(FixtureSnapshotQuery))
    }
}
