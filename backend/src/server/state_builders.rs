//! Builders wiring outbound adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use project_explorer::domain::SnapshotService;
use project_explorer::inbound::http::state::HttpState;
use project_explorer::outbound::cache::InMemorySnapshotCache;
use project_explorer::outbound::object_store::S3SnapshotSource;

use super::ServerConfig;

/// Compose the S3 source, the in-process cache, and the system clock behind
/// the snapshot query port.
pub(super) async fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let client = config.s3.load_client().await;
    info!(
        region = %config.s3.region,
        endpoint = config.s3.endpoint.as_deref().unwrap_or("aws"),
        force_path_style = config.s3.force_path_style,
        bucket_base = %config.layout.bucket_base,
        prefix = %config.layout.prefix,
        "object store configured"
    );

    let service = SnapshotService::new(
        Arc::new(S3SnapshotSource::new(client, config.layout.clone())),
        Arc::new(InMemorySnapshotCache::new()),
        Arc::new(DefaultClock),
        config.snapshots,
    );
    web::Data::new(HttpState::new(Arc::new(service)))
}
