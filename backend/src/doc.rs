//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: the snapshot endpoints and the health probes
//! - **Schemas**: response envelopes, the derived explorer view, and the
//!   domain error payload
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, ExplorerView, ExportSnapshot};
use crate::inbound::http::health::RootResponse;
use crate::inbound::http::projects::{ProjectsData, ProjectsErrorResponse, ProjectsResponse};

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Project Explorer API",
        description = "Read-only access to ridership-modeling export snapshots."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::view_projects,
        crate::inbound::http::health::root,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ProjectsResponse,
        ProjectsData,
        ProjectsErrorResponse,
        ExportSnapshot,
        ExplorerView,
        RootResponse,
        Error,
        ErrorCode
    )),
    tags(
        (name = "projects", description = "Export snapshots and derived views"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
