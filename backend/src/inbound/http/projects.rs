//! Snapshot read endpoints.
//!
//! ```text
//! GET /api/projects?environment=local|production[&refresh=true]
//! GET /api/projects/view?env=&groupBy=&sortBy=&sortDir=&selected=
//! ```

use actix_web::{HttpRequest, HttpResponse, get, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Environment, Error, ExplorerView, ExportSnapshot, ParseEnvironmentError, SnapshotEnvelope,
    TRACE_ID_HEADER, ViewState,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::no_store_header;
use crate::inbound::http::error::{redact_if_internal, status_for};
use crate::inbound::http::state::HttpState;

/// Query parameters accepted by `GET /api/projects`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectsQuery {
    /// `local` (default) or `production`.
    #[param(example = "production")]
    pub environment: Option<String>,
    /// `true` bypasses the freshness window.
    #[param(example = "true")]
    pub refresh: Option<String>,
}

impl ProjectsQuery {
    fn environment(&self) -> Result<Environment, Error> {
        match self.environment.as_deref() {
            None | Some("") => Ok(Environment::default()),
            Some(raw) => raw
                .parse()
                .map_err(|err: ParseEnvironmentError| Error::invalid_request(err.to_string())),
        }
    }

    fn force_refresh(&self) -> bool {
        self.refresh
            .as_deref()
            .is_some_and(|raw| raw.eq_ignore_ascii_case("true") || raw == "1")
    }
}

/// Snapshot and provenance for one environment.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsData {
    pub projects: ExportSnapshot,
    pub last_modified: DateTime<Utc>,
    /// Unique projects in the export.
    #[schema(example = 12)]
    pub total_count: usize,
    #[schema(example = "ridership_modeling_dumps/ridership_modeling_jobs_20250601_101500.json")]
    pub source_file: String,
    pub from_cache: bool,
}

impl From<SnapshotEnvelope> for ProjectsData {
    fn from(envelope: SnapshotEnvelope) -> Self {
        let projects = std::sync::Arc::unwrap_or_clone(envelope.snapshot);
        Self {
            total_count: projects.unique_projects.len(),
            projects,
            last_modified: envelope.last_modified,
            source_file: envelope.source_file,
            from_cache: envelope.from_cache,
        }
    }
}

/// Success envelope of `GET /api/projects`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectsResponse {
    #[schema(example = true)]
    pub success: bool,
    pub data: ProjectsData,
}

/// Failure envelope of `GET /api/projects`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectsErrorResponse {
    #[schema(example = false)]
    pub success: bool,
    #[schema(example = "No ridership modeling files found in S3 bucket: example-production")]
    pub error: String,
}

fn error_envelope(error: Error) -> HttpResponse {
    let mut builder = HttpResponse::build(status_for(error.code()));
    builder.insert_header(no_store_header());
    if let Some(id) = error.trace_id() {
        builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
    }
    builder.json(ProjectsErrorResponse {
        success: false,
        error: redact_if_internal(&error).message().to_owned(),
    })
}

/// Latest export for an environment, served from cache while fresh.
#[utoipa::path(
    get,
    path = "/api/projects",
    params(ProjectsQuery),
    responses(
        (status = 200, description = "Latest export", body = ProjectsResponse),
        (status = 400, description = "Unknown environment", body = ProjectsErrorResponse),
        (status = 404, description = "No export found", body = ProjectsErrorResponse),
        (status = 500, description = "Internal server error", body = ProjectsErrorResponse),
        (status = 503, description = "Object storage unreachable", body = ProjectsErrorResponse)
    ),
    tags = ["projects"],
    operation_id = "listProjects"
)]
#[get("/api/projects")]
pub async fn list_projects(
    state: web::Data<HttpState>,
    query: web::Query<ProjectsQuery>,
) -> HttpResponse {
    let environment = match query.environment() {
        Ok(environment) => environment,
        Err(error) => return error_envelope(error),
    };
    let force_refresh = query.force_refresh();
    match state.snapshots.fetch_snapshot(environment, force_refresh).await {
        Ok(envelope) => {
            info!(
                %environment,
                source_file = %envelope.source_file,
                from_cache = envelope.from_cache,
                "served snapshot"
            );
            HttpResponse::Ok()
                .insert_header(no_store_header())
                .json(ProjectsResponse {
                    success: true,
                    data: envelope.into(),
                })
        }
        Err(error) => {
            warn!(%environment, code = ?error.code(), message = error.message(), "snapshot fetch failed");
            error_envelope(error)
        }
    }
}

/// Sorted, grouped view of the cached export for a shared query string.
#[utoipa::path(
    get,
    path = "/api/projects/view",
    params(
        ("env" = Option<String>, Query, description = "`local` or `production`"),
        ("groupBy" = Option<String>, Query, description = "`none`, `author`, or `agency`"),
        ("sortBy" = Option<String>, Query, description = "`name`, `agency`, `author`, `created_at`, or `updated_at`"),
        ("sortDir" = Option<String>, Query, description = "`asc` or `desc`"),
        ("selected" = Option<String>, Query, description = "Comma-separated project ids")
    ),
    responses(
        (status = 200, description = "Derived view", body = ExplorerView),
        (status = 404, description = "No export found", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Object storage unreachable", body = Error)
    ),
    tags = ["projects"],
    operation_id = "viewProjects"
)]
#[get("/api/projects/view")]
pub async fn view_projects(
    state: web::Data<HttpState>,
    request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let view_state = ViewState::from_query(request.query_string());
    let envelope = state
        .snapshots
        .fetch_snapshot(view_state.environment, false)
        .await?;
    let view = ExplorerView::from_envelope(&envelope, &view_state);
    Ok(HttpResponse::Ok().insert_header(no_store_header()).json(view))
}

#[cfg(test)]
#[path = "projects_tests.rs"]
mod tests;
