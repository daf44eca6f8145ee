//! Domain primitives, services, and ports.
//!
//! Purpose: hold the export snapshot model, the projection engine that
//! sorts, groups, and cross-references it, and the view state that mirrors
//! the explorer into a shareable query string. Nothing here performs I/O
//! directly; storage and HTTP sit behind the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - ExportSnapshot, Job, Project — records of one export.
//! - SnapshotService — cached read path implementing `SnapshotQuery`.
//! - ViewStateManager — view parameters kept in step with a location.
//! - ExplorerSession — client-side load status plus derived views.

pub mod error;
pub mod explorer;
pub mod explorer_view;
pub mod ports;
pub mod projection;
pub mod selection;
pub mod snapshot;
pub mod snapshot_service;
pub mod trace_id;
pub mod view_state;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::explorer::{ExplorerSession, FetchResult, LoadState};
pub use self::explorer_view::{ExplorerView, GroupView, ProjectCard, ViewSource};
pub use self::projection::{
    GroupBy, ParseViewParamError, ProjectGroup, SortDirection, SortField,
    derive_associated_map_ids, group_projects, jobs_for_project, parse_timestamp_millis,
    project_job_counts, sort_projects,
};
pub use self::selection::SelectionSet;
pub use self::snapshot::{
    CachedSnapshot, Environment, ExportSnapshot, Job, JobResult, ObjectMetadata,
    ParseEnvironmentError, Project, RequestPayload, SnapshotEnvelope,
};
pub use self::snapshot_service::{DEFAULT_FRESHNESS, SnapshotService, SnapshotServiceConfig};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::view_state::{
    InMemoryLocation, LocationDescriptor, ViewState, ViewStateManager, ViewStateUpdate,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use project_explorer::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no exports"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
