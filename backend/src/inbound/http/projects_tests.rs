//! Handler coverage for the snapshot endpoints.

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{FixtureSnapshotQuery, MockSnapshotQuery, SnapshotQuery};
use crate::test_support::{fixed_time, sample_snapshot};

fn envelope(from_cache: bool) -> SnapshotEnvelope {
    SnapshotEnvelope {
        snapshot: Arc::new(sample_snapshot()),
        last_modified: fixed_time(),
        source_file: "dumps/jobs_20250601_101500.json".to_owned(),
        from_cache,
    }
}

async fn call(snapshots: impl SnapshotQuery + 'static, uri: &str) -> (StatusCode, Option<String>, Value) {
    let state = web::Data::new(HttpState::new(Arc::new(snapshots)));
    let app = test::init_service(
        App::new()
            .app_data(state)
            .service(list_projects)
            .service(view_projects),
    )
    .await;
    let response = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    let status = response.status();
    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body: Value = test::read_body_json(response).await;
    (status, cache_control, body)
}

#[actix_web::test]
async fn list_projects_wraps_snapshot_in_success_envelope() {
    let mut snapshots = MockSnapshotQuery::new();
    snapshots
        .expect_fetch_snapshot()
        .with(eq(Environment::Production), eq(true))
        .times(1)
        .returning(|_, _| Ok(envelope(false)));

    let (status, cache_control, body) =
        call(snapshots, "/api/projects?environment=production&refresh=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("no-store"));
    assert_eq!(body["success"], json!(true));
    let data = &body["data"];
    assert_eq!(data["totalCount"], json!(2));
    assert_eq!(data["sourceFile"], json!("dumps/jobs_20250601_101500.json"));
    assert_eq!(data["fromCache"], json!(false));
    assert_eq!(data["lastModified"], json!("2025-06-01T12:00:00Z"));
    assert_eq!(
        data["projects"]["unique_projects"][0]["id"],
        json!("p1"),
        "projects keep the export's field names"
    );
}

#[actix_web::test]
async fn missing_environment_defaults_to_local_without_refresh() {
    let mut snapshots = MockSnapshotQuery::new();
    snapshots
        .expect_fetch_snapshot()
        .with(eq(Environment::Local), eq(false))
        .times(1)
        .returning(|_, _| Ok(envelope(true)));

    let (status, _, body) = call(snapshots, "/api/projects").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fromCache"], json!(true));
}

#[actix_web::test]
async fn unknown_environment_is_rejected_before_fetching() {
    let mut snapshots = MockSnapshotQuery::new();
    snapshots.expect_fetch_snapshot().never();

    let (status, cache_control, body) = call(snapshots, "/api/projects?environment=staging").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(cache_control.as_deref(), Some("no-store"));
    assert_eq!(body["success"], json!(false));
    assert!(
        body["error"].as_str().is_some_and(|message| message.contains("staging")),
        "error should name the rejected value: {body}"
    );
}

#[rstest]
#[case::not_found(
    Error::not_found("No ridership modeling files found in S3 bucket: b-production"),
    StatusCode::NOT_FOUND,
    "No ridership modeling files found in S3 bucket: b-production"
)]
#[case::unavailable(
    Error::service_unavailable("object store unreachable"),
    StatusCode::SERVICE_UNAVAILABLE,
    "object store unreachable"
)]
#[case::internal(
    Error::internal("Could not fetch file content: secret detail"),
    StatusCode::INTERNAL_SERVER_ERROR,
    "Internal server error"
)]
#[actix_web::test]
async fn failures_use_error_envelope(
    #[case] error: Error,
    #[case] expected_status: StatusCode,
    #[case] expected_message: &str,
) {
    let mut snapshots = MockSnapshotQuery::new();
    snapshots
        .expect_fetch_snapshot()
        .returning(move |_, _| Err(error.clone()));

    let (status, _, body) = call(snapshots, "/api/projects?environment=production").await;

    assert_eq!(status, expected_status);
    assert_eq!(body, json!({"success": false, "error": expected_message}));
}

#[actix_web::test]
async fn view_projects_applies_query_parameters() {
    let mut snapshots = MockSnapshotQuery::new();
    snapshots
        .expect_fetch_snapshot()
        .with(eq(Environment::Local), eq(false))
        .returning(|_, _| Ok(envelope(true)));

    let (status, cache_control, body) = call(
        snapshots,
        "/api/projects/view?groupBy=agency&sortBy=name&sortDir=asc&selected=p1",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("no-store"));
    let titles: Vec<&str> = body["groups"]
        .as_array()
        .expect("groups array")
        .iter()
        .filter_map(|group| group["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Alpha Buses", "Zeta Transit"]);
    assert_eq!(body["associatedMapIds"], json!(["m1"]));
    assert_eq!(body["selectedCount"], json!(1));
    assert_eq!(
        body["shareQuery"],
        json!("env=local&groupBy=agency&sortBy=name&sortDir=asc&selected=p1")
    );
    assert_eq!(body["source"]["fromCache"], json!(true));
}

#[actix_web::test]
async fn view_projects_on_empty_snapshot_has_single_empty_group() {
    let (status, _, body) = call(FixtureSnapshotQuery, "/api/projects/view").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalProjects"], json!(0));
    assert_eq!(body["groups"][0]["cards"], json!([]));
}

#[actix_web::test]
async fn view_projects_reports_domain_errors() {
    let mut snapshots = MockSnapshotQuery::new();
    snapshots
        .expect_fetch_snapshot()
        .returning(|_, _| Err(Error::service_unavailable("object store unreachable")));

    let (status, _, body) = call(snapshots, "/api/projects/view?env=production").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], json!("service_unavailable"));
}
