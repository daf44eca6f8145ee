//! Terminal explorer for ridership-modeling exports served by the proxy.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use project_explorer::domain::{
    Environment, ExplorerSession, GroupBy, InMemoryLocation, LoadState, SortDirection, SortField,
    ViewStateUpdate,
};
use project_explorer::outbound::api_client::{ExplorerApiClient, TracingHooks};
use project_explorer::presentation::{render_status, render_view};
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

/// `explore` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "explore",
    about = "Browse ridership-modeling projects from the latest export",
    version
)]
struct CliArgs {
    /// Base URL of the project explorer API.
    #[arg(long = "api-url", value_name = "url", default_value = "http://localhost:8000/")]
    api_url: Url,
    /// Shared view query string, e.g. `env=production&groupBy=agency`.
    #[arg(long = "query", value_name = "query", default_value = "")]
    query: String,
    /// Environment to load; overrides the query string.
    #[arg(long = "env", value_name = "local|production")]
    environment: Option<Environment>,
    /// Group cards by `none`, `author`, or `agency`.
    #[arg(long = "group-by", value_name = "field")]
    group_by: Option<GroupBy>,
    /// Sort by `name`, `agency`, `author`, `created_at`, or `updated_at`.
    #[arg(long = "sort-by", value_name = "field")]
    sort_by: Option<SortField>,
    /// Sort direction, `asc` or `desc`.
    #[arg(long = "sort-dir", value_name = "direction")]
    sort_direction: Option<SortDirection>,
    /// Project ids to select in addition to those in the query string.
    #[arg(long = "select", value_name = "id", value_delimiter = ',')]
    select: Vec<String>,
    /// Select every project in the export.
    #[arg(long = "select-all")]
    select_all: bool,
    /// Bypass the proxy's cache freshness window.
    #[arg(long = "refresh")]
    refresh: bool,
    /// Request timeout in seconds.
    #[arg(long = "timeout-secs", value_name = "seconds", default_value_t = 30)]
    timeout_secs: u64,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let client = ExplorerApiClient::new(
        args.api_url.clone(),
        Duration::from_secs(args.timeout_secs),
        Arc::new(TracingHooks),
    )
    .wrap_err("build API client")?;
    let mut session = ExplorerSession::new(
        Arc::new(client),
        InMemoryLocation::new("/", &args.query),
    );

    let mut update = ViewStateUpdate::new();
    if let Some(environment) = args.environment {
        update = update.environment(environment);
    }
    if let Some(group_by) = args.group_by {
        update = update.group_by(group_by);
    }
    if let Some(sort_by) = args.sort_by {
        update = update.sort_by(sort_by);
    }
    if let Some(sort_direction) = args.sort_direction {
        update = update.sort_direction(sort_direction);
    }
    session.set_view_state(update);
    for id in &args.select {
        session.select(id);
    }

    if args.refresh {
        session.refresh().await;
    } else {
        session.load().await;
    }
    if args.select_all {
        session.select_all();
    }

    if let Some(status) = render_status(session.load_state()) {
        eprintln!("{status}");
    }
    match (session.load_state(), session.view()) {
        (LoadState::Loaded(_), Some(view)) => {
            print!("{}", render_view(&view));
            println!("Link: {}", session.location().href());
            Ok(())
        }
        (LoadState::Failed { message }, _) => Err(eyre!("could not load projects: {message}")),
        _ => Err(eyre!("no projects loaded")),
    }
}
