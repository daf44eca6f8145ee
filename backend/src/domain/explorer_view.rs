//! Derived, render-ready view of a snapshot under a view state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::projection::{
    derive_associated_map_ids, group_projects, project_job_counts, sort_projects,
};
use super::snapshot::{Environment, ExportSnapshot, Project, SnapshotEnvelope};
use super::view_state::ViewState;

/// One project card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCard {
    pub project: Project,
    /// Jobs in the snapshot referencing this project.
    pub job_count: usize,
    pub selected: bool,
}

/// One titled group of cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub key: String,
    pub title: String,
    pub cards: Vec<ProjectCard>,
}

/// Provenance of the snapshot a view was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewSource {
    pub source_file: String,
    pub last_modified: DateTime<Utc>,
    pub from_cache: bool,
    pub exported_at: String,
}

/// Everything a front end needs to draw the explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerView {
    pub environment: Environment,
    pub total_projects: usize,
    pub total_jobs: usize,
    pub groups: Vec<GroupView>,
    /// Unique map ids produced by the selected projects' jobs.
    pub associated_map_ids: Vec<String>,
    pub selected_count: usize,
    /// Canonical query string reproducing this view.
    pub share_query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ViewSource>,
}

impl ExplorerView {
    /// Sort, group, and cross-reference `snapshot` under `state`.
    #[must_use]
    pub fn build(snapshot: &ExportSnapshot, state: &ViewState) -> Self {
        let counts = project_job_counts(&snapshot.jobs);
        let sorted = sort_projects(&snapshot.unique_projects, state.sort_by, state.sort_direction);
        let groups = group_projects(sorted, state.group_by)
            .into_iter()
            .map(|group| GroupView {
                key: group.key,
                title: group.title,
                cards: group
                    .members
                    .into_iter()
                    .map(|project| ProjectCard {
                        job_count: counts.get(project.id.as_str()).copied().unwrap_or(0),
                        selected: state.selected.contains(&project.id),
                        project,
                    })
                    .collect(),
            })
            .collect();

        Self {
            environment: state.environment,
            total_projects: snapshot.unique_projects.len(),
            total_jobs: snapshot.jobs.len(),
            groups,
            associated_map_ids: derive_associated_map_ids(&snapshot.jobs, &state.selected),
            selected_count: state.selected.len(),
            share_query: state.to_query(),
            source: None,
        }
    }

    /// Build from an envelope, recording its provenance.
    #[must_use]
    pub fn from_envelope(envelope: &SnapshotEnvelope, state: &ViewState) -> Self {
        Self {
            source: Some(ViewSource {
                source_file: envelope.source_file.clone(),
                last_modified: envelope.last_modified,
                from_cache: envelope.from_cache,
                exported_at: envelope.snapshot.exported_at.clone(),
            }),
            ..Self::build(&envelope.snapshot, state)
        }
    }
}
