//! Query and projection engine over an export snapshot.
//!
//! Every function here is pure and synchronous. Callers re-run them on each
//! state change; inputs are never mutated.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::selection::SelectionSet;
use super::snapshot::{Job, Project};

/// Field a project list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Name,
    Agency,
    Author,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Agency => "agency",
            Self::Author => "author",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }

    /// Lenient lookup: unrecognised names sort by `name`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(Self::Name)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Dimension a sorted project list is partitioned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    None,
    Author,
    Agency,
}

impl GroupBy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Author => "author",
            Self::Agency => "agency",
        }
    }
}

/// Raised when a view parameter does not name a known value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseViewParamError {
    kind: &'static str,
    value: String,
}

macro_rules! impl_view_param {
    ($ty:ty, $kind:literal, [$($variant:ident),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = ParseViewParamError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                [$(Self::$variant),+]
                    .into_iter()
                    .find(|candidate| candidate.as_str() == s)
                    .ok_or_else(|| ParseViewParamError {
                        kind: $kind,
                        value: s.to_owned(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_view_param!(SortField, "sort field", [Name, Agency, Author, CreatedAt, UpdatedAt]);
impl_view_param!(SortDirection, "sort direction", [Asc, Desc]);
impl_view_param!(GroupBy, "group-by dimension", [None, Author, Agency]);

/// One partition of a sorted project list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectGroup {
    /// Partition key; empty for the single ungrouped partition.
    pub key: String,
    /// Display title; empty for the single ungrouped partition.
    pub title: String,
    /// Members in sorted order.
    pub members: Vec<Project>,
}

/// Unique map identifiers produced by jobs of the selected projects.
///
/// Returns an empty list for an empty selection. Otherwise the result is
/// deduplicated and in ascending byte order.
///
/// # Examples
/// ```
/// use project_explorer::domain::{Job, SelectionSet, derive_associated_map_ids};
///
/// let mut job = Job::default();
/// job.request_payload.project_id = "p1".into();
/// job.map_id = Some("m1".into());
/// let selected: SelectionSet = ["p1"].into_iter().collect();
/// assert_eq!(derive_associated_map_ids(&[job], &selected), vec!["m1".to_owned()]);
/// ```
#[must_use]
pub fn derive_associated_map_ids(jobs: &[Job], selected: &SelectionSet) -> Vec<String> {
    if selected.is_empty() {
        return Vec::new();
    }
    jobs.iter()
        .filter(|job| selected.contains(job.project_id()))
        .filter_map(Job::map_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Sorted copy of `projects`.
///
/// The sort is stable, so ties keep their input order in both directions.
#[must_use]
pub fn sort_projects(projects: &[Project], field: SortField, direction: SortDirection) -> Vec<Project> {
    let mut sorted = projects.to_vec();
    sorted.sort_by(|left, right| {
        let ordering = compare_by(field, left, right);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    sorted
}

fn compare_by(field: SortField, left: &Project, right: &Project) -> Ordering {
    match field {
        SortField::Name => left.name.cmp(&right.name),
        SortField::Agency => left.agency_name.cmp(&right.agency_name),
        SortField::Author => left.author_name.cmp(&right.author_name),
        SortField::CreatedAt => {
            parse_timestamp_millis(&left.created_at).cmp(&parse_timestamp_millis(&right.created_at))
        }
        SortField::UpdatedAt => {
            parse_timestamp_millis(&left.updated_at).cmp(&parse_timestamp_millis(&right.updated_at))
        }
    }
}

/// Milliseconds since the Unix epoch for an ISO 8601 timestamp.
///
/// Accepts full RFC 3339 values, naive date-times (read as UTC), and bare
/// dates. Anything else yields `None`, which orders before every timestamp.
#[must_use]
pub fn parse_timestamp_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.timestamp_millis());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
}

/// Partition an already sorted list.
///
/// `GroupBy::None` yields one group holding everything. Other dimensions
/// split on exact, case-sensitive names; groups come back in ascending key
/// order with members in their input order.
#[must_use]
pub fn group_projects(sorted: Vec<Project>, group_by: GroupBy) -> Vec<ProjectGroup> {
    let key_of = match group_by {
        GroupBy::None => {
            return vec![ProjectGroup {
                key: String::new(),
                title: String::new(),
                members: sorted,
            }];
        }
        GroupBy::Author => author_key,
        GroupBy::Agency => agency_key,
    };

    let mut partitions: BTreeMap<String, Vec<Project>> = BTreeMap::new();
    for project in sorted {
        partitions
            .entry(key_of(&project).to_owned())
            .or_default()
            .push(project);
    }
    partitions
        .into_iter()
        .map(|(key, members)| ProjectGroup {
            title: key.clone(),
            key,
            members,
        })
        .collect()
}

fn author_key(project: &Project) -> &str {
    project.author_name.as_str()
}

fn agency_key(project: &Project) -> &str {
    project.agency_name.as_str()
}

/// Number of jobs referencing each project identifier.
#[must_use]
pub fn project_job_counts(jobs: &[Job]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for job in jobs {
        *counts.entry(job.project_id()).or_insert(0) += 1;
    }
    counts
}

/// Jobs belonging to `project_id`, in export order.
pub fn jobs_for_project<'a>(jobs: &'a [Job], project_id: &'a str) -> impl Iterator<Item = &'a Job> {
    jobs.iter().filter(move |job| job.project_id() == project_id)
}
