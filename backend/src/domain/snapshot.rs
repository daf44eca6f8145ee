//! Export snapshot records and the cache envelope around them.
//!
//! The snapshot is the single JSON document exported from the ridership
//! modelling service: every job plus the unique projects those jobs refer to.
//! Records deserialise leniently. Missing fields fall back to empty values and
//! unknown fields are ignored, so a drifting export never fails to load.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Storage environment a snapshot is read from.
///
/// `local` reads the staging bucket; `production` reads the production bucket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Staging bucket.
    #[default]
    Local,
    /// Production bucket.
    Production,
}

impl Environment {
    /// Every environment, in display order.
    pub const ALL: [Self; 2] = [Self::Local, Self::Production];

    /// Wire representation used in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Production => "production",
        }
    }

    /// Suffix appended to the configured bucket base name.
    #[must_use]
    pub const fn bucket_suffix(self) -> &'static str {
        match self {
            Self::Local => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when an environment name is neither `local` nor `production`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown environment `{0}`; expected `local` or `production`")]
pub struct ParseEnvironmentError(pub String);

impl FromStr for Environment {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(ParseEnvironmentError(other.to_owned())),
        }
    }
}

/// Accept strings, numbers, or null where the export nominally holds a string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => value,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(value) => Some(value),
        other => Some(other.to_string()),
    })
}

/// Decode a value of the expected shape, or fall back to its default when the
/// export holds null or a value of another type.
fn lenient_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Accept byte counts as integers, non-negative floats, or numeric strings.
fn lenient_optional_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.is_finite() && *value >= 0.0)
                .map(|value| value.trunc() as u64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

/// Decode an array element by element, dropping entries that fail to decode.
/// Null or a non-array value yields an empty list.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Parameters the modelling job was requested with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RequestPayload {
    /// Kind of map the job produces.
    #[serde(default, deserialize_with = "lenient_string")]
    pub map_type: String,
    /// Project the job belongs to.
    #[serde(default, deserialize_with = "lenient_string")]
    pub project_id: String,
    /// Baseline project the scenario is compared against.
    #[serde(default, deserialize_with = "lenient_string")]
    pub baseline_project_id: String,
    /// Map identifier echoed in the request, when present.
    #[serde(default, deserialize_with = "lenient_optional_string", skip_serializing_if = "Option::is_none")]
    pub map_id: Option<String>,
    /// Service period the job was scoped to.
    #[serde(default, deserialize_with = "lenient_optional_string", skip_serializing_if = "Option::is_none")]
    pub service_period_id: Option<String>,
}

/// Outcome recorded for a finished job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JobResult {
    /// Size of the produced output.
    #[serde(default, deserialize_with = "lenient_optional_u64", skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    /// Modelling run identifier.
    #[serde(default, deserialize_with = "lenient_optional_string", skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    /// Status reported by the modelling run.
    #[serde(default, deserialize_with = "lenient_optional_string", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Whether the run was triggered.
    #[serde(default, deserialize_with = "lenient_default", skip_serializing_if = "Option::is_none")]
    pub triggered: Option<bool>,
    /// Origin/destination output location.
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub results_od: Option<String>,
    /// Stop-level output location.
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub results_stops: Option<String>,
    /// Route-level output location.
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub results_routes: Option<String>,
}

/// One exported modelling job. Never mutated after export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Job {
    /// Job identifier.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// Job type.
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub job_type: String,
    /// Job status.
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    /// Requesting user.
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: String,
    /// Generated map identifier, if the job produced one.
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub map_id: Option<String>,
    /// Request parameters.
    #[serde(default, deserialize_with = "lenient_default")]
    pub request_payload: RequestPayload,
    /// Run outcome.
    #[serde(default, deserialize_with = "lenient_default")]
    pub result: JobResult,
    /// Creation timestamp (ISO 8601).
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
    /// Last update timestamp (ISO 8601).
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: String,
}

impl Job {
    /// Project referenced by the request payload.
    #[must_use]
    pub fn project_id(&self) -> &str {
        self.request_payload.project_id.as_str()
    }

    /// Map identifier when present and non-empty.
    #[must_use]
    pub fn map_id(&self) -> Option<&str> {
        self.map_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// One unique project; `id` is unique within a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Project {
    /// Project identifier.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// Display name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Owning agency identifier.
    #[serde(default, deserialize_with = "lenient_string")]
    pub agency_id: String,
    /// Owning agency name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub agency_name: String,
    /// Author identifier.
    #[serde(default, deserialize_with = "lenient_string")]
    pub author_id: String,
    /// Author display name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub author_name: String,
    /// Creation timestamp (ISO 8601).
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
    /// Last update timestamp (ISO 8601).
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: String,
}

/// Point-in-time export of jobs and unique projects.
///
/// Treated as one atomic unit: fetched wholesale and never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExportSnapshot {
    /// When the export was produced.
    #[serde(default, deserialize_with = "lenient_string")]
    pub exported_at: String,
    /// Job count reported by the exporter.
    #[serde(default, deserialize_with = "lenient_default")]
    pub total_jobs: u64,
    /// Unique project count reported by the exporter.
    #[serde(default, deserialize_with = "lenient_default")]
    pub total_unique_projects: u64,
    /// Every exported job, in export order.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub jobs: Vec<Job>,
    /// Unique projects, in export order.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub unique_projects: Vec<Project>,
}

impl ExportSnapshot {
    /// Identifiers of every project in export order.
    pub fn project_ids(&self) -> impl Iterator<Item = &str> {
        self.unique_projects.iter().map(|project| project.id.as_str())
    }
}

/// Snapshot as handed to callers, with provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEnvelope {
    /// The export itself.
    pub snapshot: Arc<ExportSnapshot>,
    /// Storage modification time of the source object.
    pub last_modified: DateTime<Utc>,
    /// Object key the export was read from.
    pub source_file: String,
    /// `true` when served from the cache rather than freshly downloaded.
    pub from_cache: bool,
}

/// Storage metadata of one export object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// Entity tag, without quotes.
    pub etag: String,
    /// Storage modification time.
    pub last_modified: DateTime<Utc>,
}

/// Cache entry for one environment.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSnapshot {
    /// Cached export.
    pub snapshot: Arc<ExportSnapshot>,
    /// Object key the export was read from.
    pub source_file: String,
    /// Entity tag reported by storage, without quotes.
    pub etag: String,
    /// Storage modification time of the source object.
    pub last_modified: DateTime<Utc>,
    /// When the entry was last confirmed against storage.
    pub fetched_at: DateTime<Utc>,
}

impl CachedSnapshot {
    /// Whether the entry is still inside the freshness window at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        now.signed_duration_since(self.fetched_at) < window
    }

    /// Whether storage still holds the object this entry was built from.
    #[must_use]
    pub fn matches(&self, source_file: &str, etag: &str) -> bool {
        self.source_file == source_file && self.etag == etag
    }

    /// Copy of the entry confirmed at `now`.
    #[must_use]
    pub fn renewed(&self, now: DateTime<Utc>) -> Self {
        Self {
            fetched_at: now,
            ..self.clone()
        }
    }

    /// Envelope for callers.
    #[must_use]
    pub fn to_envelope(&self, from_cache: bool) -> SnapshotEnvelope {
        SnapshotEnvelope {
            snapshot: Arc::clone(&self.snapshot),
            last_modified: self.last_modified,
            source_file: self.source_file.clone(),
            from_cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("local", Environment::Local)]
    #[case("production", Environment::Production)]
    fn parses_known_environments(#[case] raw: &str, #[case] expected: Environment) {
        assert_eq!(raw.parse::<Environment>(), Ok(expected));
        assert_eq!(expected.to_string(), raw);
    }

    #[rstest]
    #[case("staging")]
    #[case("Production")]
    #[case("")]
    fn rejects_unknown_environments(#[case] raw: &str) {
        assert!(raw.parse::<Environment>().is_err());
    }

    #[test]
    fn decodes_export_with_missing_and_unexpected_fields() {
        let raw = json!({
            "exported_at": "2025-06-01T10:00:00Z",
            "total_jobs": 1,
            "total_unique_projects": 1,
            "jobs": [{
                "id": 42,
                "type": "ridership",
                "status": "done",
                "user_id": null,
                "map_id": null,
                "request_payload": {"map_type": "od", "project_id": "p1", "baseline_project_id": "p0"},
                "result": {"results_od": "s3://od", "results_stops": null, "results_routes": "s3://routes"},
                "created_at": "2025-05-01T00:00:00Z",
                "updated_at": "2025-05-02T00:00:00Z",
                "unexpected": true
            }],
            "unique_projects": [{"id": "p1", "name": "Alpha"}]
        });

        let snapshot: ExportSnapshot = serde_json::from_value(raw).expect("lenient decode");
        let job = snapshot.jobs.first().expect("one job");
        assert_eq!(job.id, "42");
        assert_eq!(job.user_id, "");
        assert_eq!(job.project_id(), "p1");
        assert_eq!(job.map_id(), None);
        assert_eq!(job.result.results_routes.as_deref(), Some("s3://routes"));
        let project = snapshot.unique_projects.first().expect("one project");
        assert_eq!(project.agency_name, "");
    }

    #[test]
    fn null_and_mistyped_aggregates_fall_back_to_defaults() {
        let raw = json!({
            "exported_at": null,
            "total_jobs": null,
            "total_unique_projects": "three",
            "jobs": [
                "not a job",
                {
                    "id": "j1",
                    "request_payload": null,
                    "result": {"bytes": "2048", "triggered": "yes"}
                },
                {"id": "j2", "request_payload": 7, "result": [1, 2]}
            ],
            "unique_projects": {"id": "p1"}
        });

        let snapshot: ExportSnapshot = serde_json::from_value(raw).expect("lenient decode");
        assert_eq!(snapshot.total_jobs, 0);
        assert_eq!(snapshot.total_unique_projects, 0);
        assert!(snapshot.unique_projects.is_empty());
        let ids: Vec<&str> = snapshot.jobs.iter().map(|job| job.id.as_str()).collect();
        assert_eq!(ids, ["j1", "j2"]);
        let first = snapshot.jobs.first().expect("first job");
        assert_eq!(first.request_payload, RequestPayload::default());
        assert_eq!(first.result.bytes, Some(2048));
        assert_eq!(first.result.triggered, None);
        let second = snapshot.jobs.get(1).expect("second job");
        assert_eq!(second.result, JobResult::default());
    }

    #[rstest]
    #[case(json!(512), Some(512))]
    #[case(json!(512.9), Some(512))]
    #[case(json!(" 64 "), Some(64))]
    #[case(json!(-1), None)]
    #[case(json!("lots"), None)]
    #[case(json!(null), None)]
    #[case(json!({"n": 1}), None)]
    fn byte_counts_decode_from_numbers_or_numeric_strings(
        #[case] bytes: Value,
        #[case] expected: Option<u64>,
    ) {
        let result: JobResult =
            serde_json::from_value(json!({ "bytes": bytes })).expect("lenient decode");
        assert_eq!(result.bytes, expected);
    }

    #[test]
    fn null_job_list_decodes_as_empty() {
        let snapshot: ExportSnapshot =
            serde_json::from_value(json!({"jobs": null, "unique_projects": null}))
                .expect("lenient decode");
        assert!(snapshot.jobs.is_empty());
        assert!(snapshot.unique_projects.is_empty());
    }

    #[test]
    fn empty_map_ids_are_treated_as_absent() {
        let job = Job {
            map_id: Some(String::new()),
            ..Job::default()
        };
        assert_eq!(job.map_id(), None);
    }

    #[test]
    fn freshness_window_is_exclusive() {
        let fetched_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("valid time");
        let entry = CachedSnapshot {
            snapshot: Arc::new(ExportSnapshot::default()),
            source_file: "dumps/a.json".to_owned(),
            etag: "abc".to_owned(),
            last_modified: fetched_at,
            fetched_at,
        };
        let window = TimeDelta::seconds(300);
        assert!(entry.is_fresh(fetched_at + TimeDelta::seconds(299), window));
        assert!(!entry.is_fresh(fetched_at + TimeDelta::seconds(300), window));
    }
}
