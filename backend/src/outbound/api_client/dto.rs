//! DTOs for decoding `/api/projects` responses.
//!
//! The client decodes into these transport DTOs first, then maps into the
//! domain envelope in one pass.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{ExportSnapshot, SnapshotEnvelope};

#[derive(Debug, Deserialize)]
pub(super) struct ProjectsResponseDto {
    pub(super) success: bool,
    #[serde(default)]
    pub(super) data: Option<ProjectsDataDto>,
    #[serde(default)]
    pub(super) error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProjectsDataDto {
    pub(super) projects: ExportSnapshot,
    pub(super) last_modified: DateTime<Utc>,
    pub(super) source_file: String,
    pub(super) from_cache: bool,
}

impl ProjectsResponseDto {
    /// Domain envelope, or the proxy's error message.
    pub(super) fn into_envelope(self) -> Result<SnapshotEnvelope, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(SnapshotEnvelope {
                snapshot: Arc::new(data.projects),
                last_modified: data.last_modified,
                source_file: data.source_file,
                from_cache: data.from_cache,
            }),
            (true, None) => Err("successful response without data".to_owned()),
            (false, _) => Err(self
                .error
                .unwrap_or_else(|| "Unknown error occurred".to_owned())),
        }
    }
}
