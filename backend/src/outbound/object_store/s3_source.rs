//! AWS SDK backed object storage adapter.
//!
//! This adapter owns transport details only: paginated bucket listings,
//! object metadata, body download, and the mapping of SDK failures onto
//! [`SnapshotSourceError`]. Requests are signed by the SDK.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::listing::select_latest_key;
use crate::domain::ports::{SnapshotSource, SnapshotSourceError};
use crate::domain::{Environment, ExportSnapshot, ObjectMetadata};

const MAX_LISTING_PAGES: usize = 1_000;

/// Where exports live inside each environment's bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStoreLayout {
    /// Bucket name without the environment suffix.
    pub bucket_base: String,
    /// Key prefix exports are listed under.
    pub prefix: String,
    /// File name stem preceding the `YYYYMMDD_HHMMSS.json` timestamp.
    pub pattern: String,
}

impl ObjectStoreLayout {
    /// Bucket holding `environment`'s exports.
    #[must_use]
    pub fn bucket(&self, environment: Environment) -> String {
        format!("{}{}", self.bucket_base, environment.bucket_suffix())
    }
}

/// Snapshot source reading exports through the AWS S3 SDK.
pub struct S3SnapshotSource {
    client: Client,
    layout: ObjectStoreLayout,
}

impl S3SnapshotSource {
    /// Wrap a configured S3 client; see [`super::S3ClientSettings`].
    #[must_use]
    pub fn new(client: Client, layout: ObjectStoreLayout) -> Self {
        Self { client, layout }
    }

    async fn list_keys(&self, bucket: &str) -> Result<Vec<String>, SnapshotSourceError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(&self.layout.prefix)
            .into_paginator()
            .send();
        let mut keys = Vec::new();
        let mut fetched = 0;
        while let Some(page) = pages.next().await {
            let page = page.map_err(map_sdk_error)?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(str::to_owned),
            );
            fetched += 1;
            if fetched == MAX_LISTING_PAGES {
                if page.next_continuation_token().is_some() {
                    warn!(
                        bucket,
                        pages = fetched,
                        listed = keys.len(),
                        "listing page cap reached; newer exports may be missed"
                    );
                }
                break;
            }
        }
        Ok(keys)
    }
}

#[async_trait]
impl SnapshotSource for S3SnapshotSource {
    async fn locate_latest(&self, environment: Environment) -> Result<String, SnapshotSourceError> {
        let bucket = self.layout.bucket(environment);
        let keys = self.list_keys(&bucket).await?;
        debug!(%environment, listed = keys.len(), "listed export keys");
        select_latest_key(keys.iter().map(String::as_str), &self.layout.pattern)
            .map(str::to_owned)
            .ok_or_else(|| {
                SnapshotSourceError::not_found(format!(
                    "No ridership modeling files found in S3 bucket: {bucket}"
                ))
            })
    }

    async fn object_metadata(
        &self,
        environment: Environment,
        key: &str,
    ) -> Result<ObjectMetadata, SnapshotSourceError> {
        let head = self
            .client
            .head_object()
            .bucket(self.layout.bucket(environment))
            .key(key)
            .send()
            .await
            .map_err(map_sdk_error)?;
        let etag = head
            .e_tag()
            .map(|value| value.trim_matches('"').to_owned())
            .ok_or_else(|| SnapshotSourceError::decode(format!("{key} has no ETag")))?;
        let last_modified = head
            .last_modified()
            .ok_or_else(|| SnapshotSourceError::decode(format!("{key} has no Last-Modified")))
            .and_then(|value| to_chrono(value.secs(), value.subsec_nanos()))?;
        Ok(ObjectMetadata {
            etag,
            last_modified,
        })
    }

    async fn fetch_snapshot(
        &self,
        environment: Environment,
        key: &str,
    ) -> Result<ExportSnapshot, SnapshotSourceError> {
        let object = self
            .client
            .get_object()
            .bucket(self.layout.bucket(environment))
            .key(key)
            .send()
            .await
            .map_err(map_sdk_error)?;
        let body = object
            .body
            .collect()
            .await
            .map_err(|error| SnapshotSourceError::transport(format!("reading {key}: {error}")))?
            .into_bytes();
        serde_json::from_slice(&body).map_err(|error| {
            SnapshotSourceError::decode(format!("invalid export JSON in {key}: {error}"))
        })
    }
}

fn to_chrono(secs: i64, nanos: u32) -> Result<DateTime<Utc>, SnapshotSourceError> {
    DateTime::from_timestamp(secs, nanos)
        .ok_or_else(|| SnapshotSourceError::decode(format!("Last-Modified out of range: {secs}s")))
}

fn map_sdk_error<E>(error: SdkError<E, HttpResponse>) -> SnapshotSourceError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&error).to_string();
    match &error {
        SdkError::TimeoutError(_) => SnapshotSourceError::timeout(message),
        SdkError::DispatchFailure(failure) if failure.is_timeout() => {
            SnapshotSourceError::timeout(message)
        }
        SdkError::DispatchFailure(_) => SnapshotSourceError::transport(message),
        SdkError::ResponseError(_) => SnapshotSourceError::decode(message),
        SdkError::ServiceError(service) => classify_status(service.raw().status().as_u16(), message),
        _ => SnapshotSourceError::status(message),
    }
}

fn classify_status(status: u16, message: String) -> SnapshotSourceError {
    match status {
        404 => SnapshotSourceError::not_found(message),
        408 | 504 => SnapshotSourceError::timeout(message),
        429 | 500..=599 => SnapshotSourceError::transport(message),
        _ => SnapshotSourceError::status(message),
    }
}
