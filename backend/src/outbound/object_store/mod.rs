//! Object storage outbound adapters.
//!
//! This module provides an AWS SDK implementation of the `SnapshotSource`
//! port together with the client settings it is built from.

mod client;
mod listing;
mod s3_source;

pub use client::S3ClientSettings;
pub use listing::select_latest_key;
pub use s3_source::{ObjectStoreLayout, S3SnapshotSource};
