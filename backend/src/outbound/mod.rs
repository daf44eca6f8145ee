//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **object_store**: S3 REST API reader for export snapshots
//! - **cache**: in-process per-environment snapshot cache
//! - **api_client**: HTTP client for the explorer's own `/api/projects`
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod api_client;
pub mod cache;
pub mod object_store;
