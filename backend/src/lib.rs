//! Ridership-modeling project explorer.
//!
//! A snapshot proxy that serves the latest export from object storage with
//! per-environment caching, plus the client-side core that sorts, groups,
//! and cross-references the export under a shareable view state.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod presentation;
#[cfg(test)]
mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
