//! Shared cache-control policies for HTTP handlers.

use actix_web::http::header;

/// Snapshot responses are computed per request and must never be stored.
pub const NO_STORE: &str = "no-store";

/// Build the cache-control header tuple applied to every API response.
pub const fn no_store_header() -> (header::HeaderName, &'static str) {
    (header::CACHE_CONTROL, NO_STORE)
}
