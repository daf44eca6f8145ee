//! Cross-origin policy for browser clients of the API.

use actix_cors::Cors;

use crate::domain::TRACE_ID_HEADER;

const PREFLIGHT_MAX_AGE_SECS: usize = 3_600;

/// CORS middleware admitting `origins` with credentials.
///
/// Any method and request header is allowed; the `trace-id` response header
/// is exposed so browser clients can quote it in bug reports.
pub fn cors_middleware(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .expose_headers([TRACE_ID_HEADER])
        .max_age(PREFLIGHT_MAX_AGE_SECS)
}
