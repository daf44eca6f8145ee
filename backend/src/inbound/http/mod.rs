//! HTTP inbound adapter exposing REST endpoints.

pub mod cache_control;
pub mod cors;
pub mod error;
pub mod health;
pub mod projects;
pub mod state;

pub use error::ApiResult;
