//! # acessos-server
//!
//! HTTP API for the credential-sharing service: bearer-authenticated REST
//! endpoints under `/api`, per-client rate limiting and a background
//! expiration sweep.

pub mod api;
pub mod jobs;
mod server;

pub use api::error::{ApiError, ApiResult, ErrorBody};
pub use api::{router, AppState};
pub use jobs::ExpirationSweepJob;
pub use server::ApiServer;
