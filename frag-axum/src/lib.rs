//! frag-axum: the HTTP surface of the fragments service.
//!
//! `GET /` is an unauthenticated health check. Everything under `/v1`
//! requires HTTP Basic credentials.

mod app;
mod auth;
mod error;
pub mod routes;
mod state;

pub use app::{FragmentsApp, DEFAULT_BODY_LIMIT};
pub use auth::Owner;
pub use error::ApiError;
pub use state::FragmentsState;
