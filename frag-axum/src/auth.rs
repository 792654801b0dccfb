use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use frag_auth::AuthUser;
use tracing::{debug, error};

use crate::{ApiError, FragmentsState};

/// The authenticated caller. Extracting it rejects with 401.
#[derive(Debug, Clone)]
pub struct Owner(pub AuthUser);

impl Owner {
    pub fn id(&self) -> &str {
        &self.0.owner_id
    }
}

impl FromRequestParts<FragmentsState> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &FragmentsState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let auth = state.auth.clone();
        let user = tokio::task::spawn_blocking(move || auth.authenticate(header.as_deref()))
            .await
            .map_err(|e| {
                error!(error = %e, "credential check panicked");
                ApiError::internal("Authentication unavailable")
            })??;

        debug!(owner_id = %user.owner_id, "authenticated");
        Ok(Owner(user))
    }
}
