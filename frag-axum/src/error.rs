use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use frag_auth::AuthError;
use frag_core::FragmentError;
use serde_json::json;
use tracing::error;

/// Error returned by every handler.
///
/// Renders as `{"status":"error","error":{"message":..,"code":..}}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<FragmentError> for ApiError {
    fn from(e: FragmentError) -> Self {
        let status = StatusCode::from_u16(e.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %e, kind = e.kind().name(), "fragment operation failed");
        }
        Self::new(status, e.client_message())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::NotAuthenticated => Self::unauthorized(),
            other => {
                error!(error = %other, "authentication backend failed");
                Self::internal("Authentication unavailable")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "status": "error",
            "error": {
                "message": self.message,
                "code": self.status.as_u16(),
            }
        }));

        let mut res = (self.status, body).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            res.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"fragments\""),
            );
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frag_blob::StoreError;

    #[test]
    fn fragment_errors_keep_their_status() {
        let cases = [
            (FragmentError::invalid("x"), 400),
            (FragmentError::unsupported_type("a/b"), 415),
            (FragmentError::unsupported_conversion("a/b", "c/d"), 415),
            (FragmentError::not_found("id"), 404),
            (FragmentError::from(StoreError::backend_msg("s3 down")), 500),
        ];
        for (err, code) in cases {
            assert_eq!(ApiError::from(err).status().as_u16(), code);
        }
    }

    #[test]
    fn storage_detail_is_hidden() {
        let err = ApiError::from(FragmentError::from(StoreError::backend_msg("s3 down")));
        assert!(!err.message().contains("s3"));
    }

    #[test]
    fn unauthorized_carries_challenge() {
        let res = ApiError::from(AuthError::NotAuthenticated).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().get(header::WWW_AUTHENTICATE).is_some());
    }
}
