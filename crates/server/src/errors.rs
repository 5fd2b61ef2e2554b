use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use common::types::Detail;
use service::auth::errors::AuthError;

/// Handler-level failure, rendered as the JSON error bodies clients expect.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// The body could not be read as the expected JSON document.
    #[error("malformed request: {0}")]
    Malformed(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(e) => match e.field_errors() {
                Some(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
                None => {
                    error!(code = e.code(), error = %e, "request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(Detail::new("A server error occurred.")),
                    )
                        .into_response()
                }
            },
            ApiError::Malformed(msg) => (StatusCode::BAD_REQUEST, Json(Detail::new(msg))).into_response(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("mail transport unavailable: {0}")]
    Mail(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::auth::errors::FieldErrors;

    #[test]
    fn client_errors_are_bad_request() {
        let mut errors = FieldErrors::new();
        errors.add("email", "Enter a valid email address.");
        let resp = ApiError::from(AuthError::Invalid(errors)).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::Auth(AuthError::AccountNotActive).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::Malformed("EOF while parsing".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn infrastructure_errors_are_internal() {
        let resp = ApiError::Auth(AuthError::Repository("pool timed out".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
