use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use axum::Json;

use crate::errors::ApiError;

/// `Json<T>` whose rejections render as `{"detail": ...}` bodies.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::Malformed(format!("JSON parse error - {}", rejection.body_text()))),
        }
    }
}
