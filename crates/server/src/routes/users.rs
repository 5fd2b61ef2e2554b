use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use service::auth::{
    domain::{LoginInput, PublicUser, SignUpInput, VerifyInput},
    repository::AuthRepository,
    AuthService,
};

use crate::errors::ApiError;
use crate::extract::JsonBody;
use crate::metrics::{record, LOGINS_TOTAL, SIGNUPS_TOTAL, VERIFICATIONS_TOTAL};

pub const VERIFIED_MESSAGE: &str = "Congratulation, now go share some rides!";

pub struct ServerState<R: AuthRepository> {
    pub auth: Arc<AuthService<R>>,
}

impl<R: AuthRepository> ServerState<R> {
    pub fn new(auth: AuthService<R>) -> Self {
        Self { auth: Arc::new(auth) }
    }
}

// Derived Clone would require `R: Clone`.
impl<R: AuthRepository> Clone for ServerState<R> {
    fn clone(&self) -> Self {
        Self { auth: Arc::clone(&self.auth) }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginOutput {
    pub user: PublicUser,
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageOutput {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/users/signup",
    tag = "users",
    request_body = crate::openapi::SignUpRequest,
    responses(
        (status = 201, description = "Account created, verification email sent", body = crate::openapi::UserResponse),
        (status = 400, description = "Field, password or uniqueness errors", body = crate::openapi::FieldErrorsResponse),
        (status = 500, description = "Storage or mail failure", body = crate::openapi::DetailResponse)
    )
)]
pub async fn signup<R: AuthRepository + 'static>(
    State(state): State<ServerState<R>>,
    JsonBody(input): JsonBody<SignUpInput>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let result = state.auth.sign_up(input).await;
    record(&SIGNUPS_TOTAL, "created", &result);
    let user = result?;
    Ok((StatusCode::CREATED, Json(PublicUser::from(&user))))
}

#[utoipa::path(
    post,
    path = "/users/login",
    tag = "users",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 201, description = "Authenticated", body = crate::openapi::LoginResponse),
        (status = 400, description = "Invalid credentials or account not active", body = crate::openapi::FieldErrorsResponse)
    )
)]
pub async fn login<R: AuthRepository + 'static>(
    State(state): State<ServerState<R>>,
    JsonBody(input): JsonBody<LoginInput>,
) -> Result<(StatusCode, Json<LoginOutput>), ApiError> {
    let result = state.auth.login(input).await;
    record(&LOGINS_TOTAL, "succeeded", &result);
    let session = result?;
    let out = LoginOutput { user: PublicUser::from(&session.user), access_token: session.access_token };
    Ok((StatusCode::CREATED, Json(out)))
}

#[utoipa::path(
    post,
    path = "/users/verify",
    tag = "users",
    request_body = crate::openapi::VerifyRequest,
    responses(
        (status = 200, description = "Account verified", body = crate::openapi::MessageResponse),
        (status = 400, description = "Expired or invalid token", body = crate::openapi::FieldErrorsResponse)
    )
)]
pub async fn verify<R: AuthRepository + 'static>(
    State(state): State<ServerState<R>>,
    JsonBody(input): JsonBody<VerifyInput>,
) -> Result<Json<MessageOutput>, ApiError> {
    let result = state.auth.verify_account(input).await;
    record(&VERIFICATIONS_TOTAL, "verified", &result);
    result?;
    Ok(Json(MessageOutput { message: VERIFIED_MESSAGE.to_string() }))
}
