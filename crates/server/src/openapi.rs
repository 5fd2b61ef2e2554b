use std::collections::HashMap;

use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct SignUpRequest {
    pub email: String,
    pub username: String,
    /// `+999999999`, up to 15 digits.
    pub phone_number: String,
    pub password: String,
    pub password_confirmation: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct VerifyRequest { pub token: String }

#[derive(ToSchema)]
pub struct UserResponse {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

#[derive(ToSchema)]
pub struct LoginResponse {
    pub user: UserResponse,
    /// 40 hex characters.
    pub access_token: String,
}

#[derive(ToSchema)]
pub struct MessageResponse { pub message: String }

/// Messages keyed by field name, or `non_field_errors`.
#[derive(ToSchema)]
pub struct FieldErrorsResponse {
    #[schema(value_type = Object)]
    pub errors: HashMap<String, Vec<String>>,
}

#[derive(ToSchema)]
pub struct DetailResponse { pub detail: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::signup,
        crate::routes::users::login,
        crate::routes::users::verify,
    ),
    components(
        schemas(
            HealthResponse,
            SignUpRequest,
            LoginRequest,
            VerifyRequest,
            UserResponse,
            LoginResponse,
            MessageResponse,
            FieldErrorsResponse,
            DetailResponse,
        )
    ),
    tags(
        (name = "health"),
        (name = "users")
    )
)]
pub struct ApiDoc;
