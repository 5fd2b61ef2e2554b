use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validation::PHONE_NUMBER_RE;

/// Sign-up input.
///
/// Missing keys deserialize to empty strings so they are reported as blank
/// fields instead of failing the whole body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SignUpInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 4, max = 20))]
    pub username: String,
    #[validate(regex(
        path = *PHONE_NUMBER_RE,
        message = "Phone number must be entered in the format: +999999999. Up to 15 digits allowed."
    ))]
    pub phone_number: String,
    #[validate(length(min = 8, max = 64))]
    pub password: String,
    #[validate(length(min = 8, max = 64))]
    pub password_confirmation: String,
    #[validate(length(min = 2, max = 30))]
    pub first_name: String,
    #[validate(length(min = 2, max = 30))]
    pub last_name: String,
}

/// Login input
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 64))]
    pub password: String,
}

impl SignUpInput {
    /// Strip surrounding whitespace from every field; whitespace-only values
    /// become empty and are reported as blank.
    pub fn trimmed(mut self) -> Self {
        for field in [
            &mut self.email,
            &mut self.username,
            &mut self.phone_number,
            &mut self.password,
            &mut self.password_confirmation,
            &mut self.first_name,
            &mut self.last_name,
        ] {
            trim_in_place(field);
        }
        self
    }
}

impl LoginInput {
    pub fn trimmed(mut self) -> Self {
        trim_in_place(&mut self.email);
        trim_in_place(&mut self.password);
        self
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Account verification input: the token mailed at sign-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyInput {
    pub token: String,
}

/// Fields needed to insert a user, already validated.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&SignUpInput> for NewUser {
    fn from(input: &SignUpInput) -> Self {
        Self {
            username: input.username.clone(),
            email: input.email.clone(),
            phone_number: input.phone_number.clone(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
        }
    }
}

/// Domain user (business view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub is_verified: bool,
}

/// What clients get to see of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

impl From<&AuthUser> for PublicUser {
    fn from(u: &AuthUser) -> Self {
        Self {
            username: u.username.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            phone_number: u.phone_number.clone(),
        }
    }
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Stored bearer token; `created` tells whether this lookup inserted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub key: String,
    pub user_id: Uuid,
    pub created: bool,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginSession {
    pub user: AuthUser,
    pub access_token: String,
}
