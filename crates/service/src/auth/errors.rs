use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::mail::MailError;

/// Key under which errors that concern the request as a whole are reported.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Client-facing messages keyed by request field, serialized as
/// `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self { Self::default() }

    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(NON_FIELD_ERRORS, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool { self.0.contains_key(field) }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn into_result(self) -> Result<(), AuthError> {
        if self.is_empty() { Ok(()) } else { Err(AuthError::Invalid(self)) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Invalid(FieldErrors),
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("weak password: {}", .0.join(" "))]
    WeakPassword(Vec<String>),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account is not active yet")]
    AccountNotActive,
    #[error("invalid verification token: {0}")]
    InvalidToken(String),
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("mail error: {0}")]
    Mail(#[from] MailError),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Invalid(_) => 1001,
            AuthError::PasswordMismatch => 1002,
            AuthError::WeakPassword(_) => 1003,
            AuthError::InvalidCredentials => 1004,
            AuthError::AccountNotActive => 1005,
            AuthError::InvalidToken(_) => 1006,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Mail(_) => 1103,
            AuthError::Repository(_) => 1200,
        }
    }

    /// The messages to show the caller, or `None` for failures on our side.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            AuthError::Invalid(errors) => Some(errors.clone()),
            AuthError::PasswordMismatch => Some(FieldErrors::non_field("Passwords do not match")),
            AuthError::WeakPassword(messages) => {
                let mut errors = FieldErrors::new();
                for m in messages {
                    errors.add(NON_FIELD_ERRORS, m.clone());
                }
                Some(errors)
            }
            AuthError::InvalidCredentials => Some(FieldErrors::non_field("Invalid credentials")),
            AuthError::AccountNotActive => Some(FieldErrors::non_field("Account is not active yet")),
            AuthError::InvalidToken(message) => Some(FieldErrors::non_field(message.clone())),
            AuthError::HashError(_)
            | AuthError::TokenError(_)
            | AuthError::Mail(_)
            | AuthError::Repository(_) => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.field_errors().is_some()
    }
}
