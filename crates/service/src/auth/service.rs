use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use chrono::Duration;
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{AuthUser, LoginInput, LoginSession, NewUser, SignUpInput, VerifyInput};
use super::errors::{AuthError, FieldErrors};
use super::policy::PasswordPolicy;
use super::repository::AuthRepository;
use super::token::{decode_verification_token, generate_access_key, issue_verification_token};
use super::validation::{validate_fields, UNIQUE_MESSAGE};
use crate::mail::template::AccountVerificationEmail;
use crate::mail::{DynMailer, EmailMessage};

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 key for verification tokens.
    pub secret_key: String,
    pub verification_ttl: Duration,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            verification_ttl: Duration::days(3),
            password_algorithm: "argon2".into(),
        }
    }

    pub fn from_settings(security: &configs::SecurityConfig) -> Self {
        Self {
            verification_ttl: Duration::days(security.verification_token_days),
            ..Self::new(security.secret_key.clone())
        }
    }
}

/// Sign-up, verification and login, independent of the web framework.
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    mailer: DynMailer,
    policy: PasswordPolicy,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, mailer: DynMailer, cfg: AuthConfig) -> Self {
        Self { repo, mailer, policy: PasswordPolicy::default(), cfg }
    }

    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register a new unverified account and mail its verification token.
    ///
    /// Nothing is written unless every field, uniqueness and password rule
    /// passes. A mail failure after the account is stored is returned as
    /// [`AuthError::Mail`]; the account is kept.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::SignUpInput;
    /// use service::mail::mock::RecordingMailer;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let mailer = Arc::new(RecordingMailer::default());
    /// let svc = AuthService::new(repo.clone(), mailer.clone(), AuthConfig::new("secret"));
    /// let input = SignUpInput {
    ///     email: "maria@example.com".into(),
    ///     username: "maria".into(),
    ///     phone_number: "+5215512345678".into(),
    ///     password: "carpool-2024!".into(),
    ///     password_confirmation: "carpool-2024!".into(),
    ///     first_name: "Maria".into(),
    ///     last_name: "Lopez".into(),
    /// };
    /// let user = tokio_test::block_on(svc.sign_up(input)).unwrap();
    /// assert!(!user.is_verified);
    /// assert_eq!(mailer.sent_count(), 1);
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username, email = %input.email))]
    pub async fn sign_up(&self, input: SignUpInput) -> Result<AuthUser, AuthError> {
        let input = input.trimmed();
        let mut errors = validate_fields(&input);
        errors.merge(self.uniqueness_errors(&input).await?);
        errors.into_result()?;

        if input.password != input.password_confirmation {
            return Err(AuthError::PasswordMismatch);
        }
        let attributes = [
            ("username", input.username.as_str()),
            ("email", input.email.as_str()),
            ("first_name", input.first_name.as_str()),
            ("last_name", input.last_name.as_str()),
        ];
        let problems = self.policy.check(&input.password, &attributes);
        if !problems.is_empty() {
            return Err(AuthError::WeakPassword(problems));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self
            .repo
            .create_account(NewUser::from(&input), hash, self.cfg.password_algorithm.clone())
            .await?;
        info!(user_id = %user.id, username = %user.username, "user_registered");

        self.send_verification_email(&user).await?;
        Ok(user)
    }

    async fn uniqueness_errors(&self, input: &SignUpInput) -> Result<FieldErrors, AuthError> {
        let mut errors = FieldErrors::new();
        if !input.email.is_empty() && self.repo.find_user_by_email(&input.email).await?.is_some() {
            debug!("email already registered");
            errors.add("email", UNIQUE_MESSAGE);
        }
        if !input.username.is_empty() && self.repo.find_user_by_username(&input.username).await?.is_some() {
            debug!("username already taken");
            errors.add("username", UNIQUE_MESSAGE);
        }
        Ok(errors)
    }

    async fn send_verification_email(&self, user: &AuthUser) -> Result<(), AuthError> {
        let token = issue_verification_token(&user.username, &self.cfg.secret_key, self.cfg.verification_ttl)?;
        let template = AccountVerificationEmail {
            username: &user.username,
            first_name: &user.first_name,
            token: &token,
            valid_days: self.cfg.verification_ttl.num_days(),
        };
        let message = EmailMessage {
            to: user.email.clone(),
            subject: template.subject(),
            html_body: template.render_html()?,
        };
        self.mailer.send(&message).await?;
        info!(user_id = %user.id, "verification_email_sent");
        Ok(())
    }

    /// Confirm the account named by a mailed verification token.
    ///
    /// Verifying an already verified account succeeds again.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::VerifyInput;
    /// use service::mail::mock::RecordingMailer;
    /// use std::sync::Arc;
    /// let svc = AuthService::new(
    ///     Arc::new(MockAuthRepository::default()),
    ///     Arc::new(RecordingMailer::default()),
    ///     AuthConfig::new("secret"),
    /// );
    /// let err = tokio_test::block_on(svc.verify_account(VerifyInput { token: "bogus".into() })).unwrap_err();
    /// assert_eq!(err.code(), 1006);
    /// ```
    #[instrument(skip(self, input))]
    pub async fn verify_account(&self, input: VerifyInput) -> Result<AuthUser, AuthError> {
        let claims = decode_verification_token(input.token.trim(), &self.cfg.secret_key)?;
        let user = self
            .repo
            .find_user_by_username(&claims.user)
            .await?
            .ok_or_else(|| AuthError::InvalidToken("Invalid token".into()))?;
        let user = self.repo.mark_verified(user.id).await?;
        info!(user_id = %user.id, username = %user.username, "account_verified");
        Ok(user)
    }

    /// Authenticate a verified user and return their access token, creating it
    /// on first login.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::LoginInput;
    /// use service::mail::mock::RecordingMailer;
    /// use std::sync::Arc;
    /// let svc = AuthService::new(
    ///     Arc::new(MockAuthRepository::default()),
    ///     Arc::new(RecordingMailer::default()),
    ///     AuthConfig::new("secret"),
    /// );
    /// let input = LoginInput { email: "nobody@example.com".into(), password: "whatever-123".into() };
    /// let err = tokio_test::block_on(svc.login(input)).unwrap_err();
    /// assert_eq!(err.to_string(), "invalid credentials");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<LoginSession, AuthError> {
        let input = input.trimmed();
        validate_fields(&input).into_result()?;

        let user = self
            .repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let cred = self
            .repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_verified {
            return Err(AuthError::AccountNotActive);
        }

        let token = self
            .repo
            .get_or_create_access_token(user.id, &generate_access_key())
            .await?;
        info!(user_id = %user.id, token_created = token.created, "login_succeeded");
        Ok(LoginSession { user, access_token: token.key })
    }
}
