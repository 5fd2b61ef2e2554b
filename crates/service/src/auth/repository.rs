use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AccessToken, AuthUser, Credentials, NewUser};
use super::errors::AuthError;

/// Repository abstraction for account persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError>;

    /// Insert the user, its credentials and its profile atomically.
    ///
    /// A unique-index violation surfaces as [`AuthError::Invalid`] keyed by the
    /// offending field.
    async fn create_account(
        &self,
        user: NewUser,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn mark_verified(&self, user_id: Uuid) -> Result<AuthUser, AuthError>;

    /// Return the user's access token, storing `candidate_key` if none exists.
    async fn get_or_create_access_token(&self, user_id: Uuid, candidate_key: &str) -> Result<AccessToken, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard};

    use crate::auth::errors::FieldErrors;
    use crate::auth::validation::UNIQUE_MESSAGE;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<Uuid, AuthUser>>,
        creds: Mutex<HashMap<Uuid, Credentials>>,
        profiles: Mutex<Vec<Uuid>>,
        tokens: Mutex<HashMap<Uuid, String>>, // key: user_id
    }

    fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, AuthError> {
        m.lock().map_err(|_| AuthError::Repository("mock store poisoned".into()))
    }

    impl MockAuthRepository {
        pub fn user_count(&self) -> usize {
            self.users.lock().map(|u| u.len()).unwrap_or(0)
        }

        pub fn profile_count(&self) -> usize {
            self.profiles.lock().map(|p| p.len()).unwrap_or(0)
        }

        pub fn token_count(&self) -> usize {
            self.tokens.lock().map(|t| t.len()).unwrap_or(0)
        }

        pub fn user_by_username(&self, username: &str) -> Option<AuthUser> {
            let users = self.users.lock().ok()?;
            users.values().find(|u| u.username == username).cloned()
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = lock(&self.users)?;
            Ok(users.values().find(|u| u.email == email).cloned())
        }

        async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = lock(&self.users)?;
            Ok(users.values().find(|u| u.username == username).cloned())
        }

        async fn create_account(
            &self,
            user: NewUser,
            password_hash: String,
            password_algorithm: String,
        ) -> Result<AuthUser, AuthError> {
            let mut users = lock(&self.users)?;
            let mut errors = FieldErrors::new();
            if users.values().any(|u| u.email == user.email) {
                errors.add("email", UNIQUE_MESSAGE);
            }
            if users.values().any(|u| u.username == user.username) {
                errors.add("username", UNIQUE_MESSAGE);
            }
            errors.into_result()?;

            let created = AuthUser {
                id: Uuid::new_v4(),
                username: user.username,
                email: user.email,
                phone_number: user.phone_number,
                first_name: user.first_name,
                last_name: user.last_name,
                is_verified: false,
            };
            lock(&self.creds)?.insert(
                created.id,
                Credentials { user_id: created.id, password_hash, password_algorithm },
            );
            lock(&self.profiles)?.push(created.id);
            users.insert(created.id, created.clone());
            Ok(created)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = lock(&self.creds)?;
            Ok(creds.get(&user_id).cloned())
        }

        async fn mark_verified(&self, user_id: Uuid) -> Result<AuthUser, AuthError> {
            let mut users = lock(&self.users)?;
            let user = users
                .get_mut(&user_id)
                .ok_or_else(|| AuthError::Repository(format!("user {} not found", user_id)))?;
            user.is_verified = true;
            Ok(user.clone())
        }

        async fn get_or_create_access_token(&self, user_id: Uuid, candidate_key: &str) -> Result<AccessToken, AuthError> {
            let mut tokens = lock(&self.tokens)?;
            if let Some(key) = tokens.get(&user_id) {
                return Ok(AccessToken { key: key.clone(), user_id, created: false });
            }
            tokens.insert(user_id, candidate_key.to_string());
            Ok(AccessToken { key: candidate_key.to_string(), user_id, created: true })
        }
    }
}
