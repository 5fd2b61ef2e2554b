use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use models::errors::ModelError;

use crate::auth::domain::{AccessToken, AuthUser, Credentials, NewUser};
use crate::auth::errors::{AuthError, FieldErrors};
use crate::auth::repository::AuthRepository;
use crate::auth::validation::UNIQUE_MESSAGE;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_auth_user(u: models::user::Model) -> AuthUser {
    AuthUser {
        id: u.id,
        username: u.username,
        email: u.email,
        phone_number: u.phone_number,
        first_name: u.first_name,
        last_name: u.last_name,
        is_verified: u.is_verified,
    }
}

/// Unique violations name the index (`uniq_user_email`, `uniq_user_username`);
/// report them as the field-level uniqueness error.
fn map_model_error(e: ModelError) -> AuthError {
    match e {
        ModelError::Conflict(msg) => {
            let mut errors = FieldErrors::new();
            if msg.contains("email") {
                errors.add("email", UNIQUE_MESSAGE);
            }
            if msg.contains("username") {
                errors.add("username", UNIQUE_MESSAGE);
            }
            if errors.is_empty() {
                AuthError::Repository(format!("unique constraint violated: {}", msg))
            } else {
                AuthError::Invalid(errors)
            }
        }
        other => AuthError::Repository(other.to_string()),
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_email(&self.db, email).await.map_err(map_model_error)?;
        Ok(res.map(to_auth_user))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_username(&self.db, username).await.map_err(map_model_error)?;
        Ok(res.map(to_auth_user))
    }

    async fn create_account(
        &self,
        user: NewUser,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError> {
        let txn = self.db.begin().await.map_err(|e| AuthError::Repository(e.to_string()))?;
        let draft = models::user::UserDraft {
            username: user.username,
            email: user.email,
            phone_number: user.phone_number,
            first_name: user.first_name,
            last_name: user.last_name,
        };
        // Dropping `txn` on an early return rolls everything back.
        let created = models::user::create(&txn, draft).await.map_err(map_model_error)?;
        models::user_credentials::upsert_password(&txn, created.id, password_hash, &password_algorithm)
            .await
            .map_err(map_model_error)?;
        models::profile::create_for_user(&txn, created.id).await.map_err(map_model_error)?;
        txn.commit().await.map_err(|e| map_model_error(e.into()))?;
        Ok(to_auth_user(created))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = models::user_credentials::find_by_user(&self.db, user_id)
            .await
            .map_err(map_model_error)?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }

    async fn mark_verified(&self, user_id: Uuid) -> Result<AuthUser, AuthError> {
        let updated = models::user::mark_verified(&self.db, user_id).await.map_err(map_model_error)?;
        Ok(to_auth_user(updated))
    }

    async fn get_or_create_access_token(&self, user_id: Uuid, candidate_key: &str) -> Result<AccessToken, AuthError> {
        let (token, created) = models::access_token::get_or_create(&self.db, user_id, candidate_key)
            .await
            .map_err(map_model_error)?;
        Ok(AccessToken { key: token.key, user_id: token.user_id, created })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_index_violation_maps_to_field() {
        let err = map_model_error(ModelError::Conflict(
            "duplicate key value violates unique constraint \"uniq_user_email\"".into(),
        ));
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.get("email").unwrap(), [UNIQUE_MESSAGE.to_string()]);
        assert!(!errors.contains("username"));
    }

    #[test]
    fn unknown_index_violation_is_internal() {
        let err = map_model_error(ModelError::Conflict("uniq_something_else".into()));
        assert!(matches!(err, AuthError::Repository(_)));
    }

    #[test]
    fn db_errors_are_internal() {
        let err = map_model_error(ModelError::Db("connection reset".into()));
        assert!(!err.is_client_error());
    }
}
