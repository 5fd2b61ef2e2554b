use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub is_verified: bool,
    pub is_client: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match *self {}
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Column values for a new account; ids, flags and timestamps are filled in by [`create`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
}

/// Insert an unverified client account.
pub async fn create<C: ConnectionTrait>(db: &C, draft: UserDraft) -> Result<Model, ModelError> {
    if !draft.email.contains('@') { return Err(ModelError::Validation("invalid email".into())); }
    if draft.username.trim().is_empty() { return Err(ModelError::Validation("username required".into())); }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(draft.username),
        email: Set(draft.email),
        phone_number: Set(draft.phone_number),
        first_name: Set(draft.first_name),
        last_name: Set(draft.last_name),
        is_verified: Set(false),
        is_client: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

pub async fn find_by_username<C: ConnectionTrait>(db: &C, username: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Username.eq(username)).one(db).await?)
}

/// Flip `is_verified` on. Verifying an already verified user is a no-op update.
pub async fn mark_verified<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Model, ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ModelError::Validation("user not found".into()))?
        .into();
    found.is_verified = Set(true);
    found.updated_at = Set(Utc::now().into());
    Ok(found.update(db).await?)
}
