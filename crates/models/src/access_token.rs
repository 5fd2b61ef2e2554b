use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "access_token")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub user_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find_by_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::UserId.eq(user_id)).one(db).await?)
}

/// Return the user's token, inserting `candidate_key` if there is none yet.
///
/// The insert is `ON CONFLICT (user_id) DO NOTHING` followed by a re-read, so
/// concurrent callers for the same user all end up with the single stored row.
/// The boolean is true when this call created it.
pub async fn get_or_create<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    candidate_key: &str,
) -> Result<(Model, bool), ModelError> {
    if let Some(existing) = find_by_user(db, user_id).await? {
        return Ok((existing, false));
    }
    if candidate_key.len() != 40 {
        return Err(ModelError::Validation("access token key must be 40 characters".into()));
    }
    let am = ActiveModel {
        key: Set(candidate_key.to_string()),
        user_id: Set(user_id),
        created_at: Set(Utc::now().into()),
    };
    let inserted = match Entity::insert(am)
        .on_conflict(OnConflict::column(Column::UserId).do_nothing().to_owned())
        .exec_without_returning(db)
        .await
    {
        Ok(rows) => rows,
        Err(DbErr::RecordNotInserted) => 0,
        Err(e) => return Err(e.into()),
    };
    let stored = find_by_user(db, user_id)
        .await?
        .ok_or_else(|| ModelError::Db("access token missing after insert".into()))?;
    Ok((stored, inserted > 0))
}
