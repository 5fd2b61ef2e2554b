//! Create `user` table.
//!
//! Stores rider accounts. Email and username uniqueness is enforced by the
//! named indexes created in the index migration.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Username, 20).not_null())
                    .col(string_len(User::Email, 254).not_null())
                    .col(string_len(User::PhoneNumber, 17).not_null())
                    .col(string_len(User::FirstName, 30).not_null())
                    .col(string_len(User::LastName, 30).not_null())
                    .col(boolean(User::IsVerified).default(false))
                    .col(boolean(User::IsClient).default(true))
                    .col(timestamp_with_time_zone(User::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(User::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    Username,
    Email,
    PhoneNumber,
    FirstName,
    LastName,
    IsVerified,
    IsClient,
    CreatedAt,
    UpdatedAt,
}
