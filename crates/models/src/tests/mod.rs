
use anyhow::Result;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

/// Connect and migrate, or `None` when no database is configured for this run.
pub async fn setup_test_db() -> Result<Option<DatabaseConnection>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL missing; skip database tests");
        return Ok(None);
    }
    let db = crate::db::connect().await?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        // Parallel test binaries may race on the migration table
        eprintln!("migrations notice: {}", e);
    }
    Ok(Some(db))
}
