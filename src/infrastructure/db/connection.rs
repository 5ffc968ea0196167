use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::time::Duration;

use crate::domain::error::{AppError, Result};

const SCHEMA: &str = include_str!("../../../resources/schema.sql");

// Bumped whenever schema.sql changes incompatibly. PRAGMA user_version
// tracks what the database file was written with.
const SCHEMA_VERSION: i32 = 1;

/// Opens (creating if missing) the dataset database and applies the schema.
pub async fn init_db(db_path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to open database: {e}")))?;

    prepare_pool(&pool).await?;
    Ok(pool)
}

/// In-memory database for tests and throwaway runs. Single connection so
/// every query sees the same memory store.
pub async fn init_memory_db() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(":memory:")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to open memory database: {e}")))?;

    prepare_pool(&pool).await?;
    Ok(pool)
}

async fn prepare_pool(pool: &SqlitePool) -> Result<()> {
    // Fail fast when the file was written by a newer build.
    let current = read_user_version(pool).await?;
    if current > SCHEMA_VERSION {
        return Err(AppError::DatabaseError(format!(
            "Database schema too new: user_version={} > supported_version={}",
            current, SCHEMA_VERSION
        )));
    }

    apply_schema(pool).await?;
    set_user_version(pool, SCHEMA_VERSION).await?;

    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Database health check failed: {e}")))?;

    Ok(())
}

async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    for stmt in SCHEMA.split(';') {
        let sql = stmt.trim();
        if sql.is_empty() || sql.starts_with("--") && !sql.contains('\n') {
            continue;
        }
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to apply schema statement: {e}")))?;
    }
    Ok(())
}

async fn read_user_version(pool: &SqlitePool) -> Result<i32> {
    sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to read user_version: {e}")))
}

async fn set_user_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query(&format!("PRAGMA user_version = {version}"))
        .execute(pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to set user_version: {e}")))?;
    Ok(())
}
