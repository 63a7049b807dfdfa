use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use thiserror::Error;

pub type DbPool = Pool<Sqlite>;

/// Slot key for the merchant → category mapping dictionary.
pub const MAPPINGS_SLOT: &str = "merchant_mappings";
/// Slot key for the full record collection.
pub const RECORDS_SLOT: &str = "records";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("Corrupt slot payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Open (creating if needed) the slot database. Single connection — the
/// orchestration layer is the only writer.
pub async fn create_db(path: &Path) -> Result<DbPool, StorageError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS slots (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn read_slot_raw(pool: &DbPool, key: &str) -> Result<Option<String>, StorageError> {
    let row = sqlx::query_as::<_, (String,)>("SELECT value FROM slots WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(value,)| value))
}

pub async fn write_slot_raw(pool: &DbPool, key: &str, value: &str) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO slots (key, value) VALUES (?, ?) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

/// Read a slot and deserialize it. `None` when the slot was never written.
pub async fn read_slot<T: DeserializeOwned>(
    pool: &DbPool,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match read_slot_raw(pool, key).await? {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

/// Serialize a value into a slot, replacing any previous payload.
pub async fn write_slot<T: Serialize>(
    pool: &DbPool,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    write_slot_raw(pool, key, &serde_json::to_string(value)?).await
}
