//! User rows
//!
//! Session issuance lives in the fronting auth layer; this service only
//! records the ids it has seen so user-scoped rows always reference a
//! known user.

use sqlx::SqlitePool;
use uuid::Uuid;

/// Idempotently record an authenticated user id
pub async fn ensure_user(pool: &SqlitePool, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO users (guid) VALUES (?)")
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}
