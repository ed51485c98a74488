//! Per-(user, track) feedback
//!
//! Upsert semantics: last write wins.

use sqlx::SqlitePool;
use uuid::Uuid;

pub async fn upsert_feedback(
    pool: &SqlitePool,
    user_id: Uuid,
    track_id: &str,
    score: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO feedback (user_id, track_id, score, updated_at)
        VALUES (?, ?, ?, datetime('now'))
        ON CONFLICT(user_id, track_id) DO UPDATE SET
            score = excluded.score,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(user_id.to_string())
    .bind(track_id)
    .bind(score)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_write_overwrites_score() {
        let dir = tempfile::tempdir().unwrap();
        let pool = moodstream_common::db::init_database(&dir.path().join("test.db"))
            .await
            .unwrap();
        let user_id = Uuid::new_v4();

        upsert_feedback(&pool, user_id, "track-1", 1).await.unwrap();
        upsert_feedback(&pool, user_id, "track-1", -1).await.unwrap();

        let (count, score): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), MAX(score) FROM feedback WHERE user_id = ? AND track_id = 'track-1'",
        )
        .bind(user_id.to_string())
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(count, 1);
        assert_eq!(score, -1);
    }
}
