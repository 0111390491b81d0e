use sqlx::PgPool;
use uuid::Uuid;

/// Toggle a like. Returns the resulting liked-state.
///
/// Delete-first keeps concurrent toggles safe: if two requests race past the
/// delete, the uniqueness constraint lets exactly one insert land and the
/// loser observes "already exists" — one row either way.
pub async fn toggle(
    pool: &PgPool,
    user_id: Uuid,
    generation_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let deleted = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND generation_id = $2")
        .bind(user_id)
        .bind(generation_id)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted > 0 {
        return Ok(false);
    }

    sqlx::query(
        "INSERT INTO likes (user_id, generation_id) VALUES ($1, $2)
         ON CONFLICT (user_id, generation_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(generation_id)
    .execute(pool)
    .await?;

    Ok(true)
}

pub async fn count(pool: &PgPool, generation_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM likes WHERE generation_id = $1")
        .bind(generation_id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
