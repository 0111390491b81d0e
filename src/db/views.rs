use sqlx::PgPool;
use uuid::Uuid;

/// Record a view once per (user, video). Repeat calls are no-ops; the
/// uniqueness constraint absorbs concurrent first views.
pub async fn record(
    pool: &PgPool,
    user_id: Uuid,
    generation_id: Uuid,
    ip: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO views (user_id, generation_id, ip) VALUES ($1, $2, $3)
         ON CONFLICT (user_id, generation_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(generation_id)
    .bind(ip)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn count(pool: &PgPool, generation_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM views WHERE generation_id = $1")
        .bind(generation_id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
