use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{FeedVideo, Generation, GenerationStatus, ProviderKind};

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    provider: ProviderKind,
    provider_job_id: &str,
    source_url: &str,
    script_input: &str,
    config: serde_json::Value,
) -> Result<Generation, sqlx::Error> {
    sqlx::query_as::<_, Generation>(
        "INSERT INTO generations (user_id, name, provider, provider_job_id, source_url, script_input, config)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(user_id)
    .bind(name)
    .bind(provider)
    .bind(provider_job_id)
    .bind(source_url)
    .bind(script_input)
    .bind(config)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id_for_user(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Generation>, sqlx::Error> {
    sqlx::query_as::<_, Generation>("SELECT * FROM generations WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Only public videos are reachable through the social surface; a private id
/// behaves exactly like a missing one.
pub async fn find_public_by_id(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<Generation>, sqlx::Error> {
    sqlx::query_as::<_, Generation>("SELECT * FROM generations WHERE id = $1 AND is_public")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Generation>, sqlx::Error> {
    sqlx::query_as::<_, Generation>(
        "SELECT * FROM generations WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn update_reconciled(
    pool: &PgPool,
    id: Uuid,
    status: GenerationStatus,
    result_url: Option<&str>,
    audio_url: Option<&str>,
    metadata: Option<serde_json::Value>,
) -> Result<Generation, sqlx::Error> {
    sqlx::query_as::<_, Generation>(
        "UPDATE generations
         SET status = $2, result_url = $3, audio_url = $4, metadata = $5, modified_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .bind(result_url)
    .bind(audio_url)
    .bind(metadata)
    .fetch_one(pool)
    .await
}

pub async fn toggle_public(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Generation>, sqlx::Error> {
    sqlx::query_as::<_, Generation>(
        "UPDATE generations SET is_public = NOT is_public, modified_at = now()
         WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Public feed: completed public videos with computed social counters,
/// newest first.
pub async fn feed(
    pool: &PgPool,
    viewer_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<FeedVideo>, sqlx::Error> {
    sqlx::query_as::<_, FeedVideo>(
        "SELECT g.*,
                (SELECT COUNT(*) FROM likes l WHERE l.generation_id = g.id) AS likes_count,
                (SELECT COUNT(*) FROM views v WHERE v.generation_id = g.id) AS views_count,
                EXISTS(SELECT 1 FROM likes l WHERE l.generation_id = g.id AND l.user_id = $1) AS is_liked
         FROM generations g
         WHERE g.is_public AND g.status = 'done'
         ORDER BY g.created_at DESC
         LIMIT $2 OFFSET $3",
    )
    .bind(viewer_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_feed(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM generations WHERE is_public AND status = 'done'")
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}
