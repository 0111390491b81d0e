use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Profile;

/// Fetch the user's profile, creating an empty one on first access. The
/// no-op conflict update makes the insert return the existing row, so
/// concurrent first accesses both get the same profile.
pub async fn get_or_create(pool: &PgPool, user_id: Uuid) -> Result<Profile, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        "INSERT INTO profiles (user_id) VALUES ($1)
         ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
         RETURNING *",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

/// A `None` avatar keeps the stored one; clearing an avatar is not a thing
/// the profile form does.
pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    bio: &str,
    location: &str,
    website: &str,
    avatar_url: Option<&str>,
) -> Result<Profile, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        "UPDATE profiles
         SET bio = $2, location = $3, website = $4,
             avatar_url = COALESCE($5, avatar_url), modified_at = now()
         WHERE user_id = $1 RETURNING *",
    )
    .bind(user_id)
    .bind(bio)
    .bind(location)
    .bind(website)
    .bind(avatar_url)
    .fetch_one(pool)
    .await
}
