use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::{Profile, User};
use crate::state::SharedState;
use crate::storage::MediaStore;
use crate::upload;

/// Profile fields merged with the owning account. `created_at` is the
/// account's join date, not the profile row's.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProfileResponse {
    fn new(user: User, profile: Profile) -> Self {
        let created_at = user.created_at;
        Self {
            user,
            bio: profile.bio,
            location: profile.location,
            website: profile.website,
            avatar_url: profile.avatar_url,
            created_at,
        }
    }
}

pub async fn get_profile(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    let profile = db::profiles::get_or_create(&state.pool, auth.user_id).await?;

    Ok(Json(ProfileResponse::new(user, profile)))
}

/// Multipart form: `bio`, `location`, `website`, optional `avatar` file.
/// Omitted text fields keep their stored values.
pub async fn update_profile(
    State(state): State<SharedState>,
    auth: AuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    let existing = db::profiles::get_or_create(&state.pool, auth.user_id).await?;

    let form = upload::parse_multipart(&headers, body)
        .await
        .map_err(AppError::BadRequest)?;

    let bio = form.text("bio").unwrap_or(&existing.bio).to_string();
    let location = form.text("location").unwrap_or(&existing.location).to_string();
    let website = form.text("website").unwrap_or(&existing.website).to_string();

    let avatar_url = match form.file("avatar") {
        Some(f) => {
            let store = state.storage.as_ref().ok_or_else(|| {
                AppError::Storage("Object storage not configured".to_string())
            })?;
            let key = MediaStore::generate_key("avatars", &f.filename);
            Some(
                store
                    .upload_bytes(f.data.clone(), &key, &f.content_type)
                    .await?,
            )
        }
        None => None,
    };

    let profile = db::profiles::update(
        &state.pool,
        auth.user_id,
        &bio,
        &location,
        &website,
        avatar_url.as_deref(),
    )
    .await?;

    Ok(Json(ProfileResponse::new(user, profile)))
}
