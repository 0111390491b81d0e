use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Path, Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct FeedParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Serialize)]
pub struct LikeResponse {
    pub is_liked: bool,
    pub likes_count: i64,
}

#[derive(Serialize)]
pub struct ViewResponse {
    pub views_count: i64,
}

pub async fn feed(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<FeedParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(12).clamp(1, 50);
    let offset = (page - 1) * page_size;

    let videos = db::generations::feed(&state.pool, auth.user_id, page_size, offset).await?;
    let total = db::generations::count_feed(&state.pool).await?;

    Ok(Json(serde_json::json!({
        "videos": videos,
        "total": total,
        "page": page,
        "page_size": page_size,
        "total_pages": (total as f64 / page_size as f64).ceil() as i64,
    })))
}

pub async fn like(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeResponse>, AppError> {
    // A private video is indistinguishable from a missing one.
    let generation = db::generations::find_public_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

    let is_liked = db::likes::toggle(&state.pool, auth.user_id, generation.id).await?;
    let likes_count = db::likes::count(&state.pool, generation.id).await?;

    Ok(Json(LikeResponse {
        is_liked,
        likes_count,
    }))
}

pub async fn view(
    auth: AuthUser,
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(id): Path<Uuid>,
) -> Result<Json<ViewResponse>, AppError> {
    let generation = db::generations::find_public_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

    let ip = addr.ip().to_string();
    db::views::record(&state.pool, auth.user_id, generation.id, Some(&ip)).await?;
    let views_count = db::views::count(&state.pool, generation.id).await?;

    Ok(Json(ViewResponse { views_count }))
}
