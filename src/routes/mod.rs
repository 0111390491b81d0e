pub mod auth;
pub mod profile;
pub mod social;
pub mod videos;

use axum::Router;
use axum::routing::{get, post};

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::me))
        .route(
            "/api/v1/auth/password-reset/request",
            post(auth::request_password_reset),
        )
        .route(
            "/api/v1/auth/password-reset/verify",
            post(auth::verify_password_reset),
        )
        // Profile
        .route(
            "/api/v1/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        // Videos
        .route("/api/v1/videos", get(videos::list))
        .route("/api/v1/videos/create", post(videos::create))
        .route("/api/v1/videos/{id}", get(videos::get))
        .route("/api/v1/videos/{id}/update", post(videos::update_status))
        .route("/api/v1/videos/{id}/publish", post(videos::toggle_publish))
        .route("/api/v1/heygen/create", post(videos::create_heygen))
        // Social feed
        .route("/api/v1/social/videos", get(social::feed))
        .route("/api/v1/social/videos/{id}/like", post(social::like))
        .route("/api/v1/social/videos/{id}/view", post(social::view))
}
