pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod providers;
pub mod rate_limit;
pub mod reconcile;
pub mod routes;
pub mod state;
pub mod storage;
pub mod upload;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use sqlx::PgPool;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::email::OtpMailer;
use crate::providers::ProviderRegistry;
use crate::providers::did::DidProvider;
use crate::providers::heygen::HeyGenProvider;
use crate::rate_limit::LoginRateLimiter;
use crate::state::{AppState, SharedState};
use crate::storage::MediaStore;

pub fn build_app(pool: PgPool, config: Config) -> Router {
    // One connection-pooled client shared by providers and storage transfers.
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to build reqwest client");

    let mut providers = ProviderRegistry::new();
    if let Some(did) = &config.did {
        providers.register(Arc::new(DidProvider::new(http.clone(), did)));
        tracing::info!("D-ID provider configured");
    }
    if let Some(heygen) = &config.heygen {
        providers.register(Arc::new(HeyGenProvider::new(http.clone(), heygen)));
        tracing::info!("HeyGen provider configured");
    }

    let storage = config.storage.as_ref().map(|cfg| {
        tracing::info!("Object storage configured for bucket {}", cfg.bucket);
        MediaStore::new(cfg, http.clone())
    });

    let mailer = config.smtp.as_ref().and_then(|smtp| match OtpMailer::new(smtp) {
        Ok(mailer) => {
            tracing::info!("SMTP configured");
            Some(Arc::new(mailer))
        }
        Err(e) => {
            tracing::warn!("SMTP not available: {e}");
            None
        }
    });

    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        providers,
        storage,
        mailer,
        login_limiter: LoginRateLimiter::new(),
    });

    // Expired lockout windows are dead weight; sweep them periodically so the
    // limiter map stays bounded by active identifiers.
    let limiter_state = state.clone();
    tokio::spawn(async move {
        let period = std::time::Duration::from_secs(15 * 60);
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            limiter_state.login_limiter.cleanup(period);
        }
    });

    Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
