use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{Claims, encode_token};
use crate::auth::password;
use crate::db;
use crate::error::AppError;
use crate::models::User;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct RequestResetRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct VerifyResetRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub detail: String,
}

fn generate_refresh_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 6-digit numeric one-time code.
fn generate_otp() -> String {
    format!("{:06}", rand::random_range(0..1_000_000u32))
}

async fn issue_tokens(state: &SharedState, user: &User) -> Result<(String, String), AppError> {
    let claims = Claims::new(user.id);
    let access_token =
        encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    let refresh = generate_refresh_token();
    let refresh_hash = hash_token(&refresh);
    db::refresh_tokens::create(
        &state.pool,
        user.id,
        &refresh_hash,
        Utc::now() + Duration::days(7),
    )
    .await?;

    Ok((access_token, refresh))
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let mut errors = Vec::new();
    if req.username.is_empty() {
        errors.push(("username".to_string(), "This field is required".to_string()));
    }
    if req.email.is_empty() || !req.email.contains('@') {
        errors.push(("email".to_string(), "A valid email is required".to_string()));
    }
    if req.password.len() < 8 {
        errors.push((
            "password".to_string(),
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    let user = db::users::create(
        &state.pool,
        &req.username,
        &req.email,
        &pw_hash,
        &req.first_name,
        &req.last_name,
    )
    .await
    .map_err(|e| {
        if e.as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation())
        {
            AppError::BadRequest("Username or email already taken".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    let (access_token, refresh_token) = issue_tokens(&state, &user).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user,
            access_token,
            refresh_token,
        }),
    ))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if state.login_limiter.check(&req.username_or_email).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let user = db::users::find_by_username_or_email(&state.pool, &req.username_or_email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password::verify(&req.password, &user.password_hash).map_err(AppError::Internal)?;

    if !valid {
        state.login_limiter.record_failure(&req.username_or_email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let (access_token, refresh_token) = issue_tokens(&state, &user).await?;

    Ok(Json(AuthResponse {
        user,
        access_token,
        refresh_token,
    }))
}

pub async fn refresh(
    State(state): State<SharedState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let token_hash = hash_token(&req.refresh_token);

    let stored = db::refresh_tokens::find_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    if stored.used {
        tracing::warn!(
            "Refresh token reuse detected for user {}. Revoking all sessions.",
            stored.user_id
        );
        db::refresh_tokens::delete_all_for_user(&state.pool, stored.user_id).await?;
        return Err(AppError::Unauthorized(
            "Refresh token reuse detected. All sessions revoked.".to_string(),
        ));
    }

    if stored.expires_at < Utc::now() {
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    db::refresh_tokens::mark_used(&state.pool, stored.id).await?;

    let user = db::users::find_by_id(&state.pool, stored.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    let (access_token, refresh_token) = issue_tokens(&state, &user).await?;

    Ok(Json(AuthResponse {
        user,
        access_token,
        refresh_token,
    }))
}

pub async fn logout(
    State(state): State<SharedState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let token_hash = hash_token(&req.refresh_token);
    db::refresh_tokens::delete_by_hash(&state.pool, &token_hash).await?;

    Ok(Json(MessageResponse {
        detail: "Logged out successfully".to_string(),
    }))
}

pub async fn me(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<User>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    Ok(Json(user))
}

pub async fn request_password_reset(
    State(state): State<SharedState>,
    Json(req): Json<RequestResetRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    // Always 200: existence of the email must not be revealed.
    let response = Json(MessageResponse {
        detail: "If that email is registered, a verification code has been sent.".to_string(),
    });

    let pool = state.pool.clone();
    let mailer = state.mailer.clone();

    tokio::spawn(async move {
        if let Ok(Some(user)) = db::users::find_by_email(&pool, &req.email).await {
            let code = generate_otp();

            match db::password_reset_codes::create(
                &pool,
                &user.email,
                &code,
                Utc::now() + Duration::minutes(10),
            )
            .await
            {
                Ok(_) => {
                    if let Some(mailer) = mailer {
                        if let Err(e) = mailer.send_password_reset_code(&user.email, &code).await {
                            tracing::error!("Failed to send password reset email: {e}");
                        }
                    } else {
                        tracing::warn!("SMTP not configured. Password reset code: {code}");
                    }
                }
                Err(e) => tracing::error!("Failed to store password reset code: {e}"),
            }
        }
    });

    Ok(response)
}

pub async fn verify_password_reset(
    State(state): State<SharedState>,
    Json(req): Json<VerifyResetRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if req.new_password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let pw_hash = password::hash(&req.new_password).map_err(AppError::Internal)?;

    // One transaction: the code is consumed if and only if the password
    // actually changes. A failure anywhere rolls back and leaves the code
    // usable for a retry.
    let mut tx = state.pool.begin().await?;

    let code = db::password_reset_codes::consume(&mut *tx, &req.email, &req.code)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest("Invalid or expired verification code".to_string())
        })?;

    let user = db::users::find_by_email(&state.pool, &code.email)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest("Invalid or expired verification code".to_string())
        })?;

    db::users::update_password(&mut *tx, user.id, &pw_hash).await?;

    // Changing the password invalidates every session.
    db::refresh_tokens::delete_all_for_user(&mut *tx, user.id).await?;

    tx.commit().await?;

    Ok(Json(MessageResponse {
        detail: "Password reset successfully".to_string(),
    }))
}
