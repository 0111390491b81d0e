use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::{Generation, ProviderKind};
use crate::providers::SubmitRequest;
use crate::reconcile;
use crate::state::SharedState;
use crate::storage::MediaStore;
use crate::upload;

#[derive(Deserialize, Default)]
#[serde(default)]
struct CreateVideoRequest {
    name: String,
    script_input: String,
    source_url: Option<String>,
    voice_id: Option<String>,
}

struct CreateInput {
    name: String,
    script_input: String,
    voice_id: Option<String>,
    source_url: Option<String>,
    image: Option<(String, String, Vec<u8>)>,
}

async fn parse_create_input(headers: &HeaderMap, body: Bytes) -> Result<CreateInput, AppError> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json");

    if content_type.contains("multipart/form-data") {
        let form = upload::parse_multipart(headers, body)
            .await
            .map_err(AppError::BadRequest)?;

        Ok(CreateInput {
            name: form.text("name").unwrap_or_default().to_string(),
            script_input: form.text("script_input").unwrap_or_default().to_string(),
            voice_id: form.text("voice_id").map(|s| s.to_string()),
            source_url: form.text("source_url").map(|s| s.to_string()),
            image: form.file("image_file").map(|f| {
                (f.filename.clone(), f.content_type.clone(), f.data.clone())
            }),
        })
    } else {
        let req: CreateVideoRequest = serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON: {e}")))?;
        Ok(CreateInput {
            name: req.name,
            script_input: req.script_input,
            voice_id: req.voice_id,
            source_url: req.source_url,
            image: None,
        })
    }
}

fn validate_create_input(input: &CreateInput) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if input.name.is_empty() {
        errors.push(("name".to_string(), "This field is required".to_string()));
    }
    if input.script_input.is_empty() {
        errors.push((
            "script_input".to_string(),
            "This field is required".to_string(),
        ));
    }
    if input.source_url.is_none() && input.image.is_none() {
        errors.push((
            "image_file".to_string(),
            "An image file or source_url is required".to_string(),
        ));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Resolve the job's source media to an owned-storage URL: uploaded files go
/// into the bucket; pre-hosted URLs are taken as-is.
async fn resolve_source_url(
    state: &SharedState,
    folder: &str,
    source_url: Option<String>,
    file: Option<(String, String, Vec<u8>)>,
) -> Result<String, AppError> {
    if let Some(url) = source_url {
        return Ok(url);
    }

    let (filename, content_type, data) = file
        .ok_or_else(|| AppError::BadRequest("A source file or URL is required".to_string()))?;

    let store = state
        .storage
        .as_ref()
        .ok_or_else(|| AppError::Storage("Object storage not configured".to_string()))?;

    let key = MediaStore::generate_key(folder, &filename);
    Ok(store.upload_bytes(data, &key, &content_type).await?)
}

pub async fn create(
    State(state): State<SharedState>,
    auth: AuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Generation>), AppError> {
    let input = parse_create_input(&headers, body).await?;
    validate_create_input(&input)?;

    let provider = state.providers.get(ProviderKind::DId).ok_or_else(|| {
        AppError::Provider("D-ID API key not configured on server".to_string())
    })?;

    let source_url =
        resolve_source_url(&state, "images", input.source_url, input.image).await?;

    let provider_job_id = provider
        .submit(&SubmitRequest {
            source_url: source_url.clone(),
            script: input.script_input.clone(),
            voice_id: input.voice_id.clone(),
            background_url: None,
        })
        .await?;

    let config = json!({
        "fluent": false,
        "pad_audio": 0.0,
        "voice_id": input.voice_id,
    });

    let generation = db::generations::create(
        &state.pool,
        auth.user_id,
        &input.name,
        ProviderKind::DId,
        &provider_job_id,
        &source_url,
        &input.script_input,
        config,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(generation)))
}

pub async fn create_heygen(
    State(state): State<SharedState>,
    auth: AuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Generation>), AppError> {
    let form = upload::parse_multipart(&headers, body)
        .await
        .map_err(AppError::BadRequest)?;

    let name = form.text("project_name").unwrap_or_default().to_string();
    let script = form.text("script").unwrap_or_default().to_string();
    let voice_id = form.text("voice_id").map(|s| s.to_string());

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push((
            "project_name".to_string(),
            "This field is required".to_string(),
        ));
    }
    if script.is_empty() {
        errors.push(("script".to_string(), "This field is required".to_string()));
    }
    if form.text("photo_url").is_none() && form.file("photo_file").is_none() {
        errors.push((
            "photo_file".to_string(),
            "A photo file or photo_url is required".to_string(),
        ));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let provider = state.providers.get(ProviderKind::HeyGen).ok_or_else(|| {
        AppError::Provider("HeyGen API key not configured on server".to_string())
    })?;

    let photo = form
        .file("photo_file")
        .map(|f| (f.filename.clone(), f.content_type.clone(), f.data.clone()));
    let source_url = resolve_source_url(
        &state,
        "images",
        form.text("photo_url").map(|s| s.to_string()),
        photo,
    )
    .await?;

    let background_url = match form.file("background_file") {
        Some(f) => {
            let store = state.storage.as_ref().ok_or_else(|| {
                AppError::Storage("Object storage not configured".to_string())
            })?;
            let key = MediaStore::generate_key("backgrounds", &f.filename);
            Some(
                store
                    .upload_bytes(f.data.clone(), &key, &f.content_type)
                    .await?,
            )
        }
        None => None,
    };

    let provider_job_id = provider
        .submit(&SubmitRequest {
            source_url: source_url.clone(),
            script: script.clone(),
            voice_id: voice_id.clone(),
            background_url: background_url.clone(),
        })
        .await?;

    let config = json!({
        "voice_id": voice_id,
        "background_url": background_url,
    });

    let generation = db::generations::create(
        &state.pool,
        auth.user_id,
        &name,
        ProviderKind::HeyGen,
        &provider_job_id,
        &source_url,
        &script,
        config,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(generation)))
}

pub async fn list(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<Vec<Generation>>, AppError> {
    let videos = db::generations::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(videos))
}

pub async fn get(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Generation>, AppError> {
    let generation = db::generations::find_by_id_for_user(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;
    Ok(Json(generation))
}

/// Lazy reconciliation, driven by client polling. Always answers with the
/// current record, even when the vendor is unreachable.
pub async fn update_status(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Generation>, AppError> {
    let generation = db::generations::find_by_id_for_user(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

    let generation = reconcile::reconcile(&state, generation).await?;
    Ok(Json(generation))
}

pub async fn toggle_publish(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Generation>, AppError> {
    let generation = db::generations::toggle_public(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;
    Ok(Json(generation))
}
