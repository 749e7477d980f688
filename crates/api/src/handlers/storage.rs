//! Presigned-URL handlers for direct client access to object storage.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use campfire_core::error::CoreError;
use campfire_core::types::EntityId;
use campfire_db::repositories::DreamRepo;
use campfire_storage::keys;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadUrlParams {
    pub filename: String,
}

/// Response body for `POST /dreams/{id}/upload-url`.
#[derive(Debug, Serialize)]
pub struct UploadUrlResponse {
    pub upload_url: String,
    /// The key the client must echo back when registering the segment.
    pub storage_key: String,
    pub expires_in: u64,
}

/// Response body for `GET /dreams/{id}/video-url`.
#[derive(Debug, Serialize)]
pub struct VideoUrlResponse {
    pub video_url: String,
    pub expires_in: u64,
    pub metadata: Option<serde_json::Value>,
}

/// POST /api/v1/dreams/{id}/upload-url?filename=...
///
/// Presigns a write-only URL for one segment audio file under the
/// deterministic key `dreams/{dream_id}/{filename}`.
pub async fn upload_url(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Query(params): Query<UploadUrlParams>,
) -> AppResult<Json<UploadUrlResponse>> {
    DreamRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Dream", id }))?;

    let storage_key = keys::audio_key(id, &params.filename);
    let presigned = state.store.sign_upload(&storage_key).await?;

    Ok(Json(UploadUrlResponse {
        upload_url: presigned.url,
        storage_key,
        expires_in: presigned.expires_in.as_secs(),
    }))
}

/// GET /api/v1/dreams/{id}/video-url
///
/// 404 until an orchestration run has persisted an artifact key.
pub async fn video_url(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<VideoUrlResponse>> {
    let dream = DreamRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Dream", id }))?;

    let storage_key = dream
        .video_storage_key
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Video", id }))?;

    let presigned = state.store.sign_download(&storage_key).await?;

    Ok(Json(VideoUrlResponse {
        video_url: presigned.url,
        expires_in: presigned.expires_in.as_secs(),
        metadata: dream.video_metadata,
    }))
}
