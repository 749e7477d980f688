//! Handlers for the `/dreams` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use campfire_core::error::CoreError;
use campfire_core::transcript::{self, TranscriptPart};
use campfire_core::types::EntityId;
use campfire_core::validate;
use campfire_db::models::dream::{CreateDream, DreamWithSegments, UpdateDream};
use campfire_db::repositories::DreamRepo;

use crate::background::video_job;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response body for `GET /dreams/{id}/transcript`.
#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub transcript: String,
}

/// Response body for `POST /dreams/{id}/finish`.
#[derive(Debug, Serialize)]
pub struct FinishResponse {
    pub transcript: String,
}

/// Load a dream with segments or fail with 404.
async fn ensure_dream_exists(
    pool: &sqlx::PgPool,
    id: EntityId,
) -> AppResult<DreamWithSegments> {
    DreamRepo::find_with_segments(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Dream", id }))
}

/// POST /api/v1/dreams
///
/// Idempotent: a retried create with the same client-supplied id returns
/// the existing dream. Responds 201 either way; the client cannot (and
/// need not) distinguish a replay.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateDream>,
) -> AppResult<(StatusCode, Json<DreamWithSegments>)> {
    validate::validate_title(&input.title)?;

    let outcome = DreamRepo::create_idempotent(&state.pool, &input).await?;
    let replayed = outcome.already_existed();
    let id = outcome.into_inner().id;
    if replayed {
        tracing::debug!(dream_id = %id, "Dream create replayed");
    }
    let dream = ensure_dream_exists(&state.pool, id).await?;
    Ok((StatusCode::CREATED, Json(dream)))
}

/// GET /api/v1/dreams
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<DreamWithSegments>>> {
    let dreams = DreamRepo::list_with_segments(&state.pool).await?;
    Ok(Json(dreams))
}

/// GET /api/v1/dreams/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DreamWithSegments>> {
    let dream = ensure_dream_exists(&state.pool, id).await?;
    Ok(Json(dream))
}

/// PATCH /api/v1/dreams/{id}
pub async fn update_title(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateDream>,
) -> AppResult<Json<DreamWithSegments>> {
    validate::validate_title(&input.title)?;
    DreamRepo::update_title(&state.pool, id, &input.title)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Dream", id }))?;
    let dream = ensure_dream_exists(&state.pool, id).await?;
    Ok(Json(dream))
}

/// GET /api/v1/dreams/{id}/transcript
///
/// Returns the denormalized transcript field (best-effort cache; the
/// finish-time recomputation is authoritative).
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<TranscriptResponse>> {
    let dream = DreamRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Dream", id }))?;
    Ok(Json(TranscriptResponse {
        transcript: dream.transcript.unwrap_or_default(),
    }))
}

/// POST /api/v1/dreams/{id}/finish
///
/// Recomputes the authoritative transcript from ordered segments,
/// persists it, moves the dream to `completed`, and schedules the
/// detached video-generation job. Safe to call again on a `completed`
/// dream; that schedules another orchestration attempt.
pub async fn finish(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<FinishResponse>> {
    let dream = ensure_dream_exists(&state.pool, id).await?;

    let parts: Vec<TranscriptPart> = dream
        .segments
        .iter()
        .map(|s| TranscriptPart {
            sort_order: s.sort_order,
            transcript: s.transcript.clone(),
        })
        .collect();
    let full_transcript = transcript::assemble(&parts);

    DreamRepo::set_transcript(&state.pool, id, &full_transcript).await?;
    DreamRepo::mark_completed(&state.pool, id).await?;

    video_job::spawn(&state, id);
    tracing::info!(dream_id = %id, "Dream finished, video job scheduled");

    Ok(Json(FinishResponse {
        transcript: full_transcript,
    }))
}

/// POST /api/v1/dreams/{id}/video-complete
///
/// External completion callback; placeholder for the deferred push
/// notification. Forces the state to `completed` without ever
/// regressing a `video_generated` dream.
pub async fn video_complete(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<serde_json::Value>> {
    DreamRepo::mark_completed(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Dream", id }))?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
