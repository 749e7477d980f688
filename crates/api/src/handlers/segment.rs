//! Handlers for the `/dreams/{id}/segments` resource.
//!
//! Registration is idempotent under the client-supplied segment id and
//! runs a synchronous, best-effort transcription attempt whose result
//! is attached to the response.

use axum::extract::{Path, State};
use axum::Json;

use campfire_core::error::CoreError;
use campfire_core::types::EntityId;
use campfire_core::validate;
use campfire_db::models::segment::{CreateSegment, Segment};
use campfire_db::repositories::{DreamRepo, SegmentRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/dreams/{dream_id}/segments
pub async fn create(
    State(state): State<AppState>,
    Path(dream_id): Path<EntityId>,
    Json(input): Json<CreateSegment>,
) -> AppResult<Json<Segment>> {
    validate::validate_duration(input.duration)?;

    DreamRepo::find_by_id(&state.pool, dream_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Dream",
            id: dream_id,
        }))?;

    let outcome = SegmentRepo::create_idempotent(&state.pool, dream_id, &input).await?;
    if outcome.already_existed() {
        tracing::debug!(segment_id = %input.id, "Segment registration replayed");
    }
    let mut segment = outcome.into_inner();

    // Transcribe only segments that have no transcript yet, so a
    // registration replay cannot append the same text twice.
    if segment.transcript.is_none() {
        segment = transcribe_segment(&state, segment).await?;
    }

    Ok(Json(segment))
}

/// Run the synchronous transcription attempt for a freshly registered
/// segment. Transcription is best-effort: any failure is logged and the
/// segment is returned untranscribed.
async fn transcribe_segment(state: &AppState, segment: Segment) -> AppResult<Segment> {
    let audio_url = match state.store.sign_download(&segment.storage_key).await {
        Ok(presigned) => presigned.url,
        Err(e) => {
            tracing::warn!(segment_id = %segment.id, error = %e, "Presign for transcription failed");
            return Ok(segment);
        }
    };

    let text = match state.transcriber.transcribe(&audio_url).await {
        Ok(Some(text)) => text,
        Ok(None) => {
            tracing::debug!(segment_id = %segment.id, "Transcription produced no text");
            return Ok(segment);
        }
        Err(e) => {
            tracing::warn!(segment_id = %segment.id, error = %e, "Transcription failed");
            return Ok(segment);
        }
    };

    // Persisting the transcript is not best-effort: the service already
    // produced text, so a storage failure here must surface.
    let updated = SegmentRepo::set_transcript(&state.pool, segment.dream_id, segment.id, &text)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Segment",
            id: segment.id,
        }))?;
    Ok(updated)
}

/// GET /api/v1/dreams/{dream_id}/segments
pub async fn list_by_dream(
    State(state): State<AppState>,
    Path(dream_id): Path<EntityId>,
) -> AppResult<Json<Vec<Segment>>> {
    DreamRepo::find_by_id(&state.pool, dream_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Dream",
            id: dream_id,
        }))?;
    let segments = SegmentRepo::list_by_dream(&state.pool, dream_id).await?;
    Ok(Json(segments))
}

/// DELETE /api/v1/dreams/{dream_id}/segments/{segment_id}
///
/// Removes the row, then best-effort deletes the underlying audio
/// object; a storage failure is logged, never surfaced.
pub async fn delete(
    State(state): State<AppState>,
    Path((dream_id, segment_id)): Path<(EntityId, EntityId)>,
) -> AppResult<Json<serde_json::Value>> {
    let segment = SegmentRepo::find_in_dream(&state.pool, dream_id, segment_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Segment",
            id: segment_id,
        }))?;

    // Capture before the row goes away.
    let storage_key = segment.storage_key;
    SegmentRepo::delete(&state.pool, dream_id, segment_id).await?;

    if let Err(e) = state.store.delete(&storage_key).await {
        tracing::warn!(
            segment_id = %segment_id,
            key = %storage_key,
            error = %e,
            "Best-effort audio object delete failed"
        );
    }

    Ok(Json(serde_json::json!({ "status": "deleted" })))
}
