//! The video-generation job.
//!
//! Scheduled by `finish`, runs detached from the originating request:
//! it re-reads the dream from the pool, renders the transcript, uploads
//! the artifact, and advances the dream to `video_generated`. Every
//! milestone is a persisted checkpoint, so a crash mid-pipeline leaves
//! the dream in a diagnosable state.
//!
//! Fire-and-forget: nothing here propagates to a caller. A failed run
//! is observable only through the dream's `video_metadata`, and a later
//! `finish` call may schedule another attempt.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::task::JoinHandle;

use campfire_core::transcript::{self, TranscriptPart};
use campfire_core::types::EntityId;
use campfire_core::video::{GenerationFailure, GenerationRecord};
use campfire_db::models::dream::DreamWithSegments;
use campfire_db::repositories::DreamRepo;
use campfire_pipeline::{workdir, RenderError, VideoRenderer};
use campfire_storage::{keys, ObjectStore, StorageError};

use crate::state::AppState;

/// Failures inside one orchestration run. Never escapes the job; the
/// message is persisted as the dream's failure metadata.
#[derive(Debug, thiserror::Error)]
enum JobError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("Artifact upload failed: {0}")]
    Upload(#[from] StorageError),
}

/// Schedule a video-generation run for `dream_id`.
///
/// The task carries only the dream id plus shared handles; it holds no
/// request-scoped resources and acquires pool connections on its own.
pub fn spawn(state: &AppState, dream_id: EntityId) -> JoinHandle<()> {
    let pool = state.pool.clone();
    let store = Arc::clone(&state.store);
    let renderer = Arc::clone(&state.renderer);
    tokio::spawn(run(pool, store, renderer, dream_id))
}

/// One orchestration run. Catches every failure and records it on the
/// dream instead of propagating.
async fn run(
    pool: PgPool,
    store: Arc<dyn ObjectStore>,
    renderer: Arc<dyn VideoRenderer>,
    dream_id: EntityId,
) {
    tracing::info!(%dream_id, "Video job started");

    let result = try_run(&pool, store.as_ref(), renderer.as_ref(), dream_id).await;

    // Transient render files are useless after upload and merely stale
    // after a failure; remove them either way.
    workdir::cleanup(dream_id).await;

    if let Err(e) = result {
        tracing::error!(%dream_id, error = %e, "Video job failed");
        record_failure(&pool, dream_id, &e).await;
    }
}

async fn try_run(
    pool: &PgPool,
    store: &dyn ObjectStore,
    renderer: &dyn VideoRenderer,
    dream_id: EntityId,
) -> Result<(), JobError> {
    // Step 1: load fresh; the request that scheduled us is long gone.
    let Some(DreamWithSegments { dream, segments }) =
        DreamRepo::find_with_segments(pool, dream_id).await?
    else {
        tracing::warn!(%dream_id, "Video job: dream no longer exists, nothing to do");
        return Ok(());
    };

    // Step 2: recompute the authoritative transcript.
    let parts: Vec<TranscriptPart> = segments
        .iter()
        .map(|s| TranscriptPart {
            sort_order: s.sort_order,
            transcript: s.transcript.clone(),
        })
        .collect();
    let full_transcript = transcript::assemble(&parts);

    if full_transcript.is_empty() {
        // Nothing to render. Not an error: the dream simply stays
        // completed with no generation attempt recorded.
        tracing::info!(%dream_id, "Video job: empty transcript, skipping render");
        DreamRepo::mark_completed(pool, dream_id).await?;
        return Ok(());
    }

    // Step 3: checkpoint the transcript the render will consume.
    DreamRepo::set_transcript(pool, dream_id, &full_transcript).await?;

    // Step 4: render.
    let output = renderer.render(&full_transcript, dream_id).await?;
    tracing::info!(
        %dream_id,
        cost_estimate = output.cost_estimate,
        "Video job: render complete"
    );

    // Step 5: persist the artifact under its deterministic key.
    let storage_key = keys::video_key(dream_id);
    store
        .upload(&output.local_path, &storage_key, "video/mp4")
        .await?;

    // Step 6: record success and advance the lifecycle.
    let record = GenerationRecord {
        generated_at: chrono::Utc::now(),
        cost_estimate: output.cost_estimate,
        pipeline: output.metadata,
        transcript_chars: full_transcript.len(),
        segment_count: segments.len(),
    };
    let metadata = serde_json::to_value(&record)
        .expect("GenerationRecord serialization cannot fail");
    DreamRepo::mark_video_generated(pool, dream_id, &storage_key, &metadata).await?;

    tracing::info!(%dream_id, %storage_key, title = %dream.title, "Video job succeeded");
    Ok(())
}

/// Step 8: persist the failure so a later read can diagnose it. The
/// dream stays at `completed`; a failure to record the failure can only
/// be logged.
async fn record_failure(pool: &PgPool, dream_id: EntityId, error: &JobError) {
    let failure = GenerationFailure {
        error: error.to_string(),
        failed_at: chrono::Utc::now(),
    };
    let metadata = serde_json::to_value(&failure)
        .expect("GenerationFailure serialization cannot fail");

    match DreamRepo::record_video_failure(pool, dream_id, &metadata).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!(%dream_id, "Video job: dream vanished before failure was recorded");
        }
        Err(e) => {
            tracing::error!(%dream_id, error = %e, "Video job: failed to record failure");
        }
    }
}
