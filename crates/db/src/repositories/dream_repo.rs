//! Repository for the `dreams` table.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use campfire_core::types::EntityId;

use crate::models::dream::{CreateDream, Dream, DreamState, DreamWithSegments};
use crate::models::segment::Segment;
use crate::repositories::{is_unique_violation, CreateOutcome};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, created, title, transcript, state, video_storage_key, video_metadata";

/// Provides CRUD and lifecycle operations for dreams.
pub struct DreamRepo;

impl DreamRepo {
    /// Create a dream idempotently.
    ///
    /// If `input.id` is absent a fresh v4 UUID is generated (nothing to
    /// replay against, so the insert cannot conflict with a retry). With
    /// a client-supplied id, an existing row is returned unchanged; if a
    /// concurrent caller wins the insert race the unique violation is
    /// swallowed and the winner's row is returned. First writer wins,
    /// everyone observes success.
    pub async fn create_idempotent(
        pool: &PgPool,
        input: &CreateDream,
    ) -> Result<CreateOutcome<Dream>, sqlx::Error> {
        let id = input.id.unwrap_or_else(Uuid::new_v4);

        if input.id.is_some() {
            if let Some(existing) = Self::find_by_id(pool, id).await? {
                return Ok(CreateOutcome::AlreadyExists(existing));
            }
        }

        let query = format!("INSERT INTO dreams (id, title) VALUES ($1, $2) RETURNING {COLUMNS}");
        match sqlx::query_as::<_, Dream>(&query)
            .bind(id)
            .bind(&input.title)
            .fetch_one(pool)
            .await
        {
            Ok(dream) => Ok(CreateOutcome::Created(dream)),
            Err(err) if is_unique_violation(&err) => {
                // A concurrent caller beat us to the insert. The intent
                // ("this dream exists") is satisfied, so fetch their row.
                match Self::find_by_id(pool, id).await? {
                    Some(existing) => Ok(CreateOutcome::AlreadyExists(existing)),
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Find a dream row by id, without segments.
    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Dream>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dreams WHERE id = $1");
        sqlx::query_as::<_, Dream>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a dream with its segments eagerly attached, ordered by
    /// `sort_order`. State and metadata come from one row fetch, so the
    /// pair is always mutually consistent.
    pub async fn find_with_segments(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<DreamWithSegments>, sqlx::Error> {
        let Some(dream) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let segments = sqlx::query_as::<_, Segment>(
            "SELECT id, dream_id, filename, duration, sort_order, storage_key, transcript
             FROM segments WHERE dream_id = $1 ORDER BY sort_order ASC",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;
        Ok(Some(DreamWithSegments { dream, segments }))
    }

    /// List all dreams with their segments attached.
    pub async fn list_with_segments(pool: &PgPool) -> Result<Vec<DreamWithSegments>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dreams ORDER BY created ASC");
        let dreams = sqlx::query_as::<_, Dream>(&query).fetch_all(pool).await?;

        let ids: Vec<EntityId> = dreams.iter().map(|d| d.id).collect();
        let segments = sqlx::query_as::<_, Segment>(
            "SELECT id, dream_id, filename, duration, sort_order, storage_key, transcript
             FROM segments WHERE dream_id = ANY($1) ORDER BY sort_order ASC",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let mut by_dream: HashMap<EntityId, Vec<Segment>> = HashMap::new();
        for segment in segments {
            by_dream.entry(segment.dream_id).or_default().push(segment);
        }

        Ok(dreams
            .into_iter()
            .map(|dream| {
                let segments = by_dream.remove(&dream.id).unwrap_or_default();
                DreamWithSegments { dream, segments }
            })
            .collect())
    }

    /// Update a dream's title. Returns `None` if the dream is absent.
    pub async fn update_title(
        pool: &PgPool,
        id: EntityId,
        title: &str,
    ) -> Result<Option<Dream>, sqlx::Error> {
        let query = format!("UPDATE dreams SET title = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Dream>(&query)
            .bind(id)
            .bind(title)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the denormalized transcript with a recomputed value.
    pub async fn set_transcript(
        pool: &PgPool,
        id: EntityId,
        transcript: &str,
    ) -> Result<Option<Dream>, sqlx::Error> {
        let query = format!("UPDATE dreams SET transcript = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Dream>(&query)
            .bind(id)
            .bind(transcript)
            .fetch_optional(pool)
            .await
    }

    /// Move a dream to `completed`.
    ///
    /// Guarded so a `video_generated` dream is never regressed; in that
    /// case the row is returned untouched.
    pub async fn mark_completed(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<Dream>, sqlx::Error> {
        let query = format!(
            "UPDATE dreams SET state = $2 WHERE id = $1 AND state <> $3 RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Dream>(&query)
            .bind(id)
            .bind(DreamState::Completed)
            .bind(DreamState::VideoGenerated)
            .fetch_optional(pool)
            .await?;
        match updated {
            Some(dream) => Ok(Some(dream)),
            None => Self::find_by_id(pool, id).await,
        }
    }

    /// Record a fully successful orchestration run: artifact key,
    /// success metadata, and the advance to `video_generated`, in one
    /// atomic statement.
    pub async fn mark_video_generated(
        pool: &PgPool,
        id: EntityId,
        storage_key: &str,
        metadata: &serde_json::Value,
    ) -> Result<Option<Dream>, sqlx::Error> {
        let query = format!(
            "UPDATE dreams
             SET state = $2, video_storage_key = $3, video_metadata = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Dream>(&query)
            .bind(id)
            .bind(DreamState::VideoGenerated)
            .bind(storage_key)
            .bind(metadata)
            .fetch_optional(pool)
            .await
    }

    /// Record a failed orchestration run: error metadata, state forced
    /// to `completed` (never regressing `video_generated`), artifact key
    /// left untouched.
    pub async fn record_video_failure(
        pool: &PgPool,
        id: EntityId,
        metadata: &serde_json::Value,
    ) -> Result<Option<Dream>, sqlx::Error> {
        let query = format!(
            "UPDATE dreams
             SET state = $2, video_metadata = $3
             WHERE id = $1 AND state <> $4
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Dream>(&query)
            .bind(id)
            .bind(DreamState::Completed)
            .bind(metadata)
            .bind(DreamState::VideoGenerated)
            .fetch_optional(pool)
            .await?;
        match updated {
            Some(dream) => Ok(Some(dream)),
            None => Self::find_by_id(pool, id).await,
        }
    }

    /// Delete a dream. Segments go with it via the FK cascade.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: EntityId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dreams WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
