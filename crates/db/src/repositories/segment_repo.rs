//! Repository for the `segments` table.

use sqlx::PgPool;

use campfire_core::types::EntityId;

use crate::models::segment::{CreateSegment, Segment};
use crate::repositories::{is_unique_violation, CreateOutcome};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, dream_id, filename, duration, sort_order, storage_key, transcript";

/// Provides CRUD and transcript operations for segments.
pub struct SegmentRepo;

impl SegmentRepo {
    /// Register a segment idempotently under its client-supplied id.
    ///
    /// A retried registration (same id) returns the stored row without
    /// writing; a concurrent duplicate that loses the insert race has
    /// its unique violation swallowed and also observes the stored row.
    pub async fn create_idempotent(
        pool: &PgPool,
        dream_id: EntityId,
        input: &CreateSegment,
    ) -> Result<CreateOutcome<Segment>, sqlx::Error> {
        if let Some(existing) = Self::find_by_id(pool, input.id).await? {
            return Ok(CreateOutcome::AlreadyExists(existing));
        }

        let query = format!(
            "INSERT INTO segments (id, dream_id, filename, duration, sort_order, storage_key)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        match sqlx::query_as::<_, Segment>(&query)
            .bind(input.id)
            .bind(dream_id)
            .bind(&input.filename)
            .bind(input.duration)
            .bind(input.sort_order)
            .bind(&input.storage_key)
            .fetch_one(pool)
            .await
        {
            Ok(segment) => Ok(CreateOutcome::Created(segment)),
            Err(err) if is_unique_violation(&err) => {
                // Late replay lost the race; the original write stands.
                match Self::find_by_id(pool, input.id).await? {
                    Some(existing) => Ok(CreateOutcome::AlreadyExists(existing)),
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Find a segment by id.
    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Segment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM segments WHERE id = $1");
        sqlx::query_as::<_, Segment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a segment scoped to its owning dream.
    pub async fn find_in_dream(
        pool: &PgPool,
        dream_id: EntityId,
        id: EntityId,
    ) -> Result<Option<Segment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM segments WHERE id = $1 AND dream_id = $2");
        sqlx::query_as::<_, Segment>(&query)
            .bind(id)
            .bind(dream_id)
            .fetch_optional(pool)
            .await
    }

    /// List a dream's segments ordered by `sort_order` ascending.
    pub async fn list_by_dream(
        pool: &PgPool,
        dream_id: EntityId,
    ) -> Result<Vec<Segment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM segments WHERE dream_id = $1 ORDER BY sort_order ASC"
        );
        sqlx::query_as::<_, Segment>(&query)
            .bind(dream_id)
            .fetch_all(pool)
            .await
    }

    /// Persist a freshly-obtained transcript.
    ///
    /// Two mutations commit together: the segment's transcript is set,
    /// and the text is appended onto the dream's denormalized transcript.
    /// The append is computed in SQL from the stored value, so concurrent
    /// completions from other segments interleave without losing text.
    pub async fn set_transcript(
        pool: &PgPool,
        dream_id: EntityId,
        id: EntityId,
        transcript: &str,
    ) -> Result<Option<Segment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE segments
             SET transcript = TRIM(BOTH ' ' FROM COALESCE(transcript, '') || ' ' || $2)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let segment = sqlx::query_as::<_, Segment>(&query)
            .bind(id)
            .bind(transcript)
            .fetch_optional(&mut *tx)
            .await?;

        if segment.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query(
            "UPDATE dreams
             SET transcript = TRIM(BOTH ' ' FROM COALESCE(transcript, '') || ' ' || $2)
             WHERE id = $1",
        )
        .bind(dream_id)
        .bind(transcript)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(segment)
    }

    /// Delete a segment scoped to its dream. Returns `true` if a row was
    /// removed.
    pub async fn delete(
        pool: &PgPool,
        dream_id: EntityId,
        id: EntityId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM segments WHERE id = $1 AND dream_id = $2")
            .bind(id)
            .bind(dream_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
