//! Segment entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use campfire_core::types::EntityId;

/// A row from the `segments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Segment {
    pub id: EntityId,
    pub dream_id: EntityId,
    pub filename: Option<String>,
    /// Duration in seconds.
    pub duration: f64,
    /// Playback / transcript sequence. Serialized as `order` for
    /// clients; `order` is a reserved word in SQL.
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub storage_key: String,
    /// Populated asynchronously once transcription succeeds.
    pub transcript: Option<String>,
}

/// DTO for registering a segment. The id is client-supplied so that
/// upload retries are detectable.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSegment {
    #[serde(rename = "segment_id")]
    pub id: EntityId,
    pub filename: Option<String>,
    pub duration: f64,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub storage_key: String,
}
