//! Dream entity model, lifecycle state, and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use campfire_core::types::{EntityId, Timestamp};

use crate::models::segment::Segment;

/// Dream lifecycle state. Transitions only ever advance:
/// `Draft -> Completed -> VideoGenerated`, with the render-failure
/// fallback keeping a dream at `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "dream_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DreamState {
    Draft,
    Completed,
    VideoGenerated,
}

impl DreamState {
    /// Whether a transition from `self` to `next` is allowed.
    ///
    /// `Completed -> Completed` is permitted (the failure fallback
    /// re-records metadata without moving state). Nothing regresses.
    pub fn can_transition(self, next: DreamState) -> bool {
        use DreamState::*;
        matches!(
            (self, next),
            (Draft, Completed) | (Completed, Completed) | (Completed, VideoGenerated)
        )
    }
}

/// A row from the `dreams` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dream {
    pub id: EntityId,
    pub created: Timestamp,
    pub title: String,
    /// Best-effort cache of the assembled transcript; the finish-time
    /// recomputation is authoritative.
    pub transcript: Option<String>,
    pub state: DreamState,
    pub video_storage_key: Option<String>,
    pub video_metadata: Option<serde_json::Value>,
}

/// A dream together with its segments, ordered by `sort_order`.
///
/// Every dream read returned to callers carries its segments eagerly.
#[derive(Debug, Clone, Serialize)]
pub struct DreamWithSegments {
    #[serde(flatten)]
    pub dream: Dream,
    pub segments: Vec<Segment>,
}

/// DTO for creating a new dream. The id is optional: clients that need
/// retry-safe creation supply their own, otherwise one is generated.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDream {
    pub id: Option<EntityId>,
    pub title: String,
}

/// DTO for updating a dream's title.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDream {
    pub title: String,
}
