//! Route definitions for the `/dreams` resource and its sub-resources.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{dream, segment, storage};
use crate::state::AppState;

/// Routes mounted at `/dreams`.
///
/// ```text
/// POST   /                               create (idempotent)
/// GET    /                               list with segments
/// GET    /{id}                           get with segments
/// PATCH  /{id}                           update title
/// GET    /{id}/transcript                transcript field
/// POST   /{id}/segments                  register segment (idempotent)
/// GET    /{id}/segments                  list segments
/// DELETE /{id}/segments/{segment_id}     delete segment
/// POST   /{id}/finish                    finish + schedule video job
/// POST   /{id}/video-complete            completion callback
/// GET    /{id}/video-url                 presigned artifact download
/// POST   /{id}/upload-url                presigned audio upload
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(dream::create).get(dream::list))
        .route("/{id}", get(dream::get_by_id).patch(dream::update_title))
        .route("/{id}/transcript", get(dream::get_transcript))
        .route(
            "/{id}/segments",
            post(segment::create).get(segment::list_by_dream),
        )
        .route("/{id}/segments/{segment_id}", delete(segment::delete))
        .route("/{id}/finish", post(dream::finish))
        .route("/{id}/video-complete", post(dream::video_complete))
        .route("/{id}/video-url", get(storage::video_url))
        .route("/{id}/upload-url", post(storage::upload_url))
}
