pub mod dream;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /dreams                                          create, list
/// /dreams/{id}                                     get, update title
/// /dreams/{id}/transcript                          denormalized transcript
/// /dreams/{id}/segments                            register (idempotent), list
/// /dreams/{id}/segments/{segment_id}               delete
/// /dreams/{id}/finish                              aggregate + schedule render
/// /dreams/{id}/video-complete                      completion callback
/// /dreams/{id}/video-url                           presigned artifact download
/// /dreams/{id}/upload-url                          presigned audio upload
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/dreams", dream::router())
}
