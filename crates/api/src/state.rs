use std::sync::Arc;

use campfire_pipeline::VideoRenderer;
use campfire_storage::ObjectStore;
use campfire_transcribe::SpeechToText;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already `Clone`.
/// The external collaborators are trait objects so integration tests can
/// swap in mocks.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: campfire_db::DbPool,
    /// Server configuration, immutable after startup.
    pub config: Arc<ServerConfig>,
    /// Object storage for audio segments and rendered videos.
    pub store: Arc<dyn ObjectStore>,
    /// Speech-to-text service.
    pub transcriber: Arc<dyn SpeechToText>,
    /// Video rendering pipeline.
    pub renderer: Arc<dyn VideoRenderer>,
}
