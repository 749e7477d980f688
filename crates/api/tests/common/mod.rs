//! Shared test fixtures: mock collaborators and app construction.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use campfire_api::config::ServerConfig;
use campfire_api::router::build_app_router;
use campfire_api::state::AppState;
use campfire_core::types::EntityId;
use campfire_pipeline::{workdir, RenderError, RenderOutput, VideoRenderer};
use campfire_storage::{
    ObjectStore, PresignedUrl, StorageError, DOWNLOAD_URL_TTL, UPLOAD_URL_TTL,
};
use campfire_transcribe::{SpeechToText, TranscribeError};

/// In-memory object store. Presigns deterministic fake URLs and records
/// uploads and deletes for assertions.
#[derive(Default)]
pub struct MockStore {
    pub uploaded: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl ObjectStore for MockStore {
    async fn sign_upload(&self, key: &str) -> Result<PresignedUrl, StorageError> {
        Ok(PresignedUrl {
            url: format!("https://store.test/put/{key}"),
            expires_in: UPLOAD_URL_TTL,
        })
    }

    async fn sign_download(&self, key: &str) -> Result<PresignedUrl, StorageError> {
        Ok(PresignedUrl {
            url: format!("https://store.test/get/{key}"),
            expires_in: DOWNLOAD_URL_TTL,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }

    async fn upload(
        &self,
        _local_path: &Path,
        key: &str,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        self.uploaded.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

/// Scripted transcriber. Each call pops the next scripted result; an
/// exhausted script yields `Ok(None)`. Counts calls so tests can assert
/// that replays do not re-transcribe.
#[derive(Default)]
pub struct MockTranscriber {
    script: Mutex<VecDeque<Option<String>>>,
    pub calls: AtomicUsize,
}

impl MockTranscriber {
    pub fn scripted<I, S>(results: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(results.into_iter().map(|r| r.map(Into::into)).collect()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl SpeechToText for MockTranscriber {
    async fn transcribe(&self, _audio_url: &str) -> Result<Option<String>, TranscribeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.lock().unwrap().pop_front().flatten())
    }
}

/// Renderer that stages a dummy artifact, or fails on demand.
#[derive(Default)]
pub struct MockRenderer {
    pub fail: bool,
}

#[async_trait::async_trait]
impl VideoRenderer for MockRenderer {
    async fn render(
        &self,
        _transcript: &str,
        dream_id: EntityId,
    ) -> Result<RenderOutput, RenderError> {
        if self.fail {
            return Err(RenderError::Io(std::io::Error::other(
                "mock render failure",
            )));
        }
        let dir = workdir::working_dir(dream_id);
        tokio::fs::create_dir_all(&dir).await?;
        let local_path = dir.join("dream.mp4");
        tokio::fs::write(&local_path, b"not a real mp4").await?;
        Ok(RenderOutput {
            local_path,
            cost_estimate: 1.25,
            metadata: serde_json::json!({ "pipeline": "mock" }),
        })
    }
}

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".into()],
        request_timeout_secs: 30,
    }
}

/// Build the full application router backed by the given mocks.
pub fn build_test_app(
    pool: PgPool,
    store: Arc<MockStore>,
    transcriber: Arc<MockTranscriber>,
    renderer: Arc<MockRenderer>,
) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        store,
        transcriber,
        renderer,
    };
    build_app_router(state, &config)
}

/// Router with default mocks, for tests that only care about HTTP
/// semantics.
pub fn build_default_app(pool: PgPool) -> Router {
    build_test_app(
        pool,
        Arc::new(MockStore::default()),
        Arc::new(MockTranscriber::default()),
        Arc::new(MockRenderer::default()),
    )
}

pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => Request::builder().method(method).uri(uri).body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let json = read_json(response).await;
    (status, json)
}

pub async fn read_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}
