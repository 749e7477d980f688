//! Video rendering collaborator.
//!
//! The orchestrator hands a finished transcript to a [`VideoRenderer`]
//! and gets back a local artifact plus cost and pipeline metadata.
//! [`RenderClient`] talks to an external render service over HTTP and
//! stages the artifact in a per-dream working directory.

pub mod workdir;

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use campfire_core::types::EntityId;

/// Client-side timeout for one render call. Rendering is slow; this is
/// a backstop against a hung service, not a latency target.
const RENDER_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Render request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Render service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to stage artifact locally: {0}")]
    Io(#[from] std::io::Error),
}

/// What a successful render produces.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// Artifact staged on the local filesystem, ready for upload.
    pub local_path: PathBuf,
    /// Cost estimate reported by the pipeline.
    pub cost_estimate: f64,
    /// Opaque pipeline metadata, persisted verbatim into the dream's
    /// generation record.
    pub metadata: serde_json::Value,
}

/// Abstract rendering pipeline.
#[async_trait::async_trait]
pub trait VideoRenderer: Send + Sync {
    /// Render a video for `dream_id` from its full transcript.
    async fn render(
        &self,
        transcript: &str,
        dream_id: EntityId,
    ) -> Result<RenderOutput, RenderError>;
}

/// Render-service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Base URL of the render service (`RENDER_SERVICE_URL`).
    pub service_url: String,
}

impl RenderConfig {
    pub fn from_env() -> Self {
        let service_url =
            std::env::var("RENDER_SERVICE_URL").expect("RENDER_SERVICE_URL must be set");
        Self { service_url }
    }
}

/// Renderer backed by an external HTTP render service.
///
/// The service returns cost and metadata as JSON alongside a URL for the
/// finished artifact, which is then downloaded into the dream's working
/// directory.
pub struct RenderClient {
    http: reqwest::Client,
    config: RenderConfig,
}

impl RenderClient {
    pub fn new(config: RenderConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(RENDER_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self { http, config }
    }
}

/// Response body from the render service.
#[derive(Debug, Deserialize)]
struct RenderResponse {
    artifact_url: String,
    #[serde(default)]
    cost_estimate: f64,
    #[serde(default)]
    metadata: serde_json::Value,
}

#[async_trait::async_trait]
impl VideoRenderer for RenderClient {
    async fn render(
        &self,
        transcript: &str,
        dream_id: EntityId,
    ) -> Result<RenderOutput, RenderError> {
        let response = self
            .http
            .post(format!("{}/render", self.config.service_url))
            .json(&serde_json::json!({
                "dream_id": dream_id,
                "transcript": transcript,
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RenderError::Status(response.status()));
        }
        let body: RenderResponse = response.json().await?;

        // Stage the artifact locally so upload-to-durable-storage is a
        // separate, retry-diagnosable step.
        let artifact = self.http.get(&body.artifact_url).send().await?;
        if !artifact.status().is_success() {
            return Err(RenderError::Status(artifact.status()));
        }
        let bytes = artifact.bytes().await?;

        let dir = workdir::working_dir(dream_id);
        tokio::fs::create_dir_all(&dir).await?;
        let local_path = dir.join("dream.mp4");
        tokio::fs::write(&local_path, &bytes).await?;

        tracing::info!(
            %dream_id,
            path = %local_path.display(),
            bytes = bytes.len(),
            "Render artifact staged"
        );

        Ok(RenderOutput {
            local_path,
            cost_estimate: body.cost_estimate,
            metadata: body.metadata,
        })
    }
}
