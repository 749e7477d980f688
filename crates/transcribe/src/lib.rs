//! Speech-to-text collaborator.
//!
//! Transcription is best-effort throughout the system: an absent
//! transcript is `Ok(None)`, and callers leave the segment untranscribed
//! rather than failing the request. [`DeepgramClient`] is the production
//! implementation.

use std::time::Duration;

use serde::Deserialize;

/// Client-side timeout for one transcription call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const DEFAULT_ENDPOINT: &str = "https://api.deepgram.com/v1/listen";

#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error("Transcription request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Transcription service returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Abstract speech-to-text service.
#[async_trait::async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe the audio reachable at `audio_url`.
    ///
    /// `Ok(None)` means the service produced no transcript; the segment
    /// stays untranscribed and contributes nothing to aggregation.
    async fn transcribe(&self, audio_url: &str) -> Result<Option<String>, TranscribeError>;
}

/// Deepgram configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DeepgramConfig {
    /// API key (`DEEPGRAM_API_KEY`).
    pub api_key: String,
    /// Listen endpoint; overridable for testing (`DEEPGRAM_ENDPOINT`).
    pub endpoint: String,
}

impl DeepgramConfig {
    pub fn from_env() -> Self {
        let api_key = std::env::var("DEEPGRAM_API_KEY").expect("DEEPGRAM_API_KEY must be set");
        let endpoint =
            std::env::var("DEEPGRAM_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.into());
        Self { api_key, endpoint }
    }
}

/// Speech-to-text backed by Deepgram's prerecorded-audio API.
pub struct DeepgramClient {
    http: reqwest::Client,
    config: DeepgramConfig,
}

impl DeepgramClient {
    pub fn new(config: DeepgramConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self { http, config }
    }
}

#[async_trait::async_trait]
impl SpeechToText for DeepgramClient {
    async fn transcribe(&self, audio_url: &str) -> Result<Option<String>, TranscribeError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .query(&[("model", "nova-2"), ("language", "en-US")])
            .header("Authorization", format!("Token {}", self.config.api_key))
            .json(&serde_json::json!({ "url": audio_url }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranscribeError::Status(response.status()));
        }

        let body: ListenResponse = response.json().await?;
        Ok(body.first_transcript())
    }
}

/// The slice of Deepgram's response we consume:
/// `results.channels[0].alternatives[0].transcript`.
#[derive(Debug, Deserialize)]
struct ListenResponse {
    results: Option<ListenResults>,
}

#[derive(Debug, Deserialize)]
struct ListenResults {
    channels: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    transcript: String,
}

impl ListenResponse {
    fn first_transcript(self) -> Option<String> {
        let transcript = self
            .results?
            .channels
            .into_iter()
            .next()?
            .alternatives
            .into_iter()
            .next()?
            .transcript;
        let trimmed = transcript.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_alternative_transcript() {
        let body: ListenResponse = serde_json::from_str(
            r#"{"results":{"channels":[{"alternatives":[
                {"transcript":"hello world"},
                {"transcript":"hollow word"}
            ]}]}}"#,
        )
        .unwrap();
        assert_eq!(body.first_transcript().as_deref(), Some("hello world"));
    }

    #[test]
    fn empty_transcript_becomes_none() {
        let body: ListenResponse = serde_json::from_str(
            r#"{"results":{"channels":[{"alternatives":[{"transcript":"  "}]}]}}"#,
        )
        .unwrap();
        assert_eq!(body.first_transcript(), None);
    }

    #[test]
    fn missing_results_becomes_none() {
        let body: ListenResponse = serde_json::from_str(r#"{"results":null}"#).unwrap();
        assert_eq!(body.first_transcript(), None);
    }
}
