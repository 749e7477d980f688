//! Object-storage collaborator.
//!
//! The rest of the system talks to durable storage only through the
//! [`ObjectStore`] trait: presigned upload/download URLs for clients,
//! uploads from local paths for the orchestrator, and best-effort
//! deletes. [`s3::S3Store`] is the production implementation.

pub mod keys;
pub mod s3;

use std::path::Path;
use std::time::Duration;

pub use s3::{S3Config, S3Store};

/// How long presigned upload URLs stay valid.
pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(600);

/// How long presigned download URLs stay valid.
pub const DOWNLOAD_URL_TTL: Duration = Duration::from_secs(3600);

/// A time-limited URL for direct client access to one object.
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    pub url: String,
    pub expires_in: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to presign {operation} for key '{key}': {message}")]
    Presign {
        operation: &'static str,
        key: String,
        message: String,
    },

    #[error("Failed to upload '{key}': {message}")]
    Upload { key: String, message: String },

    #[error("Failed to delete '{key}': {message}")]
    Delete { key: String, message: String },
}

/// Abstract object storage.
///
/// Delete failures are expected to be logged and swallowed by callers
/// (best-effort); upload failures during orchestration are fatal to
/// that orchestration run.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Presign a write-only PUT URL for `key`.
    async fn sign_upload(&self, key: &str) -> Result<PresignedUrl, StorageError>;

    /// Presign a read-only GET URL for `key`.
    async fn sign_download(&self, key: &str) -> Result<PresignedUrl, StorageError>;

    /// Delete the object at `key`.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Upload a local file to `key` with the given content type.
    async fn upload(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<(), StorageError>;
}
